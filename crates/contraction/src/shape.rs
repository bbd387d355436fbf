/// Compute the number of elements described by a shape.
///
/// Returns `None` if the product of the extents overflows `usize`.
///
/// # Example
///
/// ```
/// use contraction::shape::numel;
///
/// assert_eq!(numel(&[2, 3, 4]), Some(24));
/// assert_eq!(numel(&[usize::MAX, 2]), None);
/// ```
pub fn numel(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
}

/// Decode a linear row-major position into its coordinate.
///
/// The coordinate is written in place into `coord`, from the last axis to the first:
/// `coord[k] = (offset / stride_k) % shape[k]` where `stride_k` is the product of the
/// extents after axis `k`.
///
/// # Arguments
///
/// * `offset` - The linear position, expected in `[0, numel(shape))`.
/// * `shape` - The extents of each axis.
/// * `coord` - Scratch buffer of the same length as `shape` receiving the coordinate.
///
/// # Example
///
/// ```
/// use contraction::shape::unravel_index;
///
/// let mut coord = [0; 3];
/// unravel_index(17, &[2, 3, 4], &mut coord);
/// assert_eq!(coord, [1, 1, 1]);
/// ```
pub fn unravel_index(offset: usize, shape: &[usize], coord: &mut [usize]) {
    debug_assert_eq!(shape.len(), coord.len());
    let mut stride = 1;
    for (c, &dim) in coord.iter_mut().zip(shape.iter()).rev() {
        *c = (offset / stride) % dim;
        stride *= dim;
    }
}

/// Flatten a coordinate whose value on `axis` is replaced by `x`.
///
/// The coordinate itself is left untouched. This is the offset mapping used to address the
/// operands while the contracted axis varies independently of the output coordinate.
pub fn ravel_index_with(coord: &[usize], shape: &[usize], axis: usize, x: usize) -> usize {
    coord
        .iter()
        .zip(shape.iter())
        .enumerate()
        .fold(0, |acc, (k, (&c, &dim))| {
            let c = if k == axis { x } else { c };
            acc * dim + c
        })
}
