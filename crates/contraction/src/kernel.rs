use num_traits::Float;

use crate::layout::ContractionLayout;
use crate::shape::unravel_index;

/// Contract a contiguous range of output positions.
///
/// For every position `t` in `[lo, lo + dst.len())` the coordinate of `t` is decoded into
/// `coord` and `dst[t - lo]` receives
/// `sum_{x = 0}^{n - 1} left[left_offset(coord, x)] * right[right_offset(coord, x)]`.
///
/// The products are accumulated in ascending `x` order starting from zero. This order is part
/// of the contract: it keeps results bit-identical however the output range is split.
///
/// # Arguments
///
/// * `layout` - The validated shapes of the contraction.
/// * `left` - The left operand buffer.
/// * `right` - The right operand buffer.
/// * `lo` - The first output position covered by `dst`.
/// * `dst` - The output positions `[lo, lo + dst.len())`, the only memory written.
/// * `coord` - Scratch coordinate of length `layout.rank()`, overwritten for every position.
///   It must not be shared with another range running at the same time.
///
/// # Example
///
/// ```
/// use contraction::kernel::contract_block_kernel;
/// use contraction::layout::ContractionLayout;
///
/// let layout = ContractionLayout::new(&[2, 3], &[3, 2], &[2, 2]).unwrap();
/// let left = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
/// let right = [7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
/// let mut dst = [0.0; 2];
/// let mut coord = [0; 2];
/// // positions 2 and 3 are the second row of the product
/// contract_block_kernel(&layout, &left, &right, 2, &mut dst, &mut coord);
/// assert_eq!(dst, [139.0, 154.0]);
/// ```
pub fn contract_block_kernel<T>(
    layout: &ContractionLayout,
    left: &[T],
    right: &[T],
    lo: usize,
    dst: &mut [T],
    coord: &mut [usize],
) where
    T: Float,
{
    let n = layout.contracted_dim();
    let right_step = layout.right_step();

    for (t, out) in (lo..).zip(dst.iter_mut()) {
        unravel_index(t, layout.output_shape(), coord);

        // offsets are linear in x: left advances by 1, right by one row of its last axis
        let left_base = layout.left_offset(coord, 0);
        let right_base = layout.right_offset(coord, 0);

        *out = left[left_base..left_base + n]
            .iter()
            .zip(right[right_base..].iter().step_by(right_step))
            .fold(T::zero(), |acc, (&a, &b)| acc + a * b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContractionError;

    #[test]
    fn test_kernel_full_range() -> Result<(), ContractionError> {
        let layout = ContractionLayout::new(&[2, 3], &[3, 2], &[2, 2])?;
        let left = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let right = [7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        let mut dst = [0.0f64; 4];
        let mut coord = [0; 2];
        contract_block_kernel(&layout, &left, &right, 0, &mut dst, &mut coord);
        assert_eq!(dst, [58.0, 64.0, 139.0, 154.0]);
        Ok(())
    }

    #[test]
    fn test_kernel_writes_only_its_range() -> Result<(), ContractionError> {
        let layout = ContractionLayout::new(&[2, 3], &[3, 2], &[2, 2])?;
        let left = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let right = [7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        let mut output = [-1.0f64; 4];
        let mut coord = [0; 2];
        contract_block_kernel(&layout, &left, &right, 1, &mut output[1..3], &mut coord);
        assert_eq!(output, [-1.0, 64.0, 139.0, -1.0]);
        Ok(())
    }

    #[test]
    fn test_kernel_empty_range() -> Result<(), ContractionError> {
        let layout = ContractionLayout::new(&[1, 1], &[1, 1], &[1, 1])?;
        let mut dst: [f64; 0] = [];
        let mut coord = [0; 2];
        contract_block_kernel(&layout, &[2.0], &[3.0], 0, &mut dst, &mut coord);
        Ok(())
    }

    #[test]
    fn test_kernel_stepping_matches_offset_mapping() -> Result<(), ContractionError> {
        let left_shape = [2, 3, 4];
        let right_shape = [2, 4, 5];
        let output_shape = [2, 3, 5];
        let layout = ContractionLayout::new(&left_shape, &right_shape, &output_shape)?;

        let left: Vec<f64> = (0..24).map(|v| v as f64 * 0.5 - 3.0).collect();
        let right: Vec<f64> = (0..40).map(|v| (v % 7) as f64 - 1.25).collect();

        let mut dst = vec![0.0; 30];
        let mut coord = [0; 3];
        contract_block_kernel(&layout, &left, &right, 0, &mut dst, &mut coord);

        for (t, &value) in dst.iter().enumerate() {
            unravel_index(t, &output_shape, &mut coord);
            let mut expected = 0.0;
            for x in 0..layout.contracted_dim() {
                expected +=
                    left[layout.left_offset(&coord, x)] * right[layout.right_offset(&coord, x)];
            }
            assert_eq!(value, expected);
        }
        Ok(())
    }

    #[test]
    fn test_kernel_f32() -> Result<(), ContractionError> {
        let layout = ContractionLayout::new(&[1, 2], &[2, 1], &[1, 1])?;
        let mut dst = [0.0f32];
        let mut coord = [0; 2];
        contract_block_kernel(&layout, &[1.5, 2.0], &[2.0, 4.0], 0, &mut dst, &mut coord);
        assert_eq!(dst, [11.0]);
        Ok(())
    }
}
