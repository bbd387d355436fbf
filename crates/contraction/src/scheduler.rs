use std::ops::Range;

use num_traits::Float;

use crate::error::ContractionError;
use crate::kernel::contract_block_kernel;
use crate::layout::{check_ranks, infer_output_shape, ContractionLayout};
use crate::parallel::ExecutionStrategy;

/// The static partition of the output positions into blocks.
///
/// The output of `size` positions is cut into blocks of `chunk = size / concurrency`
/// positions. Blocks are laid out back to back from position 0 for as long as a whole block
/// fits, so there are `size / chunk` of them. The remaining positions form the tail, which is
/// processed on the calling thread after every block has finished.
///
/// # Example
///
/// ```
/// use contraction::scheduler::BlockPlan;
///
/// let plan = BlockPlan::new(10, 3).unwrap();
/// assert_eq!(plan.chunk(), 3);
/// assert_eq!(plan.ranges().collect::<Vec<_>>(), vec![0..3, 3..6, 6..9]);
/// assert_eq!(plan.tail(), 9..10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPlan {
    size: usize,
    chunk: usize,
    blocks: usize,
}

impl BlockPlan {
    /// Partition `size` output positions for the requested `concurrency`.
    ///
    /// # Errors
    ///
    /// * [`ContractionError::InvalidConcurrency`] if `concurrency` is 0.
    /// * [`ContractionError::ConcurrencyExceedsOutput`] if `concurrency > size`.
    pub fn new(size: usize, concurrency: usize) -> Result<Self, ContractionError> {
        if concurrency == 0 {
            return Err(ContractionError::InvalidConcurrency(concurrency));
        }
        if concurrency > size {
            return Err(ContractionError::ConcurrencyExceedsOutput(concurrency, size));
        }

        let chunk = size / concurrency;
        Ok(Self {
            size,
            chunk,
            blocks: size / chunk,
        })
    }

    /// The number of output positions.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The length of every block.
    pub fn chunk(&self) -> usize {
        self.chunk
    }

    /// The number of blocks handed to workers.
    pub fn blocks(&self) -> usize {
        self.blocks
    }

    /// The first position not covered by a block.
    pub fn tail_start(&self) -> usize {
        self.blocks * self.chunk
    }

    /// The positions processed synchronously after the blocks, possibly empty.
    pub fn tail(&self) -> Range<usize> {
        self.tail_start()..self.size
    }

    /// The position ranges of the blocks, in order.
    pub fn ranges(&self) -> impl Iterator<Item = Range<usize>> {
        let chunk = self.chunk;
        (0..self.blocks).map(move |i| i * chunk..(i + 1) * chunk)
    }
}

/// Contract `left` with `right` into `output` on the global thread pool.
///
/// Computes `C[..., i, j] = sum_x A[..., i, x] * B[..., x, j]` where the leading axes are shared
/// batch axes, `A` is `left` with shape `left_shape`, `B` is `right` with shape `right_shape`
/// and `C` is `output` with shape `output_shape`. All buffers are flat and row-major.
///
/// # Arguments
///
/// * `concurrency` - The number of equal blocks to cut the output into.
/// * `left` - The left operand, shape `[batch..., rows, n]`.
/// * `right` - The right operand, shape `[batch..., n, cols]`.
/// * `output` - The output, shape `[batch..., rows, cols]`. Fully overwritten.
/// * `left_shape`, `right_shape`, `output_shape` - Shapes of equal rank, at least 2.
///
/// # Errors
///
/// Returns an error before `output` is touched if the shapes have different ranks, if
/// `concurrency` is 0 or larger than `output.len()`, or if the shapes or buffer lengths do not
/// describe a valid contraction.
///
/// # Example
///
/// ```
/// use contraction::contract;
///
/// let left = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
/// let right = [7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
/// let mut output = [0.0; 4];
/// contract(1, &left, &right, &mut output, &[2, 3], &[3, 2], &[2, 2]).unwrap();
/// assert_eq!(output, [58.0, 64.0, 139.0, 154.0]);
/// ```
pub fn contract<T>(
    concurrency: usize,
    left: &[T],
    right: &[T],
    output: &mut [T],
    left_shape: &[usize],
    right_shape: &[usize],
    output_shape: &[usize],
) -> Result<(), ContractionError>
where
    T: Float + Send + Sync,
{
    contract_with(
        ExecutionStrategy::Global,
        concurrency,
        left,
        right,
        output,
        left_shape,
        right_shape,
        output_shape,
    )
}

/// Contract `left` with `right` into `output` with the given execution strategy.
///
/// Same contract as [`contract`]. The block partition and the tail handling do not depend on
/// `strategy`, so every strategy produces bit-identical results.
///
/// # Errors
///
/// The errors of [`contract`], plus [`ContractionError::InvalidThreadCount`] and
/// [`ContractionError::ThreadPoolBuild`] for [`ExecutionStrategy::Fixed`].
#[allow(clippy::too_many_arguments)]
pub fn contract_with<T>(
    strategy: ExecutionStrategy,
    concurrency: usize,
    left: &[T],
    right: &[T],
    output: &mut [T],
    left_shape: &[usize],
    right_shape: &[usize],
    output_shape: &[usize],
) -> Result<(), ContractionError>
where
    T: Float + Send + Sync,
{
    check_ranks(left_shape, right_shape, output_shape)?;
    let plan = BlockPlan::new(output.len(), concurrency)?;
    let layout = ContractionLayout::new(left_shape, right_shape, output_shape)?;
    layout.check_buffers(left.len(), right.len(), output.len())?;
    strategy.validate()?;

    log::debug!(
        "contracting {:?} x {:?} -> {:?}: {} blocks of {}, tail {}, {:?}",
        left_shape,
        right_shape,
        output_shape,
        plan.blocks(),
        plan.chunk(),
        plan.tail().len(),
        strategy,
    );

    let rank = layout.rank();
    let chunk = plan.chunk();
    let (blocks, tail) = output.split_at_mut(plan.tail_start());

    strategy.for_each_block(blocks, chunk, |i, block| {
        let lo = i * chunk;
        log::trace!("block {i}: [{lo}, {})", lo + block.len());
        let mut coord = vec![0; rank];
        contract_block_kernel(&layout, left, right, lo, block, &mut coord);
    })?;

    if !tail.is_empty() {
        log::trace!("tail: [{}, {})", plan.tail_start(), plan.size());
        let mut coord = vec![0; rank];
        contract_block_kernel(&layout, left, right, plan.tail_start(), tail, &mut coord);
    }

    Ok(())
}

/// Contract `left` with `right` into a newly allocated output.
///
/// The output shape is inferred as `[batch..., left[R-2], right[R-1]]`.
///
/// # Returns
///
/// The output buffer and its shape.
///
/// # Errors
///
/// The errors of [`infer_output_shape`] and [`contract`].
///
/// # Example
///
/// ```
/// use contraction::contract_to_vec;
///
/// let identity = [1.0, 0.0, 0.0, 1.0];
/// let other = [3.0, 4.0, 5.0, 6.0];
/// let (output, shape) = contract_to_vec(2, &identity, &other, &[2, 2], &[2, 2]).unwrap();
/// assert_eq!(shape, vec![2, 2]);
/// assert_eq!(output, vec![3.0, 4.0, 5.0, 6.0]);
/// ```
pub fn contract_to_vec<T>(
    concurrency: usize,
    left: &[T],
    right: &[T],
    left_shape: &[usize],
    right_shape: &[usize],
) -> Result<(Vec<T>, Vec<usize>), ContractionError>
where
    T: Float + Send + Sync,
{
    let output_shape = infer_output_shape(left_shape, right_shape)?;
    let size = ContractionLayout::new(left_shape, right_shape, &output_shape)?.numel();
    let mut output = vec![T::zero(); size];
    contract(
        concurrency,
        left,
        right,
        &mut output,
        left_shape,
        right_shape,
        &output_shape,
    )?;
    Ok((output, output_shape))
}
