use crate::error::ContractionError;
use crate::shape::{numel, ravel_index_with};

/// Check that the three shapes share one rank of at least 2.
///
/// # Errors
///
/// * [`ContractionError::RankMismatch`] if the ranks differ.
/// * [`ContractionError::RankTooSmall`] if the common rank is below 2.
pub fn check_ranks(
    left_shape: &[usize],
    right_shape: &[usize],
    output_shape: &[usize],
) -> Result<usize, ContractionError> {
    let rank = output_shape.len();
    if left_shape.len() != rank || right_shape.len() != rank {
        return Err(ContractionError::RankMismatch(
            left_shape.len(),
            right_shape.len(),
            rank,
        ));
    }
    if rank < 2 {
        return Err(ContractionError::RankTooSmall(rank));
    }
    Ok(rank)
}

/// Check that every extent of `shape` is positive and return its number of elements.
///
/// # Errors
///
/// * [`ContractionError::ZeroExtent`] for the first axis of extent 0.
/// * [`ContractionError::ShapeOverflow`] if the number of elements overflows `usize`.
fn checked_numel(operand: &'static str, shape: &[usize]) -> Result<usize, ContractionError> {
    if let Some(axis) = shape.iter().position(|&dim| dim == 0) {
        return Err(ContractionError::ZeroExtent { operand, axis });
    }
    numel(shape).ok_or(ContractionError::ShapeOverflow(operand))
}

/// Infer the output shape of contracting `left_shape` with `right_shape`.
///
/// The output keeps the shared batch axes, the row axis of the left operand and the column
/// axis of the right operand: `[batch..., left[R-2], right[R-1]]`.
///
/// # Errors
///
/// Returns an error if the ranks differ or are below 2, if an extent is 0 or the number of
/// elements overflows, if the contracted dimensions disagree, or if a batch axis differs
/// between the operands.
///
/// # Example
///
/// ```
/// use contraction::layout::infer_output_shape;
///
/// let shape = infer_output_shape(&[4, 2, 3], &[4, 3, 5]).unwrap();
/// assert_eq!(shape, vec![4, 2, 5]);
/// ```
pub fn infer_output_shape(
    left_shape: &[usize],
    right_shape: &[usize],
) -> Result<Vec<usize>, ContractionError> {
    let rank = check_ranks(left_shape, right_shape, left_shape)?;
    checked_numel("left", left_shape)?;
    checked_numel("right", right_shape)?;

    if left_shape[rank - 1] != right_shape[rank - 2] {
        return Err(ContractionError::ContractedDimMismatch(
            left_shape[rank - 1],
            right_shape[rank - 2],
        ));
    }

    let mut output_shape = Vec::with_capacity(rank);
    for axis in 0..rank - 2 {
        if left_shape[axis] != right_shape[axis] {
            return Err(ContractionError::AxisMismatch {
                axis,
                left: Some(left_shape[axis]),
                right: Some(right_shape[axis]),
                output: left_shape[axis],
            });
        }
        output_shape.push(left_shape[axis]);
    }
    output_shape.push(left_shape[rank - 2]);
    output_shape.push(right_shape[rank - 1]);

    Ok(output_shape)
}

/// The shapes taking part in a contraction `C[..., i, j] = sum_x A[..., i, x] * B[..., x, j]`.
///
/// A layout is built once per call from validated shapes and is read-only afterwards, so it can
/// be shared by every block worker.
#[derive(Debug, Clone, Copy)]
pub struct ContractionLayout<'a> {
    left_shape: &'a [usize],
    right_shape: &'a [usize],
    output_shape: &'a [usize],
    left_numel: usize,
    right_numel: usize,
    output_numel: usize,
    contracted_dim: usize,
    right_step: usize,
}

impl<'a> ContractionLayout<'a> {
    /// Create a new layout after validating the shapes against each other.
    ///
    /// # Arguments
    ///
    /// * `left_shape` - Shape of the left operand `[batch..., rows, n]`.
    /// * `right_shape` - Shape of the right operand `[batch..., n, cols]`.
    /// * `output_shape` - Shape of the output `[batch..., rows, cols]`.
    ///
    /// # Errors
    ///
    /// * [`ContractionError::RankMismatch`] / [`ContractionError::RankTooSmall`] for bad ranks.
    /// * [`ContractionError::ZeroExtent`] if any extent is 0.
    /// * [`ContractionError::ShapeOverflow`] if a number of elements overflows `usize`.
    /// * [`ContractionError::ContractedDimMismatch`] if `left[R-1] != right[R-2]`.
    /// * [`ContractionError::AxisMismatch`] if a batch, row or column axis disagrees.
    pub fn new(
        left_shape: &'a [usize],
        right_shape: &'a [usize],
        output_shape: &'a [usize],
    ) -> Result<Self, ContractionError> {
        let rank = check_ranks(left_shape, right_shape, output_shape)?;
        let left_numel = checked_numel("left", left_shape)?;
        let right_numel = checked_numel("right", right_shape)?;
        let output_numel = checked_numel("output", output_shape)?;
        let row = rank - 2;
        let col = rank - 1;

        if left_shape[col] != right_shape[row] {
            return Err(ContractionError::ContractedDimMismatch(
                left_shape[col],
                right_shape[row],
            ));
        }

        for axis in 0..row {
            if left_shape[axis] != output_shape[axis] || right_shape[axis] != output_shape[axis] {
                return Err(ContractionError::AxisMismatch {
                    axis,
                    left: Some(left_shape[axis]),
                    right: Some(right_shape[axis]),
                    output: output_shape[axis],
                });
            }
        }

        if left_shape[row] != output_shape[row] {
            return Err(ContractionError::AxisMismatch {
                axis: row,
                left: Some(left_shape[row]),
                right: None,
                output: output_shape[row],
            });
        }

        if right_shape[col] != output_shape[col] {
            return Err(ContractionError::AxisMismatch {
                axis: col,
                left: None,
                right: Some(right_shape[col]),
                output: output_shape[col],
            });
        }

        Ok(Self {
            left_shape,
            right_shape,
            output_shape,
            left_numel,
            right_numel,
            output_numel,
            contracted_dim: left_shape[col],
            right_step: right_shape[col],
        })
    }

    /// Check that each buffer holds exactly as many elements as its shape describes.
    ///
    /// # Errors
    ///
    /// [`ContractionError::BufferSizeMismatch`] naming the first buffer that does not match.
    pub fn check_buffers(
        &self,
        left_len: usize,
        right_len: usize,
        output_len: usize,
    ) -> Result<(), ContractionError> {
        let buffers = [
            ("left", self.left_numel, left_len),
            ("right", self.right_numel, right_len),
            ("output", self.output_numel, output_len),
        ];
        for (buffer, expected, actual) in buffers {
            if expected != actual {
                return Err(ContractionError::BufferSizeMismatch {
                    buffer,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// The common rank `R` of the three shapes.
    pub fn rank(&self) -> usize {
        self.output_shape.len()
    }

    /// The extent `n` of the contracted axis.
    pub fn contracted_dim(&self) -> usize {
        self.contracted_dim
    }

    /// The number of output positions.
    pub fn numel(&self) -> usize {
        self.output_numel
    }

    /// The shape of the output.
    pub fn output_shape(&self) -> &'a [usize] {
        self.output_shape
    }

    /// Distance in the right buffer between two consecutive values of the contracted axis.
    pub fn right_step(&self) -> usize {
        self.right_step
    }

    /// Offset into the left buffer of the output coordinate with its last axis set to `x`.
    pub fn left_offset(&self, coord: &[usize], x: usize) -> usize {
        ravel_index_with(coord, self.left_shape, self.rank() - 1, x)
    }

    /// Offset into the right buffer of the output coordinate with its second-to-last axis set
    /// to `x`.
    pub fn right_offset(&self, coord: &[usize], x: usize) -> usize {
        ravel_index_with(coord, self.right_shape, self.rank() - 2, x)
    }
}
