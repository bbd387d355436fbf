use thiserror::Error;

/// An error type for tensor contractions.
///
/// Every variant is raised before any output element is written.
#[derive(Error, Debug, PartialEq)]
pub enum ContractionError {
    /// The left, right and output shapes do not share the same rank.
    #[error("Rank mismatch: left {0}, right {1} and output {2} must have the same rank")]
    RankMismatch(usize, usize, usize),

    /// The contraction needs at least a row and a column axis.
    #[error("Rank too small: expected a rank of at least 2, got {0}")]
    RankTooSmall(usize),

    /// The number of blocks to split the output into must be positive.
    #[error("Concurrency must be > 0, got {0}")]
    InvalidConcurrency(usize),

    /// More blocks were requested than there are output positions.
    #[error("Concurrency {0} exceeds the output size {1}")]
    ConcurrencyExceedsOutput(usize, usize),

    /// The left last axis and the right second-to-last axis differ.
    #[error("Contracted dimension mismatch: left has {0}, right has {1}")]
    ContractedDimMismatch(usize, usize),

    /// A batch, row or column axis disagrees between the operands and the output.
    #[error("Axis {axis} mismatch: left {left:?}, right {right:?}, output {output}")]
    AxisMismatch {
        /// The offending axis.
        axis: usize,
        /// Extent of the axis in the left shape, if it takes part in the check.
        left: Option<usize>,
        /// Extent of the axis in the right shape, if it takes part in the check.
        right: Option<usize>,
        /// Extent of the axis in the output shape.
        output: usize,
    },

    /// An axis of a shape has extent 0.
    #[error("Zero extent: axis {axis} of the {operand} shape is 0")]
    ZeroExtent {
        /// Which shape failed the check: `left`, `right` or `output`.
        operand: &'static str,
        /// The offending axis.
        axis: usize,
    },

    /// The number of elements of a shape does not fit in `usize`.
    #[error("Shape overflow: the number of elements of the {0} shape overflows usize")]
    ShapeOverflow(&'static str),

    /// A buffer length does not match the number of elements of its shape.
    #[error("Buffer size mismatch for {buffer}: expected {expected}, got {actual}")]
    BufferSizeMismatch {
        /// Which buffer failed the check: `left`, `right` or `output`.
        buffer: &'static str,
        /// Product of the shape extents.
        expected: usize,
        /// Actual buffer length.
        actual: usize,
    },

    /// The requested thread count for a local pool is invalid.
    #[error("Thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// The local thread pool failed to build.
    #[error("Failed to build thread pool: {0}")]
    ThreadPoolBuild(String),
}
