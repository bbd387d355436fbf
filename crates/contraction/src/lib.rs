#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! `contraction` computes the batched matrix product
//! `C[..., i, j] = sum_x A[..., i, x] * B[..., x, j]` over flat row-major buffers: the last
//! axis of the left operand is contracted against the second-to-last axis of the right operand
//! and every leading axis is a shared batch axis.
//!
//! The output positions are cut into equal contiguous blocks, one worker per block, followed
//! by a short tail processed on the calling thread once every worker has finished. Each
//! element is accumulated in ascending order of the contracted index, so the result does not
//! depend on the requested concurrency.
//!
//! # Quick Start
//!
//! ```rust
//! use contraction::{contract_with, ExecutionStrategy};
//!
//! // two batches of a [1, 2] x [2, 2] product
//! let left = [1.0, 2.0, 3.0, 4.0];
//! let right = [1.0, 0.0, 0.0, 1.0, 2.0, 0.0, 0.0, 2.0];
//! let mut output = [0.0; 4];
//!
//! contract_with(
//!     ExecutionStrategy::Serial,
//!     2,
//!     &left,
//!     &right,
//!     &mut output,
//!     &[2, 1, 2],
//!     &[2, 2, 2],
//!     &[2, 1, 2],
//! )
//! .unwrap();
//! assert_eq!(output, [1.0, 2.0, 6.0, 8.0]);
//! ```

/// Error types for contractions.
///
/// Defines [`ContractionError`] for the preconditions checked before any work starts.
pub mod error;

/// Row-major shape and index helpers.
pub mod shape;

/// The validated shapes of a contraction and the offset mapping into the operands.
pub mod layout;

/// The contraction kernel over a contiguous range of output positions.
pub mod kernel;

/// Execution strategies for running block workers.
pub mod parallel;

/// Block partitioning and the public contraction entry points.
pub mod scheduler;

pub use error::ContractionError;
pub use layout::{infer_output_shape, ContractionLayout};
pub use parallel::ExecutionStrategy;
pub use scheduler::{contract, contract_to_vec, contract_with, BlockPlan};
