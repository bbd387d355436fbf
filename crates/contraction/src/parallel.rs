use rayon::Scope;

use crate::error::ContractionError;

/// Controls where the block workers of a contraction run.
///
/// The block partition is the same for every strategy, only the executor changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Spawn one task per block on the global Rayon thread pool.
    #[default]
    Global,

    /// Spawn one task per block on a local thread pool with `n` threads.
    ///
    /// # Warning
    /// Creates a new thread pool on every call, which has significant overhead.
    /// Use this primarily for benchmarking or specific isolation needs.
    Fixed(usize),

    /// Run the blocks one after another on the current thread.
    ///
    /// Useful for small outputs and debugging.
    Serial,
}

impl ExecutionStrategy {
    /// Check the strategy before any work starts.
    ///
    /// # Errors
    ///
    /// [`ContractionError::InvalidThreadCount`] for `Fixed(0)`.
    pub fn validate(&self) -> Result<(), ContractionError> {
        match *self {
            ExecutionStrategy::Fixed(0) => Err(ContractionError::InvalidThreadCount(0)),
            _ => Ok(()),
        }
    }

    /// Run `op` on every `chunk`-sized block of `dst` and wait for all of them.
    ///
    /// `op` receives the block index and the block. The call returns only once every block has
    /// been processed. `dst.len()` must be a multiple of `chunk`.
    pub(crate) fn for_each_block<T, F>(
        &self,
        dst: &mut [T],
        chunk: usize,
        op: F,
    ) -> Result<(), ContractionError>
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync,
    {
        if dst.is_empty() {
            return Ok(());
        }
        debug_assert!(chunk > 0 && dst.len() % chunk == 0);

        match *self {
            ExecutionStrategy::Serial => {
                dst.chunks_exact_mut(chunk)
                    .enumerate()
                    .for_each(|(i, block)| op(i, block));
            }
            ExecutionStrategy::Global => {
                rayon::scope(|s| spawn_blocks(s, dst, chunk, &op));
            }
            ExecutionStrategy::Fixed(n) => {
                if n == 0 {
                    return Err(ContractionError::InvalidThreadCount(n));
                }
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| ContractionError::ThreadPoolBuild(e.to_string()))?;

                pool.scope(|s| spawn_blocks(s, dst, chunk, &op));
            }
        }
        Ok(())
    }
}

fn spawn_blocks<'scope, T, F>(
    s: &Scope<'scope>,
    dst: &'scope mut [T],
    chunk: usize,
    op: &'scope F,
) where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync,
{
    for (i, block) in dst.chunks_exact_mut(chunk).enumerate() {
        s.spawn(move |_| op(i, block));
    }
}
