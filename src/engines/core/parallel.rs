//! Parallel processing primitives
//!
//! Order-preserving fan-out over independent work items (fragments, primer
//! pairs). With the `parallel` feature a global rayon pool is used; without it
//! every helper degrades to a plain sequential map so results are identical.

#[cfg(feature = "parallel")]
use std::sync::OnceLock;

#[cfg(feature = "parallel")]
use rayon::{prelude::*, ThreadPool, ThreadPoolBuilder};

// Below this many items the pool is not worth waking up
#[cfg(feature = "parallel")]
const MIN_PARALLEL_ITEMS: usize = 4;

#[cfg(feature = "parallel")]
static GLOBAL_POOL: OnceLock<Option<ThreadPool>> = OnceLock::new();

/// Get the default number of threads to use
pub fn default_num_threads() -> usize {
    num_cpus::get()
}

/// Initialize the thread pool for parallel processing
///
/// Safe to call more than once; only the first call builds the pool. Returns
/// whether a pool is available.
#[cfg(feature = "parallel")]
pub fn initialize_thread_pool() -> bool {
    GLOBAL_POOL
        .get_or_init(|| {
            let num_threads = default_num_threads();
            match ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .thread_name(|idx| format!("primer-worker-{}", idx))
                .build()
            {
                Ok(pool) => {
                    log::info!("Initialized thread pool with {} threads", num_threads);
                    Some(pool)
                }
                Err(e) => {
                    log::warn!("Falling back to sequential execution: {}", e);
                    None
                }
            }
        })
        .is_some()
}

/// Without the `parallel` feature there is never a pool
#[cfg(not(feature = "parallel"))]
pub fn initialize_thread_pool() -> bool {
    false
}

/// Map `f` over `items`, returning results in input order
pub fn map_ordered<T, R, F>(items: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        if items.len() >= MIN_PARALLEL_ITEMS && initialize_thread_pool() {
            if let Some(Some(pool)) = GLOBAL_POOL.get() {
                return pool.install(|| items.par_iter().map(&f).collect());
            }
        }
    }

    items.iter().map(f).collect()
}
