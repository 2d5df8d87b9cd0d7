//! Parallel map over an optional worker pool, reporting progress.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use rayon::ThreadPool;
use rayon::prelude::*;
use tracing::debug;

use crate::error::{WorkError, WorkResult};

/// Build a worker pool with `threads` threads.
///
/// The caller owns the pool and passes it to the map functions by reference.
pub fn build_pool(threads: usize) -> WorkResult<ThreadPool> {
    if threads == 0 {
        return Err(WorkError::NoThreads);
    }
    Ok(rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("momenta-work-{i}"))
        .build()?)
}

fn progress_bar(len: usize) -> ProgressBar {
    // The stderr target draws nothing when stderr is not a terminal.
    let bar = ProgressBar::with_draw_target(Some(len as u64), ProgressDrawTarget::stderr());
    if let Ok(style) = ProgressStyle::default_bar().template("{bar:40.cyan/blue} {pos}/{len}") {
        bar.set_style(style);
    }
    bar
}

/// Apply `func` to every input and collect the results.
///
/// Without a pool the map runs on the calling thread. With a pool the work is
/// spread over its threads; the pool is not shut down afterwards. The order
/// of the returned results is not part of the contract.
pub fn execute_with_progress<T, R, F>(
    func: F,
    inputs: Vec<T>,
    pool: Option<&ThreadPool>,
) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Send + Sync,
{
    let bar = progress_bar(inputs.len());
    debug!(
        "Mapping {} inputs on {} threads",
        inputs.len(),
        pool.map_or(1, ThreadPool::current_num_threads)
    );

    let results = match pool {
        None => inputs
            .into_iter()
            .map(|input| {
                let result = func(input);
                bar.inc(1);
                result
            })
            .collect(),
        Some(pool) => pool.install(|| {
            inputs
                .into_par_iter()
                .map(|input| {
                    let result = func(input);
                    bar.inc(1);
                    result
                })
                .collect()
        }),
    };

    bar.finish_and_clear();
    results
}

/// Apply a two-argument `func` to every input pair.
///
/// Same pool and ordering rules as [`execute_with_progress`].
pub fn starmap_with_progress<A, B, R, F>(
    func: F,
    inputs: Vec<(A, B)>,
    pool: Option<&ThreadPool>,
) -> Vec<R>
where
    A: Send,
    B: Send,
    R: Send,
    F: Fn(A, B) -> R + Send + Sync,
{
    execute_with_progress(|(a, b)| func(a, b), inputs, pool)
}
