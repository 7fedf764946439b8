//! Pool-based strategy: over-partitioned tasks submitted to a reusable worker pool.

use crate::core::{
    check_interval, check_subdivisions, combine, eval_endpoints, partial_sum, partition,
    step_size, Integrand,
};
use crate::error::{Error, Result};
use crate::pool::WorkerPool;

use num_traits::{Float, FromPrimitive};

use std::sync::Arc;

/// Tasks submitted per pool worker by [`integrate`].
///
/// Submitting more tasks than there are workers smooths out uneven per-task cost: as tasks
/// finish at different times, idle workers pick up the surplus instead of waiting at a barrier.
/// The ratio is a load-balancing heuristic, not a hard constraint; [`integrate_with`] accepts
/// any other positive value.
pub const DEFAULT_OVERSUBSCRIPTION: usize = 4;

/// Approximates the integral of `f` over `[a, b]` with `n` subintervals on a previously created
/// [`WorkerPool`], submitting [`DEFAULT_OVERSUBSCRIPTION`] tasks per pool worker.
///
/// The pool outlives the call and can serve any number of further calls until its owner shuts
/// it down. Task handles are awaited in submission order; completion order is unspecified and
/// does not affect the result, which depends only on the partition of `[1, n-1]`.
///
/// # Errors
///
/// [`Error::InvalidArgument`] for `n == 0` or a degenerate interval; [`Error::PoolUnavailable`]
/// against a shut-down pool; [`Error::Evaluation`] if `f` panics at any sample point;
/// [`Error::Worker`] if a task is cancelled by a hard shutdown while the call is in flight. A
/// single failed task fails the whole call, its sub-range is never treated as contributing
/// zero.
pub fn integrate<T, F>(f: Arc<F>, a: T, b: T, n: usize, pool: &WorkerPool) -> Result<T>
where
    T: Float + FromPrimitive + Send + Sync + 'static,
    F: Integrand<T> + 'static,
{
    integrate_with(f, a, b, n, pool, DEFAULT_OVERSUBSCRIPTION)
}

/// Like [`integrate`], but with a caller-chosen oversubscription ratio.
///
/// # Errors
///
/// As [`integrate`], plus [`Error::InvalidArgument`] for `oversubscription == 0`.
pub fn integrate_with<T, F>(
    f: Arc<F>,
    a: T,
    b: T,
    n: usize,
    pool: &WorkerPool,
    oversubscription: usize,
) -> Result<T>
where
    T: Float + FromPrimitive + Send + Sync + 'static,
    F: Integrand<T> + 'static,
{
    check_interval(a, b)?;
    check_subdivisions(n)?;
    if oversubscription == 0 {
        return Err(Error::InvalidArgument(
            "oversubscription ratio must be positive".to_string(),
        ));
    }
    if pool.is_shut_down() {
        return Err(Error::PoolUnavailable);
    }

    let (fa, fb) = eval_endpoints(f.as_ref(), a, b)?;
    let h = step_size(a, b, n);
    let tasks = pool.capacity() * oversubscription;

    let handles = partition(n, tasks)
        .into_iter()
        .map(|range| {
            let f = Arc::clone(&f);
            pool.submit(move || partial_sum(f.as_ref(), a, h, range))
        })
        .collect::<Result<Vec<_>>>()?;

    // awaiting in submission order; any task failure aborts the whole call
    let mut interior = T::zero();
    for handle in handles {
        interior = interior + handle.wait()?;
    }

    Ok(combine(fa, fb, interior, h))
}
