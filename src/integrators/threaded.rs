//! Dedicated-thread strategy: one worker thread per chunk, spawned and joined per call.

use crate::core::{
    check_interval, check_subdivisions, combine, eval_endpoints, partial_sum, partition,
    step_size, Integrand,
};
use crate::error::{panic_message, Error, Result};

use num_traits::{Float, FromPrimitive};

use crossbeam as cb;

/// Approximates the integral of `f` over `[a, b]` with `n` subintervals, distributing the
/// interior sample points over exactly `workers` dedicated threads.
///
/// Every worker owns one contiguous sub-range of `[1, n-1]`, fixed at spawn time; no state is
/// shared between workers apart from the read-only integrand. The call joins all workers before
/// combining, a strict barrier, so no partial result is ever observed early. Threads are not
/// reused across calls; each call pays the spawn cost, which is what the pooled strategy
/// avoids.
///
/// A `workers` count exceeding the number of interior points is fine: the surplus workers
/// receive empty sub-ranges and contribute zero without evaluating `f`.
///
/// # Errors
///
/// [`Error::InvalidArgument`] for `n == 0`, `workers == 0` or a degenerate interval;
/// [`Error::Evaluation`] if `f` panics at any sample point.
pub fn integrate<T, F>(f: &F, a: T, b: T, n: usize, workers: usize) -> Result<T>
where
    T: Float + FromPrimitive + Send + Sync,
    F: Integrand<T>,
{
    check_interval(a, b)?;
    check_subdivisions(n)?;
    if workers == 0 {
        return Err(Error::InvalidArgument(
            "worker count must be positive".to_string(),
        ));
    }

    let (fa, fb) = eval_endpoints(f, a, b)?;
    let h = step_size(a, b, n);

    // distribute the interior points evenly across the workers
    let partials = cb::thread::scope(|s| {
        let mut handles = Vec::with_capacity(workers);

        for range in partition(n, workers) {
            handles.push(s.spawn(move |_| partial_sum(f, a, h, range)));
        }

        // wait for every worker before combining anything
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .map_err(|payload| Error::Evaluation(panic_message(payload.as_ref())))
            })
            .collect::<Result<Vec<_>>>()
    })
    .map_err(|payload| Error::Worker(panic_message(payload.as_ref())))??;

    let interior = partials.into_iter().fold(T::zero(), |acc, p| acc + p);

    Ok(combine(fa, fb, interior, h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn linear_integrands_are_exact_for_any_n() {
        let f = |x: f64| 3.0 * x + 1.0;
        // int_0^4 (3x + 1) dx = 28
        for n in 1..32 {
            let result = integrate(&f, 0.0, 4.0, n, 3).unwrap();
            assert_approx_eq!(result, 28.0, 1e-12);
        }
    }

    #[test]
    fn single_trapezoid_uses_only_the_endpoints() {
        let f = |x: f64| x * x;
        // h/2 * (f(0) + f(2)) = 1 * 4
        let result = integrate(&f, 0.0, 2.0, 1, 4).unwrap();
        assert_approx_eq!(result, 4.0, 1e-12);
    }

    #[test]
    fn more_workers_than_points_is_harmless() {
        let f = |x: f64| x;
        let few = integrate(&f, 0.0, 1.0, 3, 1).unwrap();
        let many = integrate(&f, 0.0, 1.0, 3, 64).unwrap();
        assert_approx_eq!(few, many, 1e-12);
    }

    #[test]
    fn invalid_arguments_fail_fast() {
        let f = |x: f64| x;
        assert!(matches!(
            integrate(&f, 0.0, 1.0, 0, 2),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            integrate(&f, 0.0, 1.0, 10, 0),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            integrate(&f, 1.0, 1.0, 10, 2),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            integrate(&f, 2.0, -2.0, 10, 2),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn panicking_integrand_fails_the_call() {
        let f = |x: f64| {
            if x > 0.5 {
                panic!("pole at x = {}", x);
            }
            x
        };
        match integrate(&f, 0.0, 0.4, 100, 4) {
            Ok(value) => assert!(value.is_finite()),
            Err(err) => panic!("expected success below the pole, got {}", err),
        }
        assert!(matches!(
            integrate(&f, 0.0, 1.0, 100, 4),
            Err(Error::Evaluation(_))
        ));
    }
}
