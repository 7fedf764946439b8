//! The core module: the integrand contract, the chunk partitioner, the partial-sum worker and
//! the reduction combiner. The two strategies in [`crate::integrators`] are thin layers over
//! these pieces; everything numeric happens here.

use crate::error::{Error, Result};
use num_traits::{Float, FromPrimitive};
use serde::{Deserialize, Serialize};

/// Integrand trait.
///
/// The contract is a pure function of one variable: `call` must not depend on hidden mutable
/// state, because the integration routines evaluate it from many threads at once without any
/// synchronization. A panic inside `call` is treated as an evaluation failure and fails the
/// whole integration call.
pub trait Integrand<T: Copy>: Send + Sync {
    /// Evaluate the integrand at the sample point `x`.
    fn call(&self, x: T) -> T;
}

impl<T: Copy, F> Integrand<T> for F
where
    F: Fn(T) -> T + Send + Sync,
{
    fn call(&self, x: T) -> T {
        self(x)
    }
}

/// A contiguous, inclusive block of interior sample indices owned by one worker.
///
/// Sub-ranges with `start > end` are legal and denote an empty block; they occur whenever the
/// requested concurrency exceeds the number of interior points.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SubRange {
    /// First interior sample index of the block.
    pub start: usize,
    /// Last interior sample index of the block, inclusive.
    pub end: usize,
}

impl SubRange {
    /// Returns `true` if the sub-range owns no sample points at all.
    pub const fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// The number of sample points owned by the sub-range.
    pub const fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.end - self.start + 1
        }
    }
}

/// Splits the interior sample indices `[1, n-1]` of an `n`-subinterval partition into `k`
/// contiguous sub-ranges, one per worker.
///
/// The block size is `(n - 1) / k`; worker `t` receives `[t*block + 1, t*block + block]` and the
/// last worker's block is stretched to `n - 1`, so the remainder of the integer division always
/// ends up in the final sub-range. The endpoints `0` and `n` are never part of any sub-range,
/// since the combiner weights them separately.
///
/// For `k > n - 1` some sub-ranges come out empty (`start > end`); workers must skip these via
/// [`SubRange::is_empty`] rather than rely on loop bounds.
pub fn partition(n: usize, k: usize) -> Vec<SubRange> {
    debug_assert!(n > 0);
    debug_assert!(k > 0);

    let block = (n - 1) / k;

    (0..k)
        .map(|t| {
            let start = t * block + 1;
            let end = if t == k - 1 { n - 1 } else { start + block - 1 };
            SubRange { start, end }
        })
        .collect()
}

/// Computes the unweighted partial sum of one worker: the sum of `f(a + i*h)` over every sample
/// index `i` in `range`.
///
/// An empty range contributes exactly zero without the integrand being evaluated at all. The
/// order of evaluation inside the range is fixed, but the split into ranges is not part of the
/// contract, so results are not bit-reproducible across differing worker counts.
pub fn partial_sum<T, F>(f: &F, a: T, h: T, range: SubRange) -> T
where
    T: Float + FromPrimitive,
    F: Integrand<T> + ?Sized,
{
    if range.is_empty() {
        return T::zero();
    }

    (range.start..=range.end).fold(T::zero(), |acc, i| {
        // TODO: Get rid of unwrap.
        let x = a + T::from_usize(i).unwrap() * h;
        acc + f.call(x)
    })
}

/// Combines the endpoint values, the accumulated interior sum and the step size into the final
/// trapezoidal approximation: `h/2 * (f(a) + f(b) + 2 * interior)`.
///
/// The interior points carry weight 1 inside `interior` and are doubled here, while the
/// endpoints keep their single contribution; folding the endpoints into `interior` would break
/// the weighting.
pub fn combine<T: Float>(fa: T, fb: T, interior: T, h: T) -> T {
    let two = T::one() + T::one();
    h / two * (fa + fb + two * interior)
}

/// The uniform subinterval width `h = (b - a) / n`, fixed for the duration of one call.
pub(crate) fn step_size<T: Float + FromPrimitive>(a: T, b: T, n: usize) -> T {
    (b - a) / T::from_usize(n).unwrap()
}

/// Evaluates the integrand at both interval endpoints, turning a panic into an evaluation
/// failure instead of unwinding through the caller.
pub(crate) fn eval_endpoints<T, F>(f: &F, a: T, b: T) -> Result<(T, T)>
where
    T: Float,
    F: Integrand<T> + ?Sized,
{
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| (f.call(a), f.call(b))))
        .map_err(|payload| Error::Evaluation(crate::error::panic_message(payload.as_ref())))
}

/// Rejects intervals the algorithm is not defined on: `a >= b`, or non-finite bounds.
pub(crate) fn check_interval<T: Float>(a: T, b: T) -> Result<()> {
    if !a.is_finite() || !b.is_finite() {
        return Err(Error::InvalidArgument(
            "interval bounds must be finite".to_string(),
        ));
    }
    if a >= b {
        return Err(Error::InvalidArgument(
            "interval is degenerate or inverted, need a < b".to_string(),
        ));
    }
    Ok(())
}

/// Rejects a zero subdivision count.
pub(crate) fn check_subdivisions(n: usize) -> Result<()> {
    if n == 0 {
        return Err(Error::InvalidArgument(
            "subdivision count n must be positive".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_covers_interior_exactly_once() {
        for n in 1..64_usize {
            for k in 1..=n {
                let ranges = partition(n, k);
                assert_eq!(ranges.len(), k);

                let mut covered = vec![false; n];
                for range in &ranges {
                    for i in range.start..=range.end.min(n - 1) {
                        assert!(!covered[i], "index {} covered twice (n={}, k={})", i, n, k);
                        covered[i] = true;
                    }
                }
                for i in 1..n {
                    assert!(covered[i], "index {} not covered (n={}, k={})", i, n, k);
                }
            }
        }
    }

    #[test]
    fn last_range_absorbs_the_remainder() {
        let ranges = partition(10, 4);
        // block size (10-1)/4 = 2, the last worker takes indices 7..=9
        assert_eq!(ranges[0], SubRange { start: 1, end: 2 });
        assert_eq!(ranges[1], SubRange { start: 3, end: 4 });
        assert_eq!(ranges[2], SubRange { start: 5, end: 6 });
        assert_eq!(ranges[3], SubRange { start: 7, end: 9 });
    }

    #[test]
    fn oversubscribed_partition_yields_empty_ranges() {
        let ranges = partition(2, 8);
        let non_empty = ranges.iter().filter(|r| !r.is_empty()).count();
        assert_eq!(non_empty, 1);
        assert_eq!(ranges.iter().map(SubRange::len).sum::<usize>(), 1);
    }

    #[test]
    fn single_trapezoid_has_no_interior() {
        for k in 1..8 {
            let ranges = partition(1, k);
            assert!(ranges.iter().all(SubRange::is_empty));
        }
    }

    #[test]
    fn empty_range_never_touches_the_integrand() {
        let f = |_: f64| -> f64 { panic!("must not be called") };
        let sum = partial_sum(&f, 0.0, 0.5, SubRange { start: 1, end: 0 });
        assert_eq!(sum, 0.0);
    }

    #[test]
    fn partial_sum_accumulates_samples() {
        let f = |x: f64| x;
        // a=0, h=1: samples are 2, 3, 4
        let sum = partial_sum(&f, 0.0, 1.0, SubRange { start: 2, end: 4 });
        assert_eq!(sum, 9.0);
    }

    #[test]
    fn combine_keeps_the_endpoint_weighting() {
        // h/2 * (1 + 3 + 2*10) = 0.5/2 * 24 = 6
        assert_eq!(combine(1.0, 3.0, 10.0, 0.5), 6.0);
    }

    #[test]
    fn inverted_and_non_finite_intervals_are_rejected() {
        assert!(check_interval(1.0, 1.0).is_err());
        assert!(check_interval(2.0, -2.0).is_err());
        assert!(check_interval(f64::NAN, 1.0).is_err());
        assert!(check_interval(0.0, f64::INFINITY).is_err());
        assert!(check_interval(-1.0, 1.0).is_ok());
    }
}
