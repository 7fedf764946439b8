#![warn(clippy::all, clippy::cargo, clippy::nursery, clippy::pedantic)]
#![warn(missing_docs)]

//! The crate `trapir` provides parallel [composite trapezoidal rule] routines, which approximate
//! definite one-dimensional [integrals] by distributing the interior-point summation across
//! concurrent workers.
//!
//! # Features
//!
//! This library was designed with the following features as essential in mind:
//!
//! - **Generic numeric type**. The numeric type used in this library is not fixed, but instead a
//! generic parameter, so that the integration routines can be used with either `f32`, `f64`, or a
//! custom numeric type that implements the `Float` trait from the `num-traits` crate.
//! - **Two interchangeable strategies**. A one-shot strategy that spawns one dedicated thread per
//! chunk of sample points and joins them all before combining, and a pooled strategy that submits
//! over-partitioned tasks to a long-lived, reusable [`WorkerPool`](pool::WorkerPool) and awaits
//! one handle per task. Both strategies produce the same value for the same partition, up to
//! floating-point rounding.
//! - **Explicit pool ownership**. The worker pool is an explicitly constructed and explicitly
//! shut-down resource that callers pass to the integration routine. There is no hidden
//! process-wide pool, so tests and applications may run several independent pools side by side.
//! - **Refinement driver**. An iterative driver increases the subdivision count until two
//! successive approximations agree within a tolerance, with an iteration cap so an unreachable
//! tolerance surfaces as a non-converged report instead of a hang.
//! - **Error propagation**. A panicking integrand, a cancelled pool task, and a call against a
//! shut-down pool each fail the whole integration call with a distinct error; no partial result
//! is ever silently replaced by zero.
//!
//! # What is ...?
//!
//! This section is a dictionary of terms that are used in this documentation. Given
//!
//! $$ I = \int_a^b \mathrm{d} x \\, f(x) $$
//!
//! we approximate $I$ with the composite trapezoidal rule on $n$ uniform subintervals of width
//! $h = (b - a) / n$ as
//!
//! $$ I \approx \frac{h}{2} \left( f(a) + f(b) + 2 \sum_{i=1}^{n-1} f(a + i h) \right) $$
//!
//! We use the following terms:
//!
//! - the *integrand* is the function $f$ that is being integrated. It is assumed to be a pure
//! function of its argument, so that any number of workers may evaluate it concurrently without
//! synchronization;
//! - a *sub-range* is a contiguous block of interior sample indices in $[1, n-1]$ owned by one
//! worker. The sub-ranges of one call partition $[1, n-1]$ exactly, and the last sub-range
//! absorbs the remainder of the integer division;
//! - a *partial sum* is the unweighted sum of integrand values at the sample points of one
//! sub-range. Partial sums are combined with the half-weighted endpoints and the step size $h$
//! into the final approximation;
//! - *stabilization* is the refinement driver's stopping condition: two successive approximations
//! differ by less than a configured tolerance.
//!
//! [composite trapezoidal rule]: https://en.wikipedia.org/wiki/Trapezoidal_rule
//! [integrals]: https://en.wikipedia.org/wiki/Integral

pub mod callbacks;
pub mod core;
pub mod error;
pub mod integrators;
pub mod pool;
pub mod refine;

pub use crate::core::*;
pub use crate::error::{Error, Result};
