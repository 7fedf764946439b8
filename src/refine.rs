//! The refinement driver: repeated integration with a growing subdivision count until two
//! successive approximations stabilize within a tolerance.
//!
//! The stopping logic is a small state machine with a pure transition function,
//! [`State::advance`], so the convergence rule can be tested without running any integration.
//! The integration strategy itself is injected as a closure over `n`, which keeps the driver
//! agnostic of whether the dedicated-thread or the pooled strategy is underneath.

use crate::callbacks::Callback;
use crate::error::{Error, Result};
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// Configuration of one refinement run.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct RefineConfig<T> {
    /// Two successive approximations closer than this stabilize the run.
    pub tolerance: T,
    /// Subdivision count of the first iteration.
    pub n_start: usize,
    /// Amount added to the subdivision count after each iteration.
    pub n_step: usize,
    /// Iteration cap guarding against an unreachable tolerance; `None` removes the guard and
    /// makes non-termination the caller's problem.
    pub max_iterations: Option<usize>,
}

impl<T: Float> RefineConfig<T> {
    /// A configuration with the given tolerance, starting at `n = 1`, stepping by 50 and
    /// capped at 100 000 iterations.
    pub fn new(tolerance: T) -> Self {
        Self {
            tolerance,
            n_start: 1,
            n_step: 50,
            max_iterations: Some(100_000),
        }
    }
}

/// The driver's state between iterations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum State<T> {
    /// Still refining: `n` is the subdivision count to integrate next, `previous` the most
    /// recent approximation, if any.
    Iterating {
        /// Subdivision count of the next integration.
        n: usize,
        /// The approximation of the previous iteration; `None` before the first one.
        previous: Option<T>,
    },
    /// Terminal: two successive approximations agreed within the tolerance.
    Converged {
        /// The stabilized approximation.
        value: T,
        /// The subdivision count it was computed with.
        n: usize,
    },
}

impl<T: Float> State<T> {
    /// Pure transition function: folds one fresh approximation into the state.
    ///
    /// The first approximation can never converge the run, since there is nothing to compare
    /// it against; a `Converged` state is terminal and absorbs further calls unchanged.
    #[must_use]
    pub fn advance(self, current: T, tolerance: T, n_step: usize) -> Self {
        match self {
            Self::Iterating { n, previous } => match previous {
                Some(prev) if (current - prev).abs() < tolerance => {
                    Self::Converged { value: current, n }
                }
                _ => Self::Iterating {
                    n: n + n_step,
                    previous: Some(current),
                },
            },
            converged @ Self::Converged { .. } => converged,
        }
    }
}

/// The outcome of a refinement run.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct Refinement<T> {
    /// The final approximation.
    pub value: T,
    /// The subdivision count the final approximation was computed with.
    pub n: usize,
    /// How many integrations were performed.
    pub iterations: usize,
    /// `true` if the run stabilized, `false` if the iteration cap cut it off.
    pub converged: bool,
}

/// Runs the refinement loop: integrate at the current `n`, report to the `callback`, feed the
/// approximation to the state machine, repeat until converged or capped.
///
/// The `integrate` closure receives the subdivision count and is expected to wrap one of the
/// strategies in [`crate::integrators`]. Hitting the iteration cap is a successful call with
/// `converged == false`, carrying the last approximation; an integration failure aborts the
/// run immediately, the driver never retries a failed call.
///
/// # Errors
///
/// [`Error::InvalidArgument`] for a non-positive or non-finite tolerance or a zero `n_start`
/// or `n_step`; any error of the injected `integrate` closure is passed through.
pub fn refine<T, I>(
    config: &RefineConfig<T>,
    callback: &impl Callback<T>,
    mut integrate: I,
) -> Result<Refinement<T>>
where
    T: Float,
    I: FnMut(usize) -> Result<T>,
{
    if config.tolerance <= T::zero() || !config.tolerance.is_finite() {
        return Err(Error::InvalidArgument(
            "tolerance must be positive and finite".to_string(),
        ));
    }
    if config.n_start == 0 || config.n_step == 0 {
        return Err(Error::InvalidArgument(
            "n_start and n_step must be positive".to_string(),
        ));
    }

    let mut state = State::Iterating {
        n: config.n_start,
        previous: None,
    };
    let mut iterations = 0;
    let mut last: Option<(usize, T)> = None;

    loop {
        let n = match state {
            State::Converged { value, n } => {
                return Ok(Refinement {
                    value,
                    n,
                    iterations,
                    converged: true,
                })
            }
            State::Iterating { n, .. } => n,
        };

        if let Some(cap) = config.max_iterations {
            if iterations >= cap {
                let (n, value) = last.unwrap_or((config.n_start, T::zero()));
                return Ok(Refinement {
                    value,
                    n,
                    iterations,
                    converged: false,
                });
            }
        }

        let current = integrate(n)?;
        callback.print(n, current);
        iterations += 1;
        last = Some((n, current));
        state = state.advance(current, config.tolerance, config.n_step);
    }
}
