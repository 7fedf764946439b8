//! Error types shared by all integration routines.

use thiserror::Error;

/// The error type returned by the integration entry points and the worker pool.
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied argument makes the quadrature meaningless, for example `n == 0`,
    /// zero workers, or an inverted or non-finite interval.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The integrand panicked while being evaluated at some sample point. The panic payload,
    /// if it was a string, is carried along.
    #[error("integrand evaluation failed: {0}")]
    Evaluation(String),

    /// A worker thread or pool task ended abnormally for a reason other than an integrand
    /// failure, for example because the pool was shut down while the task was still pending.
    #[error("worker failed: {0}")]
    Worker(String),

    /// A task was submitted to a pool that has already been shut down.
    #[error("worker pool has been shut down")]
    PoolUnavailable,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Renders a panic payload into a message for [`Error::Evaluation`].
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "integrand panicked with a non-string payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_payloads_are_rendered() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("bad point");
        assert_eq!(panic_message(boxed.as_ref()), "bad point");

        let boxed: Box<dyn std::any::Any + Send> = Box::new(String::from("x out of domain"));
        assert_eq!(panic_message(boxed.as_ref()), "x out of domain");

        let boxed: Box<dyn std::any::Any + Send> = Box::new(42_u32);
        assert_eq!(
            panic_message(boxed.as_ref()),
            "integrand panicked with a non-string payload"
        );
    }

    #[test]
    fn display_is_informative() {
        let err = Error::InvalidArgument("n must be positive".to_string());
        assert_eq!(err.to_string(), "invalid argument: n must be positive");
        assert_eq!(
            Error::PoolUnavailable.to_string(),
            "worker pool has been shut down"
        );
    }
}
