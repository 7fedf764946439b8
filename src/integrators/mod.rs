//! The two interchangeable integration strategies.
//!
//! [`threaded`] spawns one dedicated, scoped thread per chunk and joins them all before
//! combining; [`pooled`] over-partitions the work into tasks submitted to a reusable
//! [`crate::pool::WorkerPool`]. For the same `f`, `a`, `b` and `n` both strategies agree up to
//! floating-point rounding, since the final value only depends on the fixed partition, not on
//! completion order.

pub mod pooled;
pub mod threaded;
