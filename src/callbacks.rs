//! Implementation of different callback functions.

use std::fmt::Display;

/// Trait for implementing callbacks for the iterative refinement driver.
pub trait Callback<T> {
    /// This method is called after each successfully finished integration and may print
    /// information about it.
    fn print(&self, n: usize, approximation: T);
}

/// A callback function that does nothing
pub struct SinkCallback {}

impl<T> Callback<T> for SinkCallback {
    fn print(&self, _: usize, _: T) {}
}

/// A callback function that prints the result of each individual iteration
pub struct SimpleCallback {}

impl<T: Display> Callback<T> for SimpleCallback {
    fn print(&self, n: usize, approximation: T) {
        println!("n = {:>6}   approximation = {}", n, approximation);
    }
}
