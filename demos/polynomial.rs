use trapir::callbacks::SimpleCallback;
use trapir::integrators::threaded;
use trapir::refine::{refine, RefineConfig};

/// Integrates f(x) = 2x^2 + 3x + 0.5 over [2, 20] with the dedicated-thread strategy, refining
/// the subdivision count until the approximation stabilizes, and compares against the analytic
/// value of 5931.
fn main() {
    let f = |x: f64| 2.0 * x * x + 3.0 * x + 0.5;
    let (a, b) = (2.0, 20.0);
    let workers = 4;

    let config = RefineConfig {
        tolerance: 1e-9,
        n_start: 1,
        n_step: 50,
        max_iterations: Some(100_000),
    };

    let report = refine(&config, &SimpleCallback {}, |n| {
        threaded::integrate(&f, a, b, n, workers)
    })
    .expect("integration failed");

    println!();
    if report.converged {
        println!("the value of the integral has stabilized.");
        println!("final approximation: {:.12}", report.value);
    } else {
        println!(
            "did not stabilize within {} iterations, last value: {:.12}",
            report.iterations, report.value
        );
    }

    let exact = 5931.0;
    println!();
    println!("analytic value: {:.12}", exact);
    println!("absolute error: {:.12}", (report.value - exact).abs());
}
