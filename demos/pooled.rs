use trapir::integrators::pooled;
use trapir::pool::WorkerPool;

use std::sync::Arc;
use std::time::Instant;

/// Sweeps the subdivision count from 10 to 1 000 000 in powers of ten, reusing one worker pool
/// for every call and timing each integration.
fn main() {
    let mut pool = WorkerPool::with_default_capacity().expect("failed to create the pool");
    println!("using a worker pool with {} threads", pool.capacity());
    println!("==============================================");

    let f = Arc::new(|x: f64| 2.0 * x * x + 3.0 * x + 0.5);

    let mut n = 10;
    while n <= 1_000_000 {
        let start = Instant::now();
        let area =
            pooled::integrate(Arc::clone(&f), 2.0, 20.0, n, &pool).expect("integration failed");
        let elapsed = start.elapsed().as_secs_f64() * 1e3;

        println!("n={}: area={:.6}, time={:.3} ms", n, area, elapsed);
        n *= 10;
    }

    pool.shutdown(true);
}
