//! A long-lived, bounded worker pool for the pooled integration strategy.
//!
//! The pool is an explicitly owned resource: the caller creates it, passes it to every
//! [`crate::integrators::pooled`] call that should share it, and shuts it down when no further
//! calls will be made. Nothing in this crate keeps a hidden process-wide pool.

use crate::error::{panic_message, Error, Result};
use crossbeam::channel::{bounded, Receiver, Sender};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Pending jobs each worker may have queued before submission blocks.
const PENDING_PER_WORKER: usize = 64;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Monotonic stop flag that can only transition from false to true.
#[derive(Debug, Default)]
struct StopFlag {
    inner: AtomicBool,
}

impl StopFlag {
    fn stop(&self) {
        self.inner.store(true, Ordering::Relaxed);
    }

    fn is_stopped(&self) -> bool {
        self.inner.load(Ordering::Relaxed)
    }
}

/// A handle on one submitted task, resolved exactly once via [`TaskHandle::wait`].
#[derive(Debug)]
pub struct TaskHandle<R> {
    result: Receiver<std::thread::Result<R>>,
}

impl<R> TaskHandle<R> {
    /// Blocks until the task has run and returns its result.
    ///
    /// A task whose closure panicked resolves to [`Error::Evaluation`] carrying the panic
    /// payload; a task dropped by a hard shutdown before it could run resolves to
    /// [`Error::Worker`].
    pub fn wait(self) -> Result<R> {
        match self.result.recv() {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(payload)) => Err(Error::Evaluation(panic_message(payload.as_ref()))),
            Err(_) => Err(Error::Worker(
                "task was cancelled before it could run".to_string(),
            )),
        }
    }
}

/// A fixed set of worker threads draining a bounded job queue.
///
/// The pool is safe for concurrent submission from several integration calls; each call's tasks
/// are independent, and the queue neither reorders nor drops tasks while the pool is live.
#[derive(Debug)]
pub struct WorkerPool {
    jobs: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
    stop: Arc<StopFlag>,
    capacity: usize,
}

impl WorkerPool {
    /// Creates a pool of `capacity` worker threads.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidArgument`] for `capacity == 0` and with [`Error::Worker`] if
    /// the operating system refuses to spawn a thread.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidArgument(
                "pool capacity must be positive".to_string(),
            ));
        }

        let (sender, receiver) = bounded::<Job>(capacity * PENDING_PER_WORKER);
        let stop = Arc::new(StopFlag::default());

        let workers = (0..capacity)
            .map(|id| {
                let receiver = receiver.clone();
                let stop = Arc::clone(&stop);
                std::thread::Builder::new()
                    .name(format!("trapir-worker-{}", id))
                    .spawn(move || worker_loop(&receiver, &stop))
                    .map_err(|err| Error::Worker(err.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            jobs: Some(sender),
            workers,
            stop,
            capacity,
        })
    }

    /// Creates a pool sized to the host's available parallelism.
    ///
    /// # Errors
    ///
    /// Fails only if a worker thread cannot be spawned.
    pub fn with_default_capacity() -> Result<Self> {
        Self::new(num_cpus::get())
    }

    /// The number of worker threads.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether [`WorkerPool::shutdown`] has already run.
    #[must_use]
    pub const fn is_shut_down(&self) -> bool {
        self.jobs.is_none()
    }

    /// Submits one job and returns a handle on its eventual result.
    ///
    /// Blocks if the job queue is full. The handle resolves once a worker has run the job, or
    /// with a cancellation error if a hard shutdown discards it first.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::PoolUnavailable`] once the pool has been shut down.
    pub fn submit<R, F>(&self, job: F) -> Result<TaskHandle<R>>
    where
        R: Send + 'static,
        F: FnOnce() -> R + Send + 'static,
    {
        let jobs = self.jobs.as_ref().ok_or(Error::PoolUnavailable)?;

        let (sender, receiver) = bounded(1);
        let wrapped: Job = Box::new(move || {
            let outcome = catch_unwind(AssertUnwindSafe(job));
            // the handle may have been dropped, which is fine
            let _ = sender.send(outcome);
        });

        jobs.send(wrapped).map_err(|_| Error::PoolUnavailable)?;
        Ok(TaskHandle { result: receiver })
    }

    /// Shuts the pool down and joins every worker thread.
    ///
    /// With `graceful == true` all pending jobs are still run before the workers exit. With
    /// `graceful == false` pending jobs are discarded and their handles resolve with a
    /// cancellation error; a job already in flight runs to completion, since a thread cannot be
    /// killed mid-closure. Shutting down twice is a no-op.
    pub fn shutdown(&mut self, graceful: bool) {
        if !graceful {
            self.stop.stop();
        }

        // closing the queue is what makes the workers exit their loop
        self.jobs = None;
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown(true);
    }
}

fn worker_loop(jobs: &Receiver<Job>, stop: &StopFlag) {
    while let Ok(job) = jobs.recv() {
        if stop.is_stopped() {
            // dropping the job drops its result sender, resolving the handle as cancelled
            drop(job);
            continue;
        }
        job();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(matches!(
            WorkerPool::new(0),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn submitted_jobs_resolve_in_any_order() {
        let pool = WorkerPool::new(2).unwrap();
        let handles = (0..16_u64)
            .map(|i| pool.submit(move || i * i).unwrap())
            .collect::<Vec<_>>();

        let results = handles
            .into_iter()
            .map(|h| h.wait().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(results, (0..16_u64).map(|i| i * i).collect::<Vec<_>>());
    }

    #[test]
    fn panicking_job_surfaces_as_evaluation_failure() {
        let pool = WorkerPool::new(1).unwrap();
        let handle = pool
            .submit(|| -> u32 { panic!("boom at x = 3") })
            .unwrap();

        match handle.wait() {
            Err(Error::Evaluation(msg)) => assert!(msg.contains("boom")),
            other => panic!("expected an evaluation failure, got {:?}", other),
        }
    }

    #[test]
    fn submit_after_shutdown_fails() {
        let mut pool = WorkerPool::new(1).unwrap();
        pool.shutdown(true);
        assert!(pool.is_shut_down());
        assert!(matches!(
            pool.submit(|| 1_u32),
            Err(Error::PoolUnavailable)
        ));
    }

    #[test]
    fn graceful_shutdown_drains_pending_jobs() {
        let mut pool = WorkerPool::new(1).unwrap();
        let handles = (0..8_u64)
            .map(|i| pool.submit(move || i + 1).unwrap())
            .collect::<Vec<_>>();
        pool.shutdown(true);

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.wait().unwrap(), i as u64 + 1);
        }
    }

    #[test]
    fn hard_shutdown_cancels_pending_jobs() {
        let mut pool = WorkerPool::new(1).unwrap();

        // the first job blocks the single worker until the gate opens
        let (started_tx, started_rx) = bounded::<()>(1);
        let (gate_tx, gate_rx) = bounded::<()>(1);
        let blocked = pool
            .submit(move || {
                started_tx.send(()).unwrap();
                gate_rx.recv().unwrap();
                1_u32
            })
            .unwrap();
        let pending = pool.submit(|| 2_u32).unwrap();

        // make sure the worker is inside the first job before shutting down
        started_rx.recv().unwrap();

        // shutdown blocks on the in-flight job, so the gate opens from a helper thread
        let opener = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(50));
            gate_tx.send(()).unwrap();
        });
        pool.shutdown(false);
        opener.join().unwrap();

        assert_eq!(blocked.wait().unwrap(), 1);
        assert!(matches!(pending.wait(), Err(Error::Worker(_))));
    }
}
