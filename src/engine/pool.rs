//! Bounded worker pool for concurrently executing jobs
//!
//! The pool runs at most `capacity` jobs at once. Occupancy is tracked by an
//! atomic counter that the spawned wrapper releases as the very last thing a
//! job does, so a free slot always means the job can no longer produce work.
//! Every release is followed by a wake on the shared job-finished signal.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Bounded set of concurrently executing jobs
///
/// Invariant: the number of live jobs never exceeds `capacity`. Membership
/// changes only via [`start`](WorkerPool::start) and job completion.
pub struct WorkerPool {
    capacity: usize,
    running: Arc<AtomicUsize>,
    job_finished: Arc<Notify>,
    handles: Vec<JoinHandle<()>>,
}

/// Releases one pool slot and raises the finished signal when dropped
///
/// Held by the wrapper task for the whole life of a job, so the slot is
/// released even if the job future panics.
struct SlotGuard {
    running: Arc<AtomicUsize>,
    job_finished: Arc<Notify>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.running.fetch_sub(1, Ordering::SeqCst);
        self.job_finished.notify_one();
    }
}

impl WorkerPool {
    /// Creates a pool with the given capacity
    ///
    /// `job_finished` is shared with the spider loop: it is notified once per
    /// completed job, after that job's slot has been released.
    pub fn new(capacity: usize, job_finished: Arc<Notify>) -> Self {
        Self {
            capacity,
            running: Arc::new(AtomicUsize::new(0)),
            job_finished,
            handles: Vec::new(),
        }
    }

    /// Returns the configured capacity
    pub fn size(&self) -> usize {
        self.capacity
    }

    /// Returns the number of free slots, observable without blocking
    pub fn free_count(&self) -> usize {
        self.capacity - self.running.load(Ordering::SeqCst)
    }

    /// Returns true if no job is running
    ///
    /// Once this is observed the pool stays idle until the caller starts
    /// another job: only running jobs can produce new work.
    pub fn is_idle(&self) -> bool {
        self.running.load(Ordering::SeqCst) == 0
    }

    /// Starts a job in the pool
    ///
    /// Contract: the caller must have checked `free_count() > 0`; starting a
    /// job in a full pool is a bug in the caller.
    ///
    /// # Panics
    ///
    /// Panics if every slot is occupied.
    pub fn start<F>(&mut self, job: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        assert!(
            self.free_count() > 0,
            "worker pool is full (capacity {})",
            self.capacity
        );

        self.running.fetch_add(1, Ordering::SeqCst);
        let guard = SlotGuard {
            running: Arc::clone(&self.running),
            job_finished: Arc::clone(&self.job_finished),
        };

        self.handles.push(tokio::spawn(async move {
            let _guard = guard;
            job.await;
        }));
    }

    /// Drops the join handles of jobs that have reached a terminal state
    pub fn reap(&mut self) {
        self.handles.retain(|handle| !handle.is_finished());
    }

    /// Blocks until every job has finished; used only during shutdown
    pub async fn join(&mut self) {
        for handle in self.handles.drain(..) {
            // A panicked job already released its slot via the guard
            let _ = handle.await;
        }
    }
}
