//! Spider: the orchestrator that drives a crawl to provable completion
//!
//! The spider owns the work queue and the worker pool, seeds the queue from
//! configuration, and runs the termination-detection loop. The engine cannot
//! know in advance how many requests will ever exist, so an empty queue alone
//! proves nothing: a running job may still produce more work. The loop only
//! declares completion after observing, in that order, an idle pool and then
//! an empty queue; since jobs enqueue all their work before releasing their
//! slot, that pair of observations is a stable fixed point.

use crate::config::{validate, Config};
use crate::engine::job::Job;
use crate::engine::pool::WorkerPool;
use crate::engine::queue::{Request, WorkQueue};
use crate::engine::retry::RetryPolicy;
use crate::fetch::{ClientPool, IdentityPool};
use crate::handler::JobHandler;
use crate::Result;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Notify;

/// Orchestrator owning the queue, the pool, and the termination loop
pub struct Spider<H: JobHandler> {
    queue: Arc<WorkQueue>,
    pool: WorkerPool,
    handler: Arc<H>,
    clients: ClientPool,
    identity: IdentityPool,
    retry: RetryPolicy,
    timeout: std::time::Duration,
    job_finished: Arc<Notify>,
    stopped: bool,
}

impl<H: JobHandler> Spider<H> {
    /// Creates a spider and seeds its queue from the configuration
    ///
    /// This is the only fatal failure point of a run: an invalid
    /// configuration or an HTTP client that cannot be built aborts here.
    /// Everything after construction degrades to per-request log lines.
    pub fn new(config: &Config, handler: H) -> Result<Self> {
        validate(config)?;

        let timeout = config.engine.fetch_timeout();
        let clients = ClientPool::new(timeout, &config.proxies)?;
        let identity = IdentityPool::new(
            config.identity.user_agents.clone(),
            &config.headers,
            config.identity.rng_seed,
        )?;

        let queue = Arc::new(WorkQueue::new());
        for seed in &config.seeds {
            queue.push(Request::new(seed));
        }

        let job_finished = Arc::new(Notify::new());
        let pool = WorkerPool::new(config.engine.pool_size as usize, Arc::clone(&job_finished));

        Ok(Self {
            queue,
            pool,
            handler: Arc::new(handler),
            clients,
            identity,
            retry: RetryPolicy::new(config.engine.retry_count),
            timeout,
            job_finished,
            stopped: false,
        })
    }

    /// Returns true once the termination loop has declared completion
    pub fn stopped(&self) -> bool {
        self.stopped
    }

    /// Pushes an additional request; usable until the spider stops
    pub fn enqueue(&self, request: Request) {
        self.queue.push(request);
    }

    /// Drives the crawl until the queue is empty and the pool is idle
    pub async fn run(&mut self) -> Result<()> {
        tracing::info!(
            "spider starting: {} seed request(s), pool size {}",
            self.queue.len(),
            self.pool.size()
        );
        let started = Instant::now();
        let mut jobs_started: u64 = 0;

        while !self.stopped {
            self.pool.reap();

            if self.pool.free_count() == 0 {
                // Every slot busy; a request must wait for a completion
                self.job_finished.notified().await;
                continue;
            }

            match self.queue.pop() {
                Some(request) => {
                    tracing::info!("dequeued request: {}", request.target());
                    jobs_started += 1;
                    self.start_job(request);
                }
                None => {
                    // Idle pool must be observed before the empty queue:
                    // only a running job can add work, and all of a job's
                    // pushes happen before its slot is released.
                    if self.pool.is_idle() && self.queue.is_empty() {
                        self.stop().await;
                    } else {
                        // Coalescing, level-triggered wake: state is
                        // re-polled from the top after every wakeup
                        self.job_finished.notified().await;
                    }
                }
            }
        }

        tracing::info!(
            "crawl completed: {} job(s) in {:?}",
            jobs_started,
            started.elapsed()
        );
        Ok(())
    }

    /// Sets the stop flag and drains the pool
    async fn stop(&mut self) {
        tracing::debug!("spider stopping");
        self.stopped = true;
        self.pool.join().await;
    }

    fn start_job(&mut self, request: Request) {
        // Proxy choice is per job: a random proxied client, or the direct
        // one when no proxies are configured
        let client = match self.identity.choose(self.clients.proxied()) {
            Some(client) => client.clone(),
            None => self.clients.direct().clone(),
        };

        let job = Job::new(
            request,
            Arc::clone(&self.queue),
            Arc::clone(&self.handler),
            client,
            self.identity.headers(),
            self.retry,
            self.timeout,
        );
        self.pool.start(job.run());
    }
}
