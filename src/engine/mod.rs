//! Core crawl engine
//!
//! This module contains the concurrency machinery of the crawl:
//! - The shared work queue and the bounded worker pool
//! - The retry policy for transient faults
//! - The per-request job pipeline
//! - The spider orchestrator and its termination-detection loop

mod job;
mod pool;
mod queue;
mod retry;
mod spider;

pub use pool::WorkerPool;
pub use queue::{Request, WorkQueue};
pub use retry::{RetryPolicy, DEFAULT_RETRY_COUNT};
pub use spider::Spider;

use crate::config::Config;
use crate::handler::JobHandler;
use crate::Result;

/// Runs a complete crawl with the given handler
///
/// Constructs a [`Spider`] from the configuration, drives it to completion,
/// and returns once the queue is empty and every job has finished.
pub async fn run_crawl<H: JobHandler>(config: &Config, handler: H) -> Result<()> {
    let mut spider = Spider::new(config, handler)?;
    spider.run().await
}
