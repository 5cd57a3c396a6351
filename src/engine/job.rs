//! Job: the execution of one request through fetch→parse→archive
//!
//! A job is transient: it is created for exactly one request, runs to a
//! terminal state, and is never restarted. Fetching goes through the retry
//! policy; a fetch or parse failure ends the job as failed without touching
//! the rest of the run; an archive failure is logged and swallowed.

use crate::engine::queue::{Request, WorkQueue};
use crate::engine::retry::RetryPolicy;
use crate::fetch::{fetch_text, FetchError, FetchResult, Fetched};
use crate::handler::{JobHandler, ParseOutcome};
use crate::state::JobState;
use reqwest::header::HeaderMap;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

pub(crate) struct Job<H: JobHandler> {
    request: Request,
    queue: Arc<WorkQueue>,
    handler: Arc<H>,
    client: Client,
    headers: HeaderMap,
    retry: RetryPolicy,
    timeout: Duration,
    state: JobState,
}

impl<H: JobHandler> Job<H> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        request: Request,
        queue: Arc<WorkQueue>,
        handler: Arc<H>,
        client: Client,
        headers: HeaderMap,
        retry: RetryPolicy,
        timeout: Duration,
    ) -> Self {
        Self {
            request,
            queue,
            handler,
            client,
            headers,
            retry,
            timeout,
            state: JobState::Pending,
        }
    }

    fn advance(&mut self, next: JobState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal job transition {} -> {}",
            self.state,
            next
        );
        tracing::trace!("job {}: {} -> {}", self.request.target(), self.state, next);
        self.state = next;
    }

    /// Runs the job to a terminal state; never propagates an error
    pub(crate) async fn run(mut self) {
        tracing::debug!("run request: {}", self.request.target());

        self.advance(JobState::Fetching);
        let fetch_result = self.fetch().await;
        let fetched = match fetch_result {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::error!("fetch failed for {}: {}", self.request.target(), e);
                self.advance(JobState::Failed);
                return;
            }
        };

        if fetched.final_url != self.request.target() {
            // Non-fatal; the fetched body is still handed to parse
            tracing::error!(
                "redirected: {} to {}",
                self.request.target(),
                fetched.final_url
            );
        }

        self.advance(JobState::Parsing);
        let parse_result = self
            .handler
            .parse(&fetched.body, &self.request, &self.queue)
            .await;
        let outcome = match parse_result {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("parse failed for {}: {:#}", self.request.target(), e);
                self.advance(JobState::Failed);
                return;
            }
        };

        match outcome {
            ParseOutcome::Follow(next) => {
                self.advance(JobState::Enqueued);
                self.queue.push(next);
            }
            ParseOutcome::Payload(payload) => {
                self.advance(JobState::Archiving);
                if let Err(e) = self.handler.archive(payload).await {
                    // The fetched and parsed work is not retried for a
                    // failed side effect
                    tracing::error!("archive failed for {}: {:#}", self.request.target(), e);
                }
            }
            ParseOutcome::Nothing => {}
        }

        self.advance(JobState::Done);
    }

    async fn fetch(&self) -> FetchResult<Fetched> {
        self.retry
            .run("fetch", FetchError::is_transient, || {
                fetch_text(
                    &self.client,
                    self.request.target(),
                    self.headers.clone(),
                    self.timeout,
                )
            })
            .await
    }
}
