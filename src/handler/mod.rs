//! Pluggable parse/archive behavior
//!
//! The engine is generic over what "parse" and "archive" mean for a crawl
//! target. A [`JobHandler`] supplies both stages; the engine drives them and
//! owns all retry, concurrency, and termination concerns. Handlers are
//! site-specific plugins, so their errors are `anyhow` values rather than a
//! closed enum.

mod asset;
mod text_file;

pub use asset::ImageHarvestHandler;
pub use text_file::{SavedPage, TextFileHandler};

use crate::engine::{Request, WorkQueue};
use async_trait::async_trait;

/// Result type for handler stages
pub type HandlerResult<T> = anyhow::Result<T>;

/// What a parse stage made of the fetched text
#[derive(Debug)]
pub enum ParseOutcome<P> {
    /// The fetched content reveals one more page to crawl
    Follow(Request),

    /// Terminal content to hand to the archive stage
    Payload(P),

    /// Nothing further to do for this request
    Nothing,
}

/// Parse and archive stages for one crawl target family
///
/// `parse` may also push additional requests directly onto the queue (a page
/// that links to many others), independent of its returned outcome. A parse
/// error fails the job; an archive error is logged and swallowed by the
/// engine, since the fetched and parsed work is not worth repeating for a
/// failed side effect.
#[async_trait]
pub trait JobHandler: Send + Sync + 'static {
    /// The payload type produced by `parse` and consumed by `archive`
    type Payload: Send + 'static;

    /// Examines fetched text and decides what happens next
    async fn parse(
        &self,
        text: &str,
        request: &Request,
        queue: &WorkQueue,
    ) -> HandlerResult<ParseOutcome<Self::Payload>>;

    /// Stores a payload produced by `parse`
    async fn archive(&self, payload: Self::Payload) -> HandlerResult<()>;
}
