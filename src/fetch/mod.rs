//! HTTP fetch transport
//!
//! This module handles all network retrieval for the engine, including:
//! - Building HTTP clients (one direct, one per configured proxy)
//! - Per-request browser identity headers
//! - Timed-out GET requests returning body text and the final URL
//! - Classification of failures into transient and permanent kinds

mod client;
mod identity;

pub use client::{build_http_client, fetch_text, ClientPool, Fetched};
pub use identity::{IdentityPool, DEFAULT_USER_AGENTS};

use thiserror::Error;

/// Errors raised by the fetch transport
///
/// The transient kinds (bad status, timeout, connection failure, truncated
/// body) are the retryable set for the fetch stage; everything else fails
/// a request on first occurrence.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection error for {url}: {source}")]
    Connect { url: String, source: reqwest::Error },

    #[error("Truncated body for {url}: {source}")]
    Truncated { url: String, source: reqwest::Error },

    #[error("Request failed for {url}: {source}")]
    Other { url: String, source: reqwest::Error },
}

impl FetchError {
    /// Returns true if this fault kind is eligible for bounded retry
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Status { .. } | Self::Timeout { .. } | Self::Connect { .. } | Self::Truncated { .. }
        )
    }

    /// Classifies a reqwest error for `url`
    pub(crate) fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        let url = url.to_string();
        if source.is_timeout() {
            Self::Timeout { url }
        } else if source.is_connect() {
            Self::Connect { url, source }
        } else if source.is_body() || source.is_decode() {
            Self::Truncated { url, source }
        } else {
            Self::Other { url, source }
        }
    }
}

/// Result type for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;
