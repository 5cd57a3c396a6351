//! Weft: a generic concurrent crawl engine
//!
//! This crate implements a bounded-concurrency crawl engine: work items are
//! pulled from a dynamically growing queue, each one runs a fetch→parse→archive
//! pipeline, and the engine terminates only once it can prove that no further
//! work will ever be produced. Site-specific parsing and archiving plug in
//! through the [`handler::JobHandler`] trait; the shipped handlers cover plain
//! page saving and image harvesting.

pub mod config;
pub mod engine;
pub mod fetch;
pub mod handler;
pub mod state;
pub mod store;

use thiserror::Error;

/// Main error type for Weft operations
#[derive(Debug, Error)]
pub enum WeftError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] fetch::FetchError),

    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Weft operations
pub type Result<T> = std::result::Result<T, WeftError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use engine::{Request, RetryPolicy, Spider, WorkQueue, WorkerPool};
pub use handler::{JobHandler, ParseOutcome};
pub use state::JobState;
pub use store::{DedupStore, SqliteDedupStore};
