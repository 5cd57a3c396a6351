//! Dedup store for crawl identifiers
//!
//! The engine itself never deduplicates: whether a request is worth
//! re-enqueueing is decided by site-specific parse code, which consults a
//! [`DedupStore`]. The store's contract is membership, nothing more: it
//! durably marks identifiers as seen and reports which ones were new.

mod sqlite;

pub use sqlite::SqliteDedupStore;

use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Durable has-this-been-seen membership over identifier strings
///
/// `record_new` returns the subset of `candidates` never seen in any prior
/// call on this store, and marks every candidate (new or not) as seen. Safe
/// to call repeatedly with overlapping inputs; an identifier is never
/// returned twice across calls. What an identifier is derived from (full
/// URL, file name, anything else) is the caller's policy.
pub trait DedupStore {
    fn record_new(&mut self, candidates: &[String]) -> StoreResult<Vec<String>>;
}
