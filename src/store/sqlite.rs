//! SQLite dedup store implementation

use crate::store::{DedupStore, StoreResult};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;

/// SQLite-backed dedup store
///
/// One table, one unique column; `INSERT OR IGNORE` makes membership checks
/// and marking a single statement.
pub struct SqliteDedupStore {
    conn: Connection,
}

impl SqliteDedupStore {
    /// Opens or creates a store at `path`
    pub fn new(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;
        Self::initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Creates an in-memory store (tests and throwaway runs)
    pub fn new_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn initialize_schema(conn: &Connection) -> StoreResult<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS seen (
                identifier TEXT PRIMARY KEY,
                first_seen TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }
}

impl DedupStore for SqliteDedupStore {
    fn record_new(&mut self, candidates: &[String]) -> StoreResult<Vec<String>> {
        let tx = self.conn.transaction()?;
        let mut fresh = Vec::new();
        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR IGNORE INTO seen (identifier, first_seen) VALUES (?1, ?2)",
            )?;
            let now = Utc::now().to_rfc3339();
            for candidate in candidates {
                if stmt.execute(params![candidate, now])? > 0 {
                    fresh.push(candidate.clone());
                }
            }
        }
        tx.commit()?;
        Ok(fresh)
    }
}
