use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Main configuration structure for Weft
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    /// Extra request headers merged over the default browser set
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Proxy URLs; one is chosen per job, empty means direct
    #[serde(default)]
    pub proxies: Vec<String>,
    /// Initial crawl targets
    pub seeds: Vec<String>,
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// Engine behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of concurrently running jobs
    #[serde(rename = "pool-size", default = "default_pool_size")]
    pub pool_size: u32,

    /// Fetch attempts per request before the job fails
    #[serde(rename = "retry-count", default = "default_retry_count")]
    pub retry_count: u32,

    /// Per-request fetch timeout (milliseconds)
    #[serde(rename = "fetch-timeout-ms", default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

impl EngineConfig {
    /// Returns the fetch timeout as a duration
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            retry_count: default_retry_count(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
        }
    }
}

/// Browser identity configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityConfig {
    /// User-agent pool; empty falls back to the built-in set
    #[serde(rename = "user-agents", default)]
    pub user_agents: Vec<String>,

    /// Seed for the identity/proxy random source; unset draws from entropy
    #[serde(rename = "rng-seed", default)]
    pub rng_seed: Option<u64>,
}

/// Archive output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveConfig {
    /// Directory the page handler writes text files into
    #[serde(rename = "page-directory", default = "default_page_directory")]
    pub page_directory: String,

    /// Directory the image handler downloads assets into
    #[serde(rename = "image-directory", default = "default_image_directory")]
    pub image_directory: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            page_directory: default_page_directory(),
            image_directory: default_image_directory(),
        }
    }
}

/// Dedup store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite dedup database
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_pool_size() -> u32 {
    10
}

fn default_retry_count() -> u32 {
    3
}

fn default_fetch_timeout_ms() -> u64 {
    2000
}

fn default_page_directory() -> String {
    "./pages".to_string()
}

fn default_image_directory() -> String {
    "./imgs".to_string()
}

fn default_database_path() -> String {
    "./weft.db".to_string()
}
