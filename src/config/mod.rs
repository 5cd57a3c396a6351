//! Configuration loading and validation
//!
//! Configuration is a TOML file covering engine behavior (pool size, retry
//! count, fetch timeout), browser identity, header overrides, proxies, seed
//! targets, and output paths.

mod parser;
mod types;
mod validation;

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use types::{ArchiveConfig, Config, EngineConfig, IdentityConfig, StoreConfig};
pub use validation::validate;
