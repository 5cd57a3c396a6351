//! Per-request browser identity
//!
//! Each job fetches with a randomized but realistic browser identity: a
//! user-agent drawn from a configured pool, a fixed set of default headers,
//! and any caller-supplied overrides on top. The random source is explicit
//! and seedable, so runs can be made reproducible from configuration.

use crate::ConfigError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;
use std::sync::Mutex;

/// User-agent strings used when the configuration supplies none
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
];

/// Pool of browser identities plus an explicit random source
pub struct IdentityPool {
    user_agents: Vec<String>,
    overrides: Vec<(HeaderName, HeaderValue)>,
    rng: Mutex<StdRng>,
}

impl IdentityPool {
    /// Creates a pool from configured user agents and header overrides
    ///
    /// An empty `user_agents` list falls back to [`DEFAULT_USER_AGENTS`].
    /// Override names and values are validated here so a bad configuration
    /// fails spider construction instead of every request.
    pub fn new(
        user_agents: Vec<String>,
        overrides: &HashMap<String, String>,
        seed: Option<u64>,
    ) -> Result<Self, ConfigError> {
        let user_agents = if user_agents.is_empty() {
            DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect()
        } else {
            user_agents
        };

        let mut parsed = Vec::with_capacity(overrides.len());
        for (name, value) in overrides {
            let name = name.parse::<HeaderName>().map_err(|_| {
                ConfigError::Validation(format!("invalid header name '{}'", name))
            })?;
            let value = value.parse::<HeaderValue>().map_err(|_| {
                ConfigError::Validation(format!("invalid value for header '{}'", name))
            })?;
            parsed.push((name, value));
        }
        // Deterministic override order regardless of map iteration
        parsed.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            user_agents,
            overrides: parsed,
            rng: Mutex::new(rng),
        })
    }

    /// Builds the header set for one request
    ///
    /// A random user-agent plus the default browser headers, with configured
    /// overrides applied last so they win on collision.
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        let user_agent = self
            .choose(&self.user_agents)
            .expect("identity pool has at least one user agent");
        if let Ok(value) = HeaderValue::from_str(user_agent) {
            headers.insert(reqwest::header::USER_AGENT, value);
        }
        headers.insert(reqwest::header::ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(
            reqwest::header::ACCEPT_ENCODING,
            HeaderValue::from_static("gzip, deflate"),
        );
        headers.insert(
            reqwest::header::CACHE_CONTROL,
            HeaderValue::from_static("max-age=0"),
        );

        for (name, value) in &self.overrides {
            headers.insert(name.clone(), value.clone());
        }

        headers
    }

    /// Picks a uniformly random element; `None` when the slice is empty
    pub fn choose<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        let mut rng = self.rng.lock().expect("identity rng mutex poisoned");
        items.choose(&mut *rng)
    }
}
