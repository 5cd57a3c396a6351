//! HTTP client construction and text retrieval

use crate::fetch::{FetchError, FetchResult};
use reqwest::header::HeaderMap;
use reqwest::{Client, Proxy};
use std::time::Duration;

/// Builds an HTTP client, optionally routed through a proxy
///
/// Redirects are followed (up to reqwest's default limit); the job compares
/// the final URL against the requested target afterwards.
pub fn build_http_client(timeout: Duration, proxy: Option<&str>) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .gzip(true)
        .brotli(true);

    if let Some(proxy_url) = proxy {
        builder = builder.proxy(Proxy::all(proxy_url)?);
    }

    builder.build()
}

/// The set of clients a spider fetches through
///
/// One direct client plus one client per configured proxy. Reqwest binds the
/// proxy at build time, so per-job proxy choice means picking a pre-built
/// client rather than rebuilding one per request.
pub struct ClientPool {
    direct: Client,
    proxied: Vec<Client>,
}

impl ClientPool {
    /// Builds the direct client and one client per proxy URL
    pub fn new(timeout: Duration, proxies: &[String]) -> Result<Self, reqwest::Error> {
        let direct = build_http_client(timeout, None)?;
        let proxied = proxies
            .iter()
            .map(|p| build_http_client(timeout, Some(p)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { direct, proxied })
    }

    /// Returns the proxy-less client
    pub fn direct(&self) -> &Client {
        &self.direct
    }

    /// Returns the per-proxy clients; empty when no proxies are configured
    pub fn proxied(&self) -> &[Client] {
        &self.proxied
    }
}

/// A successfully fetched response
#[derive(Debug)]
pub struct Fetched {
    /// Final URL after any redirects
    pub final_url: String,
    /// Response body text
    pub body: String,
}

/// Fetches `target` and returns its body text and final URL
///
/// Faults: non-2xx status, connection failure, timeout, truncated transfer;
/// see [`FetchError`] for the transient/permanent split.
pub async fn fetch_text(
    client: &Client,
    target: &str,
    headers: HeaderMap,
    timeout: Duration,
) -> FetchResult<Fetched> {
    let response = client
        .get(target)
        .headers(headers)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(target, e))?;

    let final_url = response.url().to_string();
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: target.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| FetchError::from_reqwest(target, e))?;

    Ok(Fetched { final_url, body })
}
