//! Image-harvest handler
//!
//! A site handler that walks pages and collects the images they reference:
//! page links found in the fetched HTML are deduplicated against a store and
//! enqueued for crawling; image URLs are deduplicated the same way and
//! returned as the payload. The archive stage downloads each image into a
//! directory, wrapping every download in its own retry policy.

use crate::engine::{Request, RetryPolicy, WorkQueue};
use crate::fetch::{FetchError, FetchResult};
use crate::handler::{HandlerResult, JobHandler, ParseOutcome};
use crate::store::DedupStore;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::sync::Mutex;
use url::Url;

/// Links and image references extracted from one page
#[derive(Debug, Default)]
struct PageRefs {
    links: Vec<String>,
    images: Vec<String>,
}

/// Handler that crawls pages and downloads the images they reference
pub struct ImageHarvestHandler<S: DedupStore + Send + 'static> {
    store: Mutex<S>,
    image_dir: PathBuf,
    client: Client,
    retry: RetryPolicy,
}

impl<S: DedupStore + Send + 'static> ImageHarvestHandler<S> {
    /// Creates a handler downloading into `image_dir`
    ///
    /// `store` decides which page links and image URLs are new; `client` and
    /// `retry` cover the archive stage's own sub-fetches.
    pub fn new(store: S, image_dir: impl Into<PathBuf>, client: Client, retry: RetryPolicy) -> Self {
        Self {
            store: Mutex::new(store),
            image_dir: image_dir.into(),
            client,
            retry,
        }
    }

    /// Fetches one image and returns its bytes
    async fn download(&self, url: &str) -> FetchResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(|e| FetchError::from_reqwest(url, e))
    }
}

/// Extracts page links (`a[href]`) and image URLs (`img[src]`) as absolute
/// http(s) URLs, resolving relative references against `base`
fn extract_refs(html: &str, base: &Url) -> PageRefs {
    let document = Html::parse_document(html);
    let mut refs = PageRefs::default();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute) = resolve(href, base) {
                    refs.links.push(absolute);
                }
            }
        }
    }

    if let Ok(selector) = Selector::parse("img[src]") {
        for element in document.select(&selector) {
            if let Some(src) = element.value().attr("src") {
                if let Some(absolute) = resolve(src, base) {
                    refs.images.push(absolute);
                }
            }
        }
    }

    refs
}

/// Resolves a reference to an absolute URL, keeping only http(s) targets
fn resolve(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    match base.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute.to_string())
        }
        _ => None,
    }
}

/// Derives the file name an image URL is saved under
///
/// A digest prefix keeps same-named images from different locations apart,
/// without assuming anything about the URL's path shape.
fn asset_file_name(url: &str) -> String {
    let digest = hex::encode(Sha256::digest(url.as_bytes()));
    let segment = url
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("asset");
    format!("{}_{}", &digest[..12], segment)
}

#[async_trait]
impl<S: DedupStore + Send + 'static> JobHandler for ImageHarvestHandler<S> {
    type Payload = Vec<String>;

    async fn parse(
        &self,
        text: &str,
        request: &Request,
        queue: &WorkQueue,
    ) -> HandlerResult<ParseOutcome<Self::Payload>> {
        let base = Url::parse(request.target())
            .with_context(|| format!("invalid request target {}", request.target()))?;
        let refs = extract_refs(text, &base);
        tracing::debug!(
            "parse {}: {} link(s), {} image(s)",
            request.target(),
            refs.links.len(),
            refs.images.len()
        );

        let (new_links, new_images) = {
            let mut store = self.store.lock().expect("dedup store mutex poisoned");
            let links = store.record_new(&refs.links)?;
            let images = store.record_new(&refs.images)?;
            (links, images)
        };

        for link in new_links {
            queue.push(Request::new(link));
        }

        if new_images.is_empty() {
            Ok(ParseOutcome::Nothing)
        } else {
            Ok(ParseOutcome::Payload(new_images))
        }
    }

    async fn archive(&self, payload: Self::Payload) -> HandlerResult<()> {
        tokio::fs::create_dir_all(&self.image_dir)
            .await
            .with_context(|| format!("creating {}", self.image_dir.display()))?;

        for url in &payload {
            match self
                .retry
                .run("image download", FetchError::is_transient, || {
                    self.download(url)
                })
                .await
            {
                Ok(bytes) => {
                    let path = self.image_dir.join(asset_file_name(url));
                    if let Err(e) = tokio::fs::write(&path, &bytes).await {
                        tracing::error!("failed to write {}: {}", path.display(), e);
                    }
                }
                Err(e) => tracing::error!("image download failed for {}: {}", url, e),
            }
        }

        Ok(())
    }
}
