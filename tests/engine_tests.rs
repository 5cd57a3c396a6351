//! Integration tests for the crawl engine
//!
//! These tests use wiremock to create mock HTTP servers and drive the full
//! seed→fetch→parse→archive cycle end to end. A scripted handler interprets
//! the mock response bodies, so each test describes its crawl graph in the
//! mounted responses.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use weft::config::{ArchiveConfig, Config, EngineConfig, IdentityConfig, StoreConfig};
use weft::engine::{run_crawl, Request, RetryPolicy, Spider, WorkQueue};
use weft::fetch::build_http_client;
use weft::handler::{
    HandlerResult, ImageHarvestHandler, JobHandler, ParseOutcome, TextFileHandler,
};
use weft::store::SqliteDedupStore;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with the given seeds and pool size
fn create_test_config(seeds: Vec<String>, pool_size: u32, retry_count: u32) -> Config {
    Config {
        engine: EngineConfig {
            pool_size,
            retry_count,
            fetch_timeout_ms: 500,
        },
        identity: IdentityConfig {
            user_agents: vec!["WeftTest/1.0".to_string()],
            rng_seed: Some(1),
        },
        headers: HashMap::new(),
        proxies: vec![],
        seeds,
        archive: ArchiveConfig::default(),
        store: StoreConfig::default(),
    }
}

/// Shared counters observed by the tests after a run
#[derive(Default)]
struct Counters {
    parse_calls: AtomicUsize,
    archive_calls: AtomicUsize,
    active: AtomicUsize,
    high_water: AtomicUsize,
}

/// Handler scripted by the fetched body
///
/// Body lines drive the outcome: `follow: <url>` lines become follow-up
/// requests (the first via the returned outcome, the rest pushed straight
/// onto the queue), a `payload: <value>` line becomes the payload, a `fail`
/// line makes parse error. The payload value `fail-archive` makes archive
/// error. An empty body parses to nothing.
struct ScriptedHandler {
    counters: Arc<Counters>,
}

#[async_trait]
impl JobHandler for ScriptedHandler {
    type Payload = String;

    async fn parse(
        &self,
        text: &str,
        _request: &Request,
        queue: &WorkQueue,
    ) -> HandlerResult<ParseOutcome<String>> {
        self.counters.parse_calls.fetch_add(1, Ordering::SeqCst);
        let active = self.counters.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.high_water.fetch_max(active, Ordering::SeqCst);
        // Hold the slot briefly so overlapping jobs would be observable
        tokio::time::sleep(Duration::from_millis(25)).await;
        self.counters.active.fetch_sub(1, Ordering::SeqCst);

        let mut follows = Vec::new();
        let mut payload = None;
        for line in text.lines() {
            let line = line.trim();
            if let Some(target) = line.strip_prefix("follow:") {
                follows.push(target.trim().to_string());
            } else if let Some(value) = line.strip_prefix("payload:") {
                payload = Some(value.trim().to_string());
            } else if line == "fail" {
                anyhow::bail!("scripted parse failure");
            }
        }

        let mut follows = follows.into_iter();
        match follows.next() {
            Some(first) => {
                for extra in follows {
                    queue.push(Request::new(extra));
                }
                Ok(ParseOutcome::Follow(Request::new(first)))
            }
            None => match payload {
                Some(value) => Ok(ParseOutcome::Payload(value)),
                None => Ok(ParseOutcome::Nothing),
            },
        }
    }

    async fn archive(&self, payload: String) -> HandlerResult<()> {
        if payload == "fail-archive" {
            anyhow::bail!("scripted archive failure");
        }
        self.counters.archive_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

async fn mount_text(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fan_out_archives_twice_then_stops() {
    let server = MockServer::start().await;
    let base = server.uri();

    // Seed page fans out into two payload pages
    mount_text(
        &server,
        "/",
        format!("follow: {base}/a\nfollow: {base}/b"),
    )
    .await;
    mount_text(&server, "/a", "payload: a".to_string()).await;
    mount_text(&server, "/b", "payload: b".to_string()).await;

    let counters = Arc::new(Counters::default());
    let config = create_test_config(vec![format!("{base}/")], 5, 3);
    let handler = ScriptedHandler {
        counters: Arc::clone(&counters),
    };

    let mut spider = Spider::new(&config, handler).expect("failed to create spider");
    spider.run().await.expect("crawl failed");

    assert!(spider.stopped());
    assert_eq!(counters.parse_calls.load(Ordering::SeqCst), 3);
    assert_eq!(counters.archive_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_follow_chain_terminates() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_text(&server, "/", format!("follow: {base}/l1")).await;
    mount_text(&server, "/l1", format!("follow: {base}/l2")).await;
    mount_text(&server, "/l2", "payload: end".to_string()).await;

    let counters = Arc::new(Counters::default());
    let config = create_test_config(vec![format!("{base}/")], 5, 3);
    let handler = ScriptedHandler {
        counters: Arc::clone(&counters),
    };

    run_crawl(&config, handler).await.expect("crawl failed");

    assert_eq!(counters.parse_calls.load(Ordering::SeqCst), 3);
    assert_eq!(counters.archive_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_timeout_fails_job_after_retry_bound() {
    let server = MockServer::start().await;
    let base = server.uri();

    // Response delay far beyond the 500ms fetch timeout; the mock verifies
    // on drop that exactly retry-count attempts arrived
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("payload: never")
                .set_delay(Duration::from_secs(5)),
        )
        .expect(3)
        .mount(&server)
        .await;

    let counters = Arc::new(Counters::default());
    let config = create_test_config(vec![format!("{base}/slow")], 2, 3);
    let handler = ScriptedHandler {
        counters: Arc::clone(&counters),
    };

    let mut spider = Spider::new(&config, handler).expect("failed to create spider");
    spider.run().await.expect("crawl failed");

    // The job failed before parse; the engine still terminated normally
    assert!(spider.stopped());
    assert_eq!(counters.parse_calls.load(Ordering::SeqCst), 0);
    assert_eq!(counters.archive_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_pool_of_one_runs_jobs_sequentially() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_text(&server, "/s1", "payload: one".to_string()).await;
    mount_text(&server, "/s2", "payload: two".to_string()).await;
    mount_text(&server, "/s3", "payload: three".to_string()).await;

    let counters = Arc::new(Counters::default());
    let config = create_test_config(
        vec![
            format!("{base}/s1"),
            format!("{base}/s2"),
            format!("{base}/s3"),
        ],
        1,
        3,
    );
    let handler = ScriptedHandler {
        counters: Arc::clone(&counters),
    };

    run_crawl(&config, handler).await.expect("crawl failed");

    assert_eq!(counters.archive_calls.load(Ordering::SeqCst), 3);
    assert_eq!(counters.high_water.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_pool_bounds_concurrent_jobs() {
    let server = MockServer::start().await;
    let base = server.uri();

    let mut seeds = Vec::new();
    for i in 0..10 {
        let at = format!("/s{i}");
        mount_text(&server, &at, format!("payload: {i}")).await;
        seeds.push(format!("{base}{at}"));
    }

    let counters = Arc::new(Counters::default());
    let config = create_test_config(seeds, 3, 3);
    let handler = ScriptedHandler {
        counters: Arc::clone(&counters),
    };

    run_crawl(&config, handler).await.expect("crawl failed");

    assert_eq!(counters.archive_calls.load(Ordering::SeqCst), 10);
    assert!(counters.high_water.load(Ordering::SeqCst) <= 3);
}

#[tokio::test]
async fn test_redirect_is_logged_not_fatal() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Location", format!("{base}/new").as_str()),
        )
        .mount(&server)
        .await;
    mount_text(&server, "/new", "payload: moved".to_string()).await;

    let counters = Arc::new(Counters::default());
    let config = create_test_config(vec![format!("{base}/old")], 2, 3);
    let handler = ScriptedHandler {
        counters: Arc::clone(&counters),
    };

    run_crawl(&config, handler).await.expect("crawl failed");

    // The redirected body was still parsed and archived
    assert_eq!(counters.parse_calls.load(Ordering::SeqCst), 1);
    assert_eq!(counters.archive_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_parse_failure_does_not_stall_the_engine() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_text(&server, "/bad", "fail".to_string()).await;
    mount_text(&server, "/ok", "payload: ok".to_string()).await;

    let counters = Arc::new(Counters::default());
    let config = create_test_config(vec![format!("{base}/bad"), format!("{base}/ok")], 2, 3);
    let handler = ScriptedHandler {
        counters: Arc::clone(&counters),
    };

    let mut spider = Spider::new(&config, handler).expect("failed to create spider");
    spider.run().await.expect("crawl failed");

    assert!(spider.stopped());
    assert_eq!(counters.parse_calls.load(Ordering::SeqCst), 2);
    assert_eq!(counters.archive_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_archive_failure_job_still_completes() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_text(&server, "/x", "payload: fail-archive".to_string()).await;

    let counters = Arc::new(Counters::default());
    let config = create_test_config(vec![format!("{base}/x")], 2, 3);
    let handler = ScriptedHandler {
        counters: Arc::clone(&counters),
    };

    run_crawl(&config, handler).await.expect("crawl failed");

    assert_eq!(counters.parse_calls.load(Ordering::SeqCst), 1);
    assert_eq!(counters.archive_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_default_handler_saves_page_text() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_text(&server, "/page.html", "<html>hello</html>".to_string()).await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(vec![format!("{base}/page.html")], 2, 3);
    let handler = TextFileHandler::new(dir.path());

    run_crawl(&config, handler).await.expect("crawl failed");

    let written = std::fs::read_to_string(dir.path().join("page.html")).unwrap();
    assert_eq!(written, "<html>hello</html>");
}

#[tokio::test]
async fn test_image_harvest_downloads_assets() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_text(
        &server,
        "/gallery",
        format!(r#"<html><body><img src="{base}/img/a.png" /></body></html>"#),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/img/a.png"))
        .respond_with(
            ResponseTemplate::new(200).set_body_bytes(vec![0x89, 0x50, 0x4E, 0x47]),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(vec![format!("{base}/gallery")], 2, 3);
    let handler = ImageHarvestHandler::new(
        SqliteDedupStore::new_in_memory().unwrap(),
        dir.path(),
        build_http_client(Duration::from_millis(500), None).unwrap(),
        RetryPolicy::new(3),
    );

    run_crawl(&config, handler).await.expect("crawl failed");

    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap())
        .collect();
    assert_eq!(entries.len(), 1);
    let name = entries[0].file_name().into_string().unwrap();
    assert!(name.ends_with("_a.png"), "unexpected file name {name}");
    assert_eq!(std::fs::read(entries[0].path()).unwrap(), vec![0x89, 0x50, 0x4E, 0x47]);
}
