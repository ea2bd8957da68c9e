//! Integration tests for the proxy pool and resilient fetcher
//!
//! These tests use wiremock servers as HTTP proxies. Plain-HTTP targets are
//! sent to a proxy in absolute form, so each mock server sees (and answers)
//! every request routed through it.

use reel_harvest::config::{Config, FetcherConfig};
use reel_harvest::extract::SharedDataExtractor;
use reel_harvest::harvest::run_harvest;
use reel_harvest::proxy::{load_validated_pool, ProxyEndpoint, ProxyPool};
use reel_harvest::{AttemptError, FetchError, HarvestError, ProxyError, ResilientFetcher};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::watch;
use wiremock::matchers::{header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TARGET: &str = "http://target.test/explore/tags/fashion/";

/// Starts a mock proxy answering every GET with the given status and body
async fn proxy_answering(status: u16, body: &str, expected_hits: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .expect(expected_hits)
        .mount(&server)
        .await;
    server
}

fn endpoint(server: &MockServer) -> ProxyEndpoint {
    ProxyEndpoint::normalize(&server.uri()).expect("mock uri is not blank")
}

/// Address of a local port nothing listens on
fn closed_port() -> ProxyEndpoint {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to read address");
    drop(listener);
    ProxyEndpoint::normalize(&addr.to_string()).expect("address is not blank")
}

fn fetcher_over(endpoints: Vec<ProxyEndpoint>, max_retries: u32) -> ResilientFetcher {
    let pool = ProxyPool::from_validated(endpoints).expect("Failed to build pool");
    let config = FetcherConfig {
        max_retries,
        user_agent: "HarvestTest/1.0".to_string(),
        accept_language: "en-US".to_string(),
        ..FetcherConfig::default()
    };
    ResilientFetcher::new(Arc::new(pool), &config)
}

/// A proxy that answers 200 but closes the connection mid-body
async fn truncating_proxy() -> (ProxyEndpoint, Arc<AtomicUsize>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to read address");
    let connections = Arc::new(AtomicUsize::new(0));
    let counter = connections.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 1000\r\n\r\npartial")
                    .await;
                let _ = socket.shutdown().await;
            });
        }
    });

    let endpoint = ProxyEndpoint::normalize(&addr.to_string()).expect("address is not blank");
    (endpoint, connections)
}

#[tokio::test]
async fn test_success_short_circuits_retries() {
    let blocked = proxy_answering(503, "", 1).await;
    let working = proxy_answering(200, "second", 1).await;
    let unused = proxy_answering(200, "third", 0).await;

    let fetcher = fetcher_over(
        vec![endpoint(&blocked), endpoint(&working), endpoint(&unused)],
        5,
    );

    let body = fetcher.fetch(TARGET).await.expect("Fetch failed");
    assert_eq!(&body[..], b"second");

    // Wiremock verifies the hit counts when the servers drop
}

#[tokio::test]
async fn test_exhaustion_reports_last_failure() {
    let first = proxy_answering(500, "", 1).await;
    let second = proxy_answering(502, "", 1).await;
    let third = proxy_answering(503, "", 1).await;

    let fetcher = fetcher_over(
        vec![endpoint(&first), endpoint(&second), endpoint(&third)],
        3,
    );

    match fetcher.fetch(TARGET).await {
        Err(FetchError::RetriesExhausted { attempts, last, .. }) => {
            assert_eq!(attempts, 3);
            assert_eq!(last.proxy(), &endpoint(&third));
            match last {
                AttemptError::BadStatus { status, .. } => assert_eq!(status.as_u16(), 503),
                other => panic!("expected BadStatus, got {:?}", other),
            }
        }
        other => panic!("expected RetriesExhausted, got {:?}", other),
    }
}

#[tokio::test]
async fn test_transport_failures_make_exactly_max_attempts() {
    let dead = vec![closed_port(), closed_port(), closed_port(), closed_port()];
    let fetcher = fetcher_over(dead.clone(), 3);

    match fetcher.fetch(TARGET).await {
        Err(FetchError::RetriesExhausted { attempts, last, .. }) => {
            assert_eq!(attempts, 3);
            assert!(matches!(last, AttemptError::Transport { .. }));
            assert_eq!(last.proxy(), &dead[2]);
        }
        other => panic!("expected RetriesExhausted, got {:?}", other),
    }

    // Exactly three slots were consumed from the rotation
    assert_eq!(fetcher.pool().next(), &dead[3]);
}

#[tokio::test]
async fn test_single_attempt_bad_status() {
    let blocked = proxy_answering(403, "denied", 1).await;
    let fetcher = fetcher_over(vec![endpoint(&blocked)], 1);

    let err = fetcher.fetch(TARGET).await.expect_err("Fetch should fail");
    assert!(matches!(
        err,
        FetchError::RetriesExhausted { attempts: 1, .. }
    ));
    assert!(err.to_string().contains("bad status"));
}

#[tokio::test]
async fn test_request_headers_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", "HarvestTest/1.0"))
        .and(header("accept-language", "en-US"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher_over(vec![endpoint(&server)], 1);
    let body = fetcher.fetch(TARGET).await.expect("Headers did not match");
    assert_eq!(&body[..], b"ok");
}

#[tokio::test]
async fn test_body_read_failure_is_not_retried() {
    let (truncating, connections) = truncating_proxy().await;
    let spare = proxy_answering(200, "never", 0).await;

    let fetcher = fetcher_over(vec![truncating, endpoint(&spare)], 5);

    let result = fetcher.fetch(TARGET).await;
    assert!(
        matches!(result, Err(FetchError::BodyRead { .. })),
        "expected BodyRead, got {:?}",
        result
    );
    assert_eq!(connections.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_shutdown_interrupts_in_flight_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(20)))
        .mount(&server)
        .await;

    let fetcher = fetcher_over(vec![endpoint(&server)], 5);
    let (tx, rx) = watch::channel(false);

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        let _ = tx.send(true);
    });

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        fetcher.fetch_with_shutdown(TARGET, rx),
    )
    .await
    .expect("Cancellation did not interrupt the attempt");

    assert!(matches!(
        result,
        Err(FetchError::Cancelled { attempts: 1, .. })
    ));
}

#[tokio::test]
async fn test_concurrent_fetches_share_pool() {
    let first = proxy_answering(200, "a", 5).await;
    let second = proxy_answering(200, "b", 5).await;

    let fetcher = fetcher_over(vec![endpoint(&first), endpoint(&second)], 3);

    let results = futures::future::join_all((0..10).map(|_| fetcher.fetch(TARGET))).await;

    assert!(results.iter().all(|r| r.is_ok()));
}

#[tokio::test]
async fn test_empty_after_validation_fails_pool_construction() {
    let blocked = proxy_answering(403, "", 1).await;

    let mut list = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(list, "{}", blocked.uri().trim_start_matches("http://")).unwrap();
    writeln!(list).unwrap();
    writeln!(list, "{}", closed_port()).unwrap();
    list.flush().unwrap();

    let mut config = Config::default();
    config.proxy.list_path = list.path().display().to_string();
    config.proxy.probe_url = "http://probe.test/".to_string();
    config.proxy.probe_timeout = 2;

    let result = load_validated_pool(&config).await;
    assert!(matches!(result, Err(ProxyError::EmptyPool)));
}

#[tokio::test]
async fn test_full_harvest_through_validated_pool() {
    let page = r#"<html><body><script type="text/javascript">window._sharedData = {"entry_data":{"TagPage":[{"graphql":{"hashtag":{"edge_hashtag_to_media":{"edges":[{"node":{"shortcode":"XYZ","video_url":"https://cdn.example.com/v.mp4","display_url":"https://cdn.example.com/t.jpg","edge_media_to_caption":{"edges":[{"node":{"text":"Look"}}]},"owner":{"username":"author1"}}}]}}}}]}};</script></body></html>"#;

    // One probe plus one page fetch
    let alive = proxy_answering(200, page, 2).await;

    let mut list = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(list, "{}", closed_port()).unwrap();
    writeln!(list, "{}", alive.uri()).unwrap();
    list.flush().unwrap();

    let mut config = Config::default();
    config.proxy.list_path = list.path().display().to_string();
    config.proxy.probe_url = "http://probe.test/".to_string();
    config.proxy.probe_timeout = 2;
    config.fetcher.max_retries = 2;

    let (_tx, rx) = watch::channel(false);
    let pages = run_harvest(
        &config,
        &[TARGET.to_string()],
        &SharedDataExtractor::new(),
        rx,
    )
    .await
    .expect("Pool construction failed");

    assert_eq!(pages.len(), 1);
    let records = match &pages[0].outcome {
        Ok(records) => records,
        Err(e) => panic!("harvest failed: {}", e),
    };
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].video_url, "https://cdn.example.com/v.mp4");
    assert_eq!(records[0].author, "author1");
    assert_eq!(records[0].caption, "Look");
}

#[tokio::test]
async fn test_extraction_error_reaches_caller() {
    let alive = proxy_answering(200, "<html><body>login required</body></html>", 2).await;

    let mut list = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(list, "{}", alive.uri()).unwrap();
    list.flush().unwrap();

    let mut config = Config::default();
    config.proxy.list_path = list.path().display().to_string();
    config.proxy.probe_url = "http://probe.test/".to_string();

    let (_tx, rx) = watch::channel(false);
    let pages = run_harvest(
        &config,
        &[TARGET.to_string()],
        &SharedDataExtractor::new(),
        rx,
    )
    .await
    .expect("Pool construction failed");

    assert!(matches!(
        pages[0].outcome,
        Err(HarvestError::Extract(reel_harvest::extract::ExtractError::NoDataBlock))
    ));
}
