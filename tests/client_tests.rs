//! Integration Tests for the Cached Client
//!
//! Drives `CachedClient` against a scripted in-process transport.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use mini_http_cache::cache::is_from_cache;
use mini_http_cache::client::Transport;
use mini_http_cache::error::ClientError;
use mini_http_cache::{Body, Cache, CachedClient, HttpRequest, HttpResponse, MemoryCache};
use tokio_test::assert_ok;

// == Helpers ==

/// Transport with a scripted status, optional failure and latency.
struct ScriptedTransport {
    status: StatusCode,
    fail: bool,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    fn ok() -> Self {
        Self::with_status(StatusCode::OK)
    }

    fn with_status(status: StatusCode) -> Self {
        Self {
            status,
            fail: false,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::ok()
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::ok()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ClientError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(ClientError::Transport("connection refused".to_string()));
        }
        Ok(http::Response::builder()
            .status(self.status)
            .header("content-type", "text/plain")
            .header("x-call", call.to_string())
            .body(Body::from(format!("{} {} #{}", req.method(), req.uri(), call)))
            .unwrap())
    }
}

fn request(method: &str, uri: &str) -> HttpRequest {
    http::Request::builder()
        .method(method)
        .uri(uri)
        .body(Bytes::new())
        .unwrap()
}

fn cached_client(transport: Arc<ScriptedTransport>, ttl: u64) -> (CachedClient, Arc<MemoryCache>) {
    let cache = Arc::new(MemoryCache::new(ttl).unwrap());
    let client = CachedClient::new(transport, Some(cache.clone() as Arc<dyn Cache>));
    (client, cache)
}

// == Cache Hit/Miss ==

#[tokio::test]
async fn test_hit_bypasses_transport() {
    let transport = Arc::new(ScriptedTransport::ok());
    let (client, _cache) = cached_client(transport.clone(), 60);

    let mut live = assert_ok!(client.execute(request("GET", "http://api.test/items")).await);
    assert!(!is_from_cache(&live));
    let live_body = live.body_mut().read_all().unwrap();

    for _ in 0..3 {
        let mut cached = client
            .execute(request("GET", "http://api.test/items"))
            .await
            .unwrap();
        assert!(is_from_cache(&cached));
        assert_eq!(cached.status(), StatusCode::OK);
        assert_eq!(cached.headers()["x-call"], "1");
        assert_eq!(cached.body_mut().read_all().unwrap(), live_body);
    }

    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_live_body_readable_exactly_once_after_caching() {
    let transport = Arc::new(ScriptedTransport::ok());
    let (client, _cache) = cached_client(transport, 60);

    let mut live = client
        .execute(request("GET", "http://api.test/once"))
        .await
        .unwrap();

    let body = live.body_mut().read_all().unwrap();
    assert_eq!(body, Bytes::from("GET http://api.test/once #1"));
    assert!(live.body_mut().read_all().is_err());
}

#[tokio::test]
async fn test_head_requests_are_cached_separately() {
    let transport = Arc::new(ScriptedTransport::ok());
    let (client, cache) = cached_client(transport.clone(), 60);

    client.execute(request("GET", "http://api.test/x")).await.unwrap();
    client.execute(request("HEAD", "http://api.test/x")).await.unwrap();
    let head = client.execute(request("HEAD", "http://api.test/x")).await.unwrap();

    assert!(is_from_cache(&head));
    assert_eq!(transport.calls(), 2);
    assert_eq!(cache.len(), 2);
}

#[tokio::test]
async fn test_post_is_never_cached() {
    let transport = Arc::new(ScriptedTransport::ok());
    let (client, cache) = cached_client(transport.clone(), 60);

    for _ in 0..2 {
        let rsp = client.execute(request("POST", "http://api.test/items")).await.unwrap();
        assert!(!is_from_cache(&rsp));
    }

    assert_eq!(transport.calls(), 2);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_error_status_is_not_cached() {
    let transport = Arc::new(ScriptedTransport::with_status(StatusCode::INTERNAL_SERVER_ERROR));
    let (client, cache) = cached_client(transport.clone(), 60);

    for _ in 0..2 {
        let rsp = client.execute(request("GET", "http://api.test/broken")).await.unwrap();
        assert_eq!(rsp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    assert_eq!(transport.calls(), 2);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_transport_error_propagates_and_is_not_cached() {
    let transport = Arc::new(ScriptedTransport::failing());
    let (client, cache) = cached_client(transport.clone(), 60);

    let result = client.execute(request("GET", "http://api.test/down")).await;
    match result {
        Err(ClientError::Transport(msg)) => assert_eq!(msg, "connection refused"),
        other => panic!("expected transport error, got {:?}", other.map(|r| r.status())),
    }
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_delete_forces_refetch() {
    let transport = Arc::new(ScriptedTransport::ok());
    let (client, cache) = cached_client(transport.clone(), 60);
    let req = request("GET", "http://api.test/refresh");

    client.execute(request("GET", "http://api.test/refresh")).await.unwrap();
    cache.delete(&req);
    let rsp = client.execute(req).await.unwrap();

    assert!(!is_from_cache(&rsp));
    assert_eq!(rsp.headers()["x-call"], "2");
}

#[tokio::test]
async fn test_entries_expire_after_ttl() {
    let transport = Arc::new(ScriptedTransport::ok());
    let (client, _cache) = cached_client(transport.clone(), 1);

    client.execute(request("GET", "http://api.test/ttl")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(2100)).await;
    let rsp = client.execute(request("GET", "http://api.test/ttl")).await.unwrap();

    assert!(!is_from_cache(&rsp));
    assert_eq!(transport.calls(), 2);
}

// == Concurrency ==

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_misses_each_reach_network() {
    // No request coalescing: racing misses on one URL all go upstream
    let transport = Arc::new(ScriptedTransport::slow(Duration::from_millis(200)));
    let (client, cache) = cached_client(transport.clone(), 60);

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move {
                client
                    .execute(request("GET", "http://api.test/stampede"))
                    .await
                    .unwrap()
            })
        })
        .collect();
    for task in tasks {
        let rsp = task.await.unwrap();
        assert!(!is_from_cache(&rsp));
    }

    assert_eq!(transport.calls(), 4);
    assert_eq!(cache.len(), 1);

    let rsp = client
        .execute(request("GET", "http://api.test/stampede"))
        .await
        .unwrap();
    assert!(is_from_cache(&rsp));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_mixed_traffic() {
    let transport = Arc::new(ScriptedTransport::ok());
    let (client, cache) = cached_client(transport.clone(), 60);

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let client = client.clone();
            let cache = cache.clone();
            tokio::spawn(async move {
                for j in 0..20 {
                    let uri = format!("http://api.test/items/{}", (i + j) % 6);
                    if j % 7 == 0 {
                        cache.delete(&request("GET", &uri));
                        continue;
                    }
                    let mut rsp = client.execute(request("GET", &uri)).await.unwrap();
                    let body = rsp.body_mut().read_all().unwrap();
                    assert!(body.starts_with(format!("GET {} #", uri).as_bytes()));
                }
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    let stats = cache.stats();
    assert_eq!(stats.corrupted, 0);
    assert!(stats.hits > 0);
    assert!(cache.len() <= 6);
}
