//! Pipeline tests against the library API, with an in-process mock standing
//! in for the content-extraction backend. The encyclopedia endpoint points
//! at a closed local port so that strategy fails fast and deterministically.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use haulkit::config::Config;
use haulkit::models::Source;
use haulkit::resolver::Resolver;

#[derive(Clone)]
struct MockState {
    calls: Arc<AtomicUsize>,
    status: StatusCode,
    body: Arc<serde_json::Value>,
    delay: Duration,
}

struct MockBackend {
    calls: Arc<AtomicUsize>,
    addr: SocketAddr,
}

impl MockBackend {
    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

async fn mock_handler(State(state): State<MockState>) -> (StatusCode, Json<serde_json::Value>) {
    state.calls.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(state.delay).await;
    (state.status, Json((*state.body).clone()))
}

async fn spawn_backend(status: StatusCode, body: serde_json::Value, delay: Duration) -> MockBackend {
    let calls = Arc::new(AtomicUsize::new(0));
    let state = MockState {
        calls: calls.clone(),
        status,
        body: Arc::new(body),
        delay,
    };

    let app = Router::new()
        .route("/api/scrape-item", post(mock_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockBackend { calls, addr }
}

fn test_config(backend: &MockBackend) -> Config {
    let mut config = Config::minimal();
    config.lookup.backend_url = format!("http://{}/api/scrape-item", backend.addr);
    config.lookup.backend_timeout_secs = 2;
    // Closed port: the encyclopedia strategy fails immediately.
    config.lookup.encyclopedia_url = "http://127.0.0.1:9/w/api.php".to_string();
    config.lookup.encyclopedia_search_timeout_secs = 1;
    config.lookup.encyclopedia_extract_timeout_secs = 1;
    config
}

fn freezer_body() -> serde_json::Value {
    serde_json::json!({
        "name": "Chest Freezer",
        "weight": 65.0,
        "dimensions": "85×140×70cm",
        "category": "appliances",
        "confidence": 0.88,
        "description": "A top-opening freezer cabinet.",
        "specifications": { "energy_rating": "A+" }
    })
}

#[tokio::test]
async fn test_backend_result_is_mapped_into_resolved_item() {
    let backend = spawn_backend(StatusCode::OK, freezer_body(), Duration::ZERO).await;
    let resolver = Resolver::new(&test_config(&backend));

    let item = resolver.resolve("double chest freezer").await.unwrap().unwrap();

    assert_eq!(item.source, Source::Backend);
    assert_eq!(item.name, "Chest Freezer");
    assert_eq!(item.weight, 65.0);
    assert_eq!((item.height, item.width, item.depth), (85.0, 140.0, 70.0));
    assert_eq!(item.volume, 85.0 * 140.0 * 70.0);
    assert_eq!(item.category, "appliances");
    assert!((item.confidence - 0.88).abs() < 1e-9);
    assert_eq!(item.original_text, "double chest freezer");
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn test_repeat_resolution_hits_cache() {
    let backend = spawn_backend(StatusCode::OK, freezer_body(), Duration::ZERO).await;
    let resolver = Resolver::new(&test_config(&backend));

    assert_eq!(resolver.cache().len(), 0);

    let first = resolver.resolve("chest freezer deluxe").await.unwrap().unwrap();
    assert_eq!(resolver.cache().len(), 1);

    // Different whitespace/case still hits the same cache entry.
    let second = resolver
        .resolve("  Chest   FREEZER deluxe ")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(resolver.cache().len(), 1);

    assert_eq!(first.name, second.name);
    assert_eq!(first.weight, second.weight);
    assert_eq!(first.category, second.category);
    assert_eq!(first.confidence, second.confidence);
    assert_eq!(first.source, second.source);

    // The second call never touched the network.
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn test_invalid_input_rejected_without_cache_or_network() {
    let backend = spawn_backend(StatusCode::OK, freezer_body(), Duration::ZERO).await;
    let resolver = Resolver::new(&test_config(&backend));

    assert!(resolver.resolve("").await.is_err());
    assert!(resolver.resolve("   ").await.is_err());
    assert!(resolver.resolve(&"x".repeat(100)).await.is_err());

    assert_eq!(resolver.cache().len(), 0);
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_concurrent_duplicate_gets_not_ready() {
    let backend = spawn_backend(StatusCode::OK, freezer_body(), Duration::from_millis(300)).await;
    let resolver = Arc::new(Resolver::new(&test_config(&backend)));

    let first = {
        let resolver = resolver.clone();
        tokio::spawn(async move { resolver.resolve("sofa").await })
    };

    // Give the first call time to take the pending marker.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = resolver.resolve("sofa").await.unwrap();
    assert!(second.is_none(), "duplicate in-flight call must get None");

    let first = first.await.unwrap().unwrap();
    assert!(first.is_some(), "original call must still resolve");

    // Exactly one network call despite two resolve() calls.
    assert_eq!(backend.call_count(), 1);

    // Once the first completes, the marker is gone and retries succeed
    // from the cache.
    let retry = resolver.resolve("sofa").await.unwrap();
    assert!(retry.is_some());
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn test_backend_failure_falls_through_to_estimator() {
    let backend = spawn_backend(
        StatusCode::INTERNAL_SERVER_ERROR,
        serde_json::json!({}),
        Duration::ZERO,
    )
    .await;
    let resolver = Resolver::new(&test_config(&backend));

    let item = resolver.resolve("mystery gadget").await.unwrap().unwrap();

    assert_eq!(item.source, Source::Estimate);
    assert!(item.weight > 0.0);
    assert!((item.confidence - 0.65).abs() < 1e-9);
    assert_eq!(resolver.cache().len(), 1);
}

#[tokio::test]
async fn test_unusable_backend_body_falls_through() {
    // Backend answered 200 but with no usable name/weight.
    let backend = spawn_backend(
        StatusCode::OK,
        serde_json::json!({ "name": "", "weight": 0 }),
        Duration::ZERO,
    )
    .await;
    let resolver = Resolver::new(&test_config(&backend));

    let item = resolver.resolve("mystery gadget").await.unwrap().unwrap();
    assert_eq!(item.source, Source::Estimate);
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn test_partial_backend_result_is_backfilled() {
    let backend = spawn_backend(
        StatusCode::OK,
        serde_json::json!({ "name": "Garden Gnome", "weight": 3.0 }),
        Duration::ZERO,
    )
    .await;
    let resolver = Resolver::new(&test_config(&backend));

    let item = resolver.resolve("garden gnome").await.unwrap().unwrap();

    assert_eq!(item.source, Source::Backend);
    assert_eq!(item.name, "Garden Gnome");
    assert_eq!(item.weight, 3.0);
    // Dimensions backfilled from the estimator's category defaults.
    assert!(item.height > 0.0 && item.width > 0.0 && item.depth > 0.0);
    assert_eq!(item.volume, item.height * item.width * item.depth);
    // Unreported confidence gets the external default.
    assert!((item.confidence - 0.7).abs() < 1e-9);
}

#[tokio::test]
async fn test_cache_clear_forces_fresh_lookup() {
    let backend = spawn_backend(StatusCode::OK, freezer_body(), Duration::ZERO).await;
    let resolver = Resolver::new(&test_config(&backend));

    resolver.resolve("chest freezer deluxe").await.unwrap().unwrap();
    assert_eq!(backend.call_count(), 1);

    resolver.cache().clear();
    assert_eq!(resolver.cache().len(), 0);

    resolver.resolve("chest freezer deluxe").await.unwrap().unwrap();
    assert_eq!(backend.call_count(), 2);
}
