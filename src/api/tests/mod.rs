use super::*;
use crate::dispatch::test_helpers::{GatedExecutor, create_test_dispatcher, test_config};
use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;


/// Router plus handles on the state behind it
struct TestApp {
    router: Router,
    dispatcher: Dispatcher,
    store: Arc<MessageStore>,
}

impl TestApp {
    async fn new() -> Self {
        let (dispatcher, _executor) = create_test_dispatcher().await;
        Self::with_dispatcher(dispatcher)
    }

    fn with_dispatcher(dispatcher: Dispatcher) -> Self {
        let store = Arc::new(MessageStore::new());
        let router = create_router(dispatcher.clone(), store.clone(), dispatcher.get_config());
        Self {
            router,
            dispatcher,
            store,
        }
    }

    /// Send a request and return the status with the raw body
    async fn send(&self, request: Request) -> (StatusCode, axum::body::Bytes) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body)
    }

    /// Send a request and decode the body as JSON
    async fn send_json(&self, request: Request) -> (StatusCode, Value) {
        let (status, body) = self.send(request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }
}

fn get(uri: &str) -> Request {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// POST with a raw body and no Content-Type header
fn post(uri: &str, body: impl Into<String>) -> Request {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::from(body.into()))
        .unwrap()
}

#[tokio::test]
async fn test_api_server_serves_until_shutdown() {
    let (dispatcher, _executor) = create_test_dispatcher().await;
    let store = Arc::new(MessageStore::new());
    let app = create_router(dispatcher.clone(), store, dispatcher.get_config());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(serve(listener, app, async move {
        stop_rx.await.ok();
    }));

    let response = reqwest::get(format!("http://{address}/health")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    stop_tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server should stop after the shutdown signal")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_cors_enabled() {
    let (dispatcher, _executor) = create_test_dispatcher().await;

    let mut config = test_config();
    config.server.api.cors_enabled = true;
    config.server.api.cors_origins = vec!["*".to_string()];
    let app = create_router(dispatcher, Arc::new(MessageStore::new()), Arc::new(config));

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be present"
    );
}

#[tokio::test]
async fn test_cors_specific_origin() {
    let (dispatcher, _executor) = create_test_dispatcher().await;

    let mut config = test_config();
    config.server.api.cors_origins = vec!["http://allowed.example".to_string()];
    let app = create_router(dispatcher, Arc::new(MessageStore::new()), Arc::new(config));

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://allowed.example")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "http://allowed.example"
    );

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://other.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let (dispatcher, _executor) = create_test_dispatcher().await;

    let mut config = test_config();
    config.server.api.cors_enabled = false;
    let app = create_router(dispatcher, Arc::new(MessageStore::new()), Arc::new(config));

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}
