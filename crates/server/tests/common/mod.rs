//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process router
//! with mock assistant backend and catalog injected, so the API can be
//! exercised without any external service.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use hirewire_core::{
    load_config_from_str, Assistant, CachedCatalog, ProbeConfig,
    testing::{MockAssistantBackend, MockFreelancerCatalog},
};
use hirewire_server::state::AppState;

/// Re-export fixtures for test convenience
pub use hirewire_core::testing::fixtures;

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_session_creation() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post("/api/v1/chat/sessions", json!({})).await;
///
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock assistant backend - configure status and replies
    pub backend: Arc<MockAssistantBackend>,
    /// Mock catalog - configure freelancers and users
    pub catalog: Arc<MockFreelancerCatalog>,
    /// Application state behind the router - drive session eviction
    pub state: Arc<AppState>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

const TEST_CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 0

[assistant]
base_url = "http://assistant.invalid/api/ai"
api_token = "assistant-secret"

[catalog]
base_url = "http://catalog.invalid/api"
api_token = "catalog-secret"
refresh_secs = 60
"#;

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        Self::with_probe_config(ProbeConfig::default()).await
    }

    /// Create a test fixture with a specific probe configuration.
    pub async fn with_probe_config(probe_config: ProbeConfig) -> Self {
        let backend = Arc::new(MockAssistantBackend::new());
        let catalog = Arc::new(MockFreelancerCatalog::new());
        catalog
            .set_freelancers(vec![
                fixtures::freelancer(42, Some("Ada Lovelace")),
                fixtures::freelancer(7, Some("Grace Hopper")),
            ])
            .await;

        let mut config = load_config_from_str(TEST_CONFIG).expect("Failed to parse test config");
        config.assistant.dev_mode = probe_config.dev_mode;

        let assistant = Arc::new(Assistant::new(
            backend.clone(),
            CachedCatalog::new(catalog.clone(), Duration::from_secs(60)),
            probe_config,
        ));

        let state = Arc::new(AppState::new(config, assistant));
        let router = hirewire_server::api::create_router(Arc::clone(&state));

        Self {
            router,
            backend,
            catalog,
            state,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Send a GET request and return the raw body text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Create a chat session and return its ID.
    pub async fn create_session(&self) -> String {
        let response = self.post("/api/v1/chat/sessions", Value::Null).await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.body["id"]
            .as_str()
            .expect("session id")
            .to_string()
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
