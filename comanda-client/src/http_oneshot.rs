//! In-process HTTP client
//!
//! Requires the "in-process" feature.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use http::{Method, Request, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tower::ServiceExt;

use crate::error::{ClientError, ClientResult};
use crate::http::{HttpClient, decode_response};

/// Calls an axum [`Router`] directly through `tower::ServiceExt::oneshot`,
/// without a socket.
///
/// ```ignore
/// let client = OneshotHttpClient::new(router);
/// let api = ComandaApi::new(client);
/// let verdict = api.verify_stock("Heineken", 2, 3.0).await?;
/// ```
#[derive(Debug, Clone)]
pub struct OneshotHttpClient {
    router: Arc<RwLock<Router>>,
    token: Option<String>,
}

impl OneshotHttpClient {
    pub fn new(router: Router) -> Self {
        Self {
            router: Arc::new(RwLock::new(router)),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn build_request(&self, method: Method, path: &str, body: Body) -> ClientResult<Request<Body>> {
        let uri = format!("/{}", path.trim_start_matches('/'));
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = &self.token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder
            .body(body)
            .map_err(|e| ClientError::Internal(format!("Invalid request: {e}")))
    }

    async fn execute<T: DeserializeOwned>(&self, request: Request<Body>) -> ClientResult<T> {
        let router = self.router.read().await.clone();
        let response = router
            .oneshot(request)
            .await
            .map_err(|e| ClientError::Internal(format!("Oneshot call failed: {e}")))?;

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| ClientError::Internal(format!("Failed to read body: {e}")))?;
        decode_response(status, &String::from_utf8_lossy(&bytes))
    }
}

#[async_trait]
impl HttpClient for OneshotHttpClient {
    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let request = self.build_request(Method::GET, path, Body::empty())?;
        self.execute(request).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let bytes = serde_json::to_vec(body)?;
        let request = self.build_request(Method::POST, path, Body::from(bytes))?;
        self.execute(request).await
    }

    fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use axum::routing::{get, post};
    use http::{HeaderMap, StatusCode};
    use serde_json::{Value, json};

    fn router() -> Router {
        Router::new()
            .route("/ping", get(|| async { Json(json!({"pong": true})) }))
            .route("/echo", post(|Json(body): Json<Value>| async move { Json(body) }))
            .route(
                "/whoami",
                get(|headers: HeaderMap| async move {
                    let auth = headers
                        .get(header::AUTHORIZATION)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    Json(json!({ "auth": auth }))
                }),
            )
            .route(
                "/broken",
                get(|| async {
                    (
                        StatusCode::CONFLICT,
                        Json(json!({"code": 4002, "message": "Comanda fechada"})),
                    )
                }),
            )
    }

    #[tokio::test]
    async fn test_get_and_post() {
        let client = OneshotHttpClient::new(router());
        let pong: Value = client.get("ping").await.unwrap();
        assert_eq!(pong["pong"], true);

        let echoed: Value = client.post("/echo", &json!({"comanda": "7"})).await.unwrap();
        assert_eq!(echoed["comanda"], "7");
    }

    #[tokio::test]
    async fn test_token_header() {
        let client = OneshotHttpClient::new(router()).with_token("abc");
        let who: Value = client.get("whoami").await.unwrap();
        assert_eq!(who["auth"], "Bearer abc");
    }

    #[tokio::test]
    async fn test_api_error() {
        let client = OneshotHttpClient::new(router());
        let err = client.get::<Value>("broken").await.unwrap_err();
        assert!(matches!(err, ClientError::Api { code: 4002, .. }));

        let err = client.get::<Value>("missing").await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));
    }
}
