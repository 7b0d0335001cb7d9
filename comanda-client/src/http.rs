//! HTTP client over the network

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ApiErrorResponse, ClientError, ClientResult};

/// REST transport used by [`ComandaApi`](crate::ComandaApi)
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T>;
    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T>;
    fn token(&self) -> Option<&str>;
}

/// Network HTTP client
#[derive(Debug, Clone)]
pub struct NetworkHttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl NetworkHttpClient {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<T> {
        let status = response.status();
        let text = response.text().await?;
        decode_response(status, &text)
    }
}

/// Turn a status and body into the caller's type or a [`ClientError`]
pub(crate) fn decode_response<T: DeserializeOwned>(
    status: StatusCode,
    text: &str,
) -> ClientResult<T> {
    if !status.is_success() {
        if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(text) {
            return Err(ClientError::from_api(api_err));
        }
        return match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ClientError::Unauthorized),
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(text.to_string())),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(ClientError::Validation(text.to_string()))
            }
            _ => Err(ClientError::Internal(format!("{status}: {text}"))),
        };
    }
    // Empty bodies read as null
    let text = if text.trim().is_empty() { "null" } else { text };
    serde_json::from_str(text).map_err(|e| {
        tracing::warn!(error = %e, "Unreadable response body");
        ClientError::InvalidResponse(e.to_string())
    })
}

#[async_trait]
impl HttpClient for NetworkHttpClient {
    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let req = self.authorize(self.client.get(self.url(path)));
        let response = req.send().await?;
        self.handle_response(response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let req = self.authorize(self.client.post(self.url(path)).json(body));
        let response = req.send().await?;
        self.handle_response(response).await
    }

    fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::client::StockCheckResponse;

    #[test]
    fn test_url_joining() {
        let client = NetworkHttpClient::new("http://pos.local:3000/").unwrap();
        assert_eq!(client.base_url(), "http://pos.local:3000");
        assert_eq!(
            client.url("/verificar_quantidade"),
            "http://pos.local:3000/verificar_quantidade"
        );
        assert_eq!(client.url("pegar_pedidos"), "http://pos.local:3000/pegar_pedidos");
        assert!(client.token().is_none());
        assert_eq!(client.with_token("t").token(), Some("t"));
    }

    #[test]
    fn test_decode_success() {
        let r: StockCheckResponse =
            decode_response(StatusCode::OK, r#"{"erro": false, "quantidade": 4}"#).unwrap();
        assert_eq!(r.quantidade, 4.0);

        let err = decode_response::<StockCheckResponse>(StatusCode::OK, "<html>").unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse(_)));

        let empty: serde_json::Value = decode_response(StatusCode::NO_CONTENT, "").unwrap();
        assert!(empty.is_null());
    }

    #[test]
    fn test_decode_errors() {
        let err = decode_response::<serde_json::Value>(
            StatusCode::CONFLICT,
            r#"{"code": 4002, "message": "Comanda fechada"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ClientError::Api { code: 4002, .. }));

        let err = decode_response::<serde_json::Value>(StatusCode::NOT_FOUND, "nope").unwrap_err();
        assert!(matches!(err, ClientError::NotFound(body) if body == "nope"));

        let err = decode_response::<serde_json::Value>(StatusCode::UNAUTHORIZED, "").unwrap_err();
        assert!(matches!(err, ClientError::Unauthorized));

        let err =
            decode_response::<serde_json::Value>(StatusCode::BAD_GATEWAY, "down").unwrap_err();
        assert!(matches!(err, ClientError::Internal(_)));
    }
}
