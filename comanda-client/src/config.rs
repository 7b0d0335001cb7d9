//! Client configuration

use std::time::Duration;

use crate::error::ClientResult;
use crate::http::NetworkHttpClient;

/// Default REST base URL
pub const DEFAULT_API_URL: &str = "http://localhost:3000";
/// Default wait for a fresh tab snapshot
pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(8);
const MIN_REFRESH_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_REFRESH_TIMEOUT: Duration = Duration::from_secs(10);
/// Units left at or below which a restock warning is shown
pub const DEFAULT_LOW_STOCK_THRESHOLD: f64 = 3.0;

/// Client configuration for connecting to the backend
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// REST base URL (e.g. "http://localhost:3000")
    pub base_url: String,

    /// Message channel address (host:port)
    pub message_addr: Option<String>,

    /// Bearer token sent with REST calls and the handshake
    pub token: Option<String>,

    /// REST request timeout in seconds
    pub timeout: u64,

    /// How long `TabSession::refresh` waits for a snapshot
    pub refresh_timeout: Duration,

    pub low_stock_threshold: f64,

    /// Name announced in the handshake
    pub client_name: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            message_addr: None,
            token: None,
            timeout: 30,
            refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            client_name: "comanda".to_string(),
        }
    }

    /// Load configuration from environment variables
    ///
    /// Unset or unparsable values fall back to their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let parsed = |key: &str| {
            var(key).and_then(|v| match v.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => Some(n),
                _ => {
                    tracing::warn!(key, value = %v, "Ignoring invalid number");
                    None
                }
            })
        };

        let mut config = Self::new(var("COMANDA_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into()));
        config.message_addr = var("COMANDA_MESSAGE_ADDR");
        config.token = var("COMANDA_TOKEN");
        if let Some(secs) = parsed("COMANDA_TIMEOUT_SECS").filter(|s| *s >= 1.0) {
            config.timeout = secs as u64;
        }
        if let Some(secs) = parsed("COMANDA_REFRESH_TIMEOUT_SECS").filter(|s| *s >= 0.0) {
            config = config.with_refresh_timeout(Duration::from_secs_f64(secs));
        }
        if let Some(threshold) = parsed("COMANDA_LOW_STOCK_THRESHOLD") {
            config.low_stock_threshold = threshold;
        }
        if let Some(name) = var("COMANDA_CLIENT_NAME") {
            config.client_name = name;
        }
        config
    }

    /// Set the message channel address
    pub fn with_message_addr(mut self, addr: impl Into<String>) -> Self {
        self.message_addr = Some(addr.into());
        self
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the REST timeout in seconds
    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the refresh wait, clamped to 5..=10 seconds
    pub fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout.clamp(MIN_REFRESH_TIMEOUT, MAX_REFRESH_TIMEOUT);
        self
    }

    pub fn with_low_stock_threshold(mut self, threshold: f64) -> Self {
        self.low_stock_threshold = threshold;
        self
    }

    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = name.into();
        self
    }

    /// Build the REST client for this configuration
    pub fn build_http_client(&self) -> ClientResult<NetworkHttpClient> {
        let client = NetworkHttpClient::with_timeout(&self.base_url, Duration::from_secs(self.timeout))?;
        Ok(match &self.token {
            Some(token) => client.with_token(token.clone()),
            None => client,
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}
