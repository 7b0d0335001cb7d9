//! Message channel: configuration, errors, transports and the client

pub mod client;
pub mod subscription;
pub mod transport;

pub use client::MessageClient;
pub use shared::message::{BusMessage, EventType};
pub use subscription::Subscription;
pub use transport::{MemoryTransport, TcpTransport, Transport};

use std::time::Duration;

use thiserror::Error;

/// Message channel errors
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend answered a request with a failure
    #[error("Rejected by server: {0}")]
    Rejected(String),

    #[error("Message channel closed")]
    Closed,
}

/// Message client configuration
#[derive(Debug, Clone, PartialEq)]
pub struct MessageClientConfig {
    /// Wait for a correlated response
    pub request_timeout: Duration,
    pub auto_reconnect: bool,
    /// First reconnect delay
    pub reconnect_delay: Duration,
    /// Backoff ceiling
    pub max_reconnect_delay: Duration,
    /// 0 retries forever
    pub max_reconnect_attempts: u32,
    /// Capacity of the event fan-out; slower subscribers skip what they miss
    pub event_buffer: usize,
}

impl Default for MessageClientConfig {
    /// Local network settings: short timeouts, quick reconnects
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(3),
            auto_reconnect: true,
            reconnect_delay: Duration::from_millis(500),
            max_reconnect_delay: Duration::from_secs(10),
            max_reconnect_attempts: 20,
            event_buffer: 1024,
        }
    }
}

impl MessageClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restaurant LAN (default)
    pub fn lan() -> Self {
        Self::default()
    }

    /// Backend reached over the internet; tolerates latency
    pub fn wan() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            auto_reconnect: true,
            reconnect_delay: Duration::from_secs(1),
            max_reconnect_delay: Duration::from_secs(60),
            max_reconnect_attempts: 20,
            event_buffer: 1024,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    pub fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    pub fn with_event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = capacity.max(1);
        self
    }

    /// Delay before reconnect attempt `attempt` (0-based), doubling up to the
    /// ceiling
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.min(16));
        self.reconnect_delay
            .saturating_mul(factor)
            .min(self.max_reconnect_delay)
    }

    /// Whether attempt `attempt` (0-based) may still be made
    pub fn may_retry(&self, attempt: u32) -> bool {
        self.auto_reconnect
            && (self.max_reconnect_attempts == 0 || attempt < self.max_reconnect_attempts)
    }
}
