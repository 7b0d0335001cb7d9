//! Comanda backend client
//!
//! Talks to the point-of-sale backend over two channels:
//! - a persistent message channel (TCP framing or in-memory) carrying order
//!   commands out and tab events in, see [`MessageClient`]
//! - a small REST API for stock checks, payment rounds and payment history,
//!   see [`ComandaApi`]
//!
//! [`TabSession`] binds the pure state of `comanda-core` to the message
//! channel for one open tab; [`TabList`] does the same for the list of tabs.

pub mod api;
pub mod config;
pub mod directory;
pub mod error;
pub mod http;
#[cfg(feature = "in-process")]
pub mod http_oneshot;
pub mod logger;
pub mod message;
pub mod session;

pub use api::ComandaApi;
pub use config::ClientConfig;
pub use directory::TabList;
pub use error::{ClientError, ClientResult};
pub use crate::http::{HttpClient, NetworkHttpClient};
#[cfg(feature = "in-process")]
pub use http_oneshot::OneshotHttpClient;
pub use message::{
    BusMessage, EventType, MessageClient, MessageClientConfig, MessageError, Subscription,
};
pub use session::{RefreshOutcome, SessionUpdate, TabSession};
