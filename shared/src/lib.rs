//! Shared types for the comanda workspace
//!
//! Wire and domain types used by every crate: menu items and option groups,
//! order lines, tab snapshots, order commands and tab events, message bus
//! frames, REST payloads and the unified error system.

pub mod client;
pub mod de;
pub mod error;
pub mod message;
pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

// Message bus re-exports (for convenient access)
pub use message::{BusMessage, EventType};

pub use error::{AppError, AppResult, ErrorCode, Surface};
