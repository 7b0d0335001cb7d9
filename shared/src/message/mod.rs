//! Message bus types
//!
//! Shared by the in-memory and TCP transports of the client.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use uuid::Uuid;

use crate::order::{OrderCommand, TabEvent};

pub mod payload;
pub use payload::*;

/// Protocol version announced in the handshake
pub const PROTOCOL_VERSION: u16 = 1;

/// Kind of a bus message; the first byte of every TCP frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventType {
    Handshake = 0,
    /// Tab event pushed by the backend
    Notification = 1,
    /// Order command sent by the client
    RequestCommand = 3,
    Sync = 4,
    /// Reply to a request command, carries `correlation_id`
    Response = 5,
}

impl EventType {
    pub const fn name(&self) -> &'static str {
        match self {
            EventType::Handshake => "handshake",
            EventType::Notification => "notification",
            EventType::RequestCommand => "request_command",
            EventType::Sync => "sync",
            EventType::Response => "response",
        }
    }
}

impl TryFrom<u8> for EventType {
    type Error = u8;

    /// The unknown byte is handed back on failure
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        [
            EventType::Handshake,
            EventType::Notification,
            EventType::RequestCommand,
            EventType::Sync,
            EventType::Response,
        ]
        .into_iter()
        .find(|ty| *ty as u8 == value)
        .ok_or(value)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One message on the channel. `request_id` is fresh per message; a reply
/// copies the request's id into `correlation_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct BusMessage {
    pub request_id: Uuid,
    pub event_type: EventType,
    pub correlation_id: Option<Uuid>,
    /// JSON body
    pub payload: Vec<u8>,
}

impl BusMessage {
    pub fn new(event_type: EventType, payload: Vec<u8>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            event_type,
            correlation_id: None,
            payload,
        }
    }

    fn json<T: Serialize>(event_type: EventType, payload: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::new(event_type, serde_json::to_vec(payload)?))
    }

    /// Set the correlation id (RPC responses)
    pub fn with_correlation_id(mut self, id: Uuid) -> Self {
        self.correlation_id = Some(id);
        self
    }

    pub fn handshake(payload: &HandshakePayload) -> Result<Self, serde_json::Error> {
        Self::json(EventType::Handshake, payload)
    }

    pub fn order_command(command: &OrderCommand) -> Result<Self, serde_json::Error> {
        Self::json(EventType::RequestCommand, command)
    }

    pub fn tab_event(event: &TabEvent) -> Result<Self, serde_json::Error> {
        Self::json(EventType::Notification, event)
    }

    pub fn response(payload: &ResponsePayload) -> Result<Self, serde_json::Error> {
        Self::json(EventType::Response, payload)
    }

    /// Parse the payload as the given type
    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}
