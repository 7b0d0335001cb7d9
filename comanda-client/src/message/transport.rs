use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{Mutex, broadcast};
use uuid::Uuid;

use crate::message::MessageError;
use shared::message::{BusMessage, EventType};

/// Frames larger than this are refused
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// Header: event type, request id, correlation id, payload length
const HEADER_LEN: usize = 1 + 16 + 16 + 4;

/// Transport abstraction for the message channel
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn read_message(&self) -> Result<BusMessage, MessageError>;
    async fn write_message(&self, msg: &BusMessage) -> Result<(), MessageError>;
    async fn close(&self) -> Result<(), MessageError>;
}

/// Encode one frame; a missing correlation id is written as the nil UUID.
pub fn encode_frame(msg: &BusMessage) -> Vec<u8> {
    let mut data = Vec::with_capacity(HEADER_LEN + msg.payload.len());
    data.push(msg.event_type as u8);
    data.extend_from_slice(msg.request_id.as_bytes());
    data.extend_from_slice(msg.correlation_id.unwrap_or(Uuid::nil()).as_bytes());
    data.extend_from_slice(&(msg.payload.len() as u32).to_le_bytes());
    data.extend_from_slice(&msg.payload);
    data
}

/// Read one frame
pub async fn read_frame<R>(reader: &mut R) -> Result<BusMessage, MessageError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut type_buf = [0u8; 1];
    reader.read_exact(&mut type_buf).await?;
    let event_type = EventType::try_from(type_buf[0])
        .map_err(|byte| MessageError::InvalidMessage(format!("Invalid event type {byte}")))?;

    let mut uuid_buf = [0u8; 16];
    reader.read_exact(&mut uuid_buf).await?;
    let request_id = Uuid::from_bytes(uuid_buf);

    reader.read_exact(&mut uuid_buf).await?;
    let correlation_id = Some(Uuid::from_bytes(uuid_buf)).filter(|id| !id.is_nil());

    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await?;
    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_FRAME_LEN {
        return Err(MessageError::InvalidMessage(format!(
            "Frame of {len} bytes exceeds limit"
        )));
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;

    Ok(BusMessage {
        request_id,
        event_type,
        correlation_id,
        payload,
    })
}

/// TCP transport
#[derive(Debug, Clone)]
pub struct TcpTransport {
    reader: Arc<Mutex<OwnedReadHalf>>,
    writer: Arc<Mutex<OwnedWriteHalf>>,
}

impl TcpTransport {
    pub async fn connect(addr: &str) -> Result<Self, MessageError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| MessageError::Connection(format!("{addr}: {e}")))?;
        stream.set_nodelay(true)?;
        Ok(Self::from_stream(stream))
    }

    pub fn from_stream(stream: TcpStream) -> Self {
        let (reader, writer) = stream.into_split();
        Self {
            reader: Arc::new(Mutex::new(reader)),
            writer: Arc::new(Mutex::new(writer)),
        }
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn read_message(&self) -> Result<BusMessage, MessageError> {
        let mut reader = self.reader.lock().await;
        read_frame(&mut *reader).await
    }

    async fn write_message(&self, msg: &BusMessage) -> Result<(), MessageError> {
        let mut writer = self.writer.lock().await;
        writer.write_all(&encode_frame(msg)).await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), MessageError> {
        let mut writer = self.writer.lock().await;
        writer.shutdown().await?;
        Ok(())
    }
}

/// In-process transport over broadcast channels
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    /// Messages from the backend
    rx: Arc<Mutex<broadcast::Receiver<BusMessage>>>,
    /// Messages to the backend
    tx: broadcast::Sender<BusMessage>,
}

impl MemoryTransport {
    /// `server_tx` is what the backend broadcasts on; `to_server_tx` is where
    /// it listens.
    pub fn new(
        server_tx: &broadcast::Sender<BusMessage>,
        to_server_tx: &broadcast::Sender<BusMessage>,
    ) -> Self {
        Self {
            rx: Arc::new(Mutex::new(server_tx.subscribe())),
            tx: to_server_tx.clone(),
        }
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn read_message(&self) -> Result<BusMessage, MessageError> {
        let mut rx = self.rx.lock().await;
        loop {
            match rx.recv().await {
                Ok(msg) => return Ok(msg),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Memory transport lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return Err(MessageError::Closed),
            }
        }
    }

    async fn write_message(&self, msg: &BusMessage) -> Result<(), MessageError> {
        self.tx
            .send(msg.clone())
            .map_err(|_| MessageError::Connection("No server listening".into()))?;
        Ok(())
    }

    async fn close(&self) -> Result<(), MessageError> {
        Ok(())
    }
}
