use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{broadcast, oneshot};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::message::subscription::Subscription;
use crate::message::transport::{MemoryTransport, TcpTransport, Transport};
use crate::message::{MessageClientConfig, MessageError};
use shared::message::{BusMessage, EventType, HandshakePayload, PROTOCOL_VERSION, ResponsePayload};
use comanda_core::KitchenBoard;
use shared::models::MenuItem;
use shared::order::{OrderCommand, TabEvent, TabsListed};

type PendingRequests = Arc<Mutex<HashMap<Uuid, oneshot::Sender<BusMessage>>>>;

/// Message channel client
///
/// One background task reads the transport. Replies carrying a
/// `correlation_id` complete the matching [`request`](Self::request); every
/// message is then fanned out to subscribers.
#[derive(Debug, Clone)]
pub struct MessageClient {
    transport: Arc<dyn Transport>,
    config: MessageClientConfig,
    event_tx: broadcast::Sender<BusMessage>,
    pending_requests: PendingRequests,
    shutdown: CancellationToken,
}

impl MessageClient {
    /// Wrap an already connected transport
    pub fn with_transport(transport: Arc<dyn Transport>, config: MessageClientConfig) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_buffer.max(1));
        let client = Self {
            transport,
            config,
            event_tx,
            pending_requests: Arc::new(Mutex::new(HashMap::new())),
            shutdown: CancellationToken::new(),
        };
        client.spawn_reader();
        client
    }

    fn spawn_reader(&self) {
        let transport = self.transport.clone();
        let event_tx = self.event_tx.clone();
        let pending = self.pending_requests.clone();
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            loop {
                let result = tokio::select! {
                    _ = shutdown.cancelled() => break,
                    result = transport.read_message() => result,
                };
                match result {
                    Ok(msg) => {
                        if let Some(correlation_id) = msg.correlation_id {
                            let waiter = pending
                                .lock()
                                .ok()
                                .and_then(|mut map| map.remove(&correlation_id));
                            if let Some(tx) = waiter {
                                let _ = tx.send(msg.clone());
                            }
                        }
                        if event_tx.send(msg).is_err() {
                            tracing::trace!("No subscribers for message");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Message channel read failed");
                        break;
                    }
                }
            }
            // Waiters see their sender dropped
            if let Ok(mut map) = pending.lock() {
                map.clear();
            }
            shutdown.cancel();
        });
    }

    /// Connect over TCP and send the handshake.
    ///
    /// Failed connection attempts are retried with backoff as `config`
    /// allows.
    pub async fn connect(
        addr: &str,
        client_name: &str,
        token: Option<String>,
        config: MessageClientConfig,
    ) -> Result<Self, MessageError> {
        let mut attempt = 0;
        let transport = loop {
            match TcpTransport::connect(addr).await {
                Ok(transport) => break transport,
                Err(e) if config.may_retry(attempt) => {
                    let delay = config.backoff(attempt);
                    tracing::warn!(addr, attempt, ?delay, error = %e, "Connection failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        let handshake = HandshakePayload {
            version: PROTOCOL_VERSION,
            client_name: Some(client_name.to_string()),
            client_version: Some(env!("CARGO_PKG_VERSION").to_string()),
            client_id: Some(Uuid::new_v4().to_string()),
            token,
        };
        transport
            .write_message(&BusMessage::handshake(&handshake)?)
            .await?;
        tracing::info!(addr, client_name, "Connected to message channel");

        Ok(Self::with_transport(Arc::new(transport), config))
    }

    /// In-process client
    pub fn memory(
        server_tx: &broadcast::Sender<BusMessage>,
        to_server_tx: &broadcast::Sender<BusMessage>,
    ) -> Self {
        let transport = MemoryTransport::new(server_tx, to_server_tx);
        Self::with_transport(Arc::new(transport), MessageClientConfig::default())
    }

    pub fn config(&self) -> &MessageClientConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        !self.shutdown.is_cancelled()
    }

    /// Send without waiting for a reply
    pub async fn send(&self, msg: &BusMessage) -> Result<(), MessageError> {
        if !self.is_connected() {
            return Err(MessageError::Closed);
        }
        self.transport.write_message(msg).await
    }

    /// Send and wait for the message whose `correlation_id` is this
    /// message's `request_id`
    pub async fn request(&self, msg: &BusMessage) -> Result<BusMessage, MessageError> {
        self.request_with_timeout(msg, self.config.request_timeout)
            .await
    }

    pub async fn request_with_timeout(
        &self,
        msg: &BusMessage,
        timeout: Duration,
    ) -> Result<BusMessage, MessageError> {
        let request_id = msg.request_id;
        let (tx, rx) = oneshot::channel();
        self.pending()?.insert(request_id, tx);

        if let Err(e) = self.send(msg).await {
            self.forget(request_id);
            return Err(e);
        }

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => Err(MessageError::Closed),
            Err(_) => {
                self.forget(request_id);
                Err(MessageError::Timeout(format!(
                    "No response after {}ms",
                    timeout.as_millis()
                )))
            }
        }
    }

    fn pending(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, oneshot::Sender<BusMessage>>>, MessageError>
    {
        self.pending_requests
            .lock()
            .map_err(|_| MessageError::Connection("Pending request table poisoned".into()))
    }

    fn forget(&self, request_id: Uuid) {
        if let Ok(mut map) = self.pending_requests.lock() {
            map.remove(&request_id);
        }
    }

    /// Fire an order command; the backend answers by pushing tab events.
    pub async fn send_command(&self, command: &OrderCommand) -> Result<(), MessageError> {
        tracing::debug!(event = command.event_name(), tab = ?command.tab_id(), "Sending command");
        self.send(&BusMessage::order_command(command)?).await
    }

    /// Send an order command and wait for the backend's acknowledgement.
    ///
    /// A failed [`ResponsePayload`] becomes [`MessageError::Rejected`].
    pub async fn request_command(
        &self,
        command: &OrderCommand,
    ) -> Result<Option<serde_json::Value>, MessageError> {
        let reply = self.request(&BusMessage::order_command(command)?).await?;
        let payload: ResponsePayload = reply.parse_payload()?;
        payload
            .into_result()
            .map_err(|e| MessageError::Rejected(e.message))
    }

    /// Raw subscription; `filter` picks and converts the messages wanted.
    pub fn subscribe<T, F>(&self, filter: F) -> Subscription<T>
    where
        T: Send + 'static,
        F: FnMut(BusMessage) -> Option<T> + Send + 'static,
    {
        Subscription::spawn(self.event_tx.subscribe(), self.shutdown.child_token(), filter)
    }

    /// Tab events pushed by the backend. Unreadable payloads are logged and
    /// skipped.
    pub fn subscribe_tab_events(&self) -> Subscription<TabEvent> {
        self.subscribe_events(Some)
    }

    /// Tab events narrowed by `pick`
    fn subscribe_events<T, F>(&self, mut pick: F) -> Subscription<T>
    where
        T: Send + 'static,
        F: FnMut(TabEvent) -> Option<T> + Send + 'static,
    {
        self.subscribe(move |msg| {
            if msg.event_type != EventType::Notification {
                return None;
            }
            match msg.parse_payload::<TabEvent>() {
                Ok(event) => pick(event),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable tab event");
                    None
                }
            }
        })
    }

    /// Tab lists, as answered to [`OrderCommand::list_tabs`]
    pub fn subscribe_tab_lists(&self) -> Subscription<TabsListed> {
        self.subscribe_events(|event| match event {
            TabEvent::TabsListed(listing) => Some(listing),
            _ => None,
        })
    }

    /// The menu with its options normalized, each time the backend sends it
    pub fn subscribe_menu(&self) -> Subscription<Vec<MenuItem>> {
        self.subscribe_events(|event| match event {
            TabEvent::MenuListed(menu) => Some(
                menu.entries
                    .iter()
                    .map(comanda_core::options::menu_item)
                    .collect(),
            ),
            _ => None,
        })
    }

    /// `board` refreshed with every order list the backend sends
    pub fn subscribe_board(&self, mut board: KitchenBoard) -> Subscription<KitchenBoard> {
        self.subscribe_events(move |event| match event {
            TabEvent::OrdersListed(list) => {
                board.apply(list.lines);
                Some(board.clone())
            }
            _ => None,
        })
    }

    /// Stop the reader and close the transport
    pub async fn close(&self) -> Result<(), MessageError> {
        self.shutdown.cancel();
        self.transport.close().await
    }
}
