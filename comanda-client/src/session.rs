//! One open tab bound to the message channel
//!
//! [`TabSession`] owns the tab's local state and payment flow, listens for
//! the backend's tab events and sends the commands the state objects build.
//! Snapshots always win: whatever the backend pushes replaces local state.

use std::time::Duration;

use comanda_core::draft::{self, OrderDraft};
use comanda_core::{LineForm, PaymentFlow, TabState};
use shared::order::{InsertOrder, OrderCommand, PaymentRequest, StockAlert, TabEvent};
use shared::util::now_hhmm;

use crate::api::ComandaApi;
use crate::config::{ClientConfig, DEFAULT_REFRESH_TIMEOUT};
use crate::error::ClientResult;
use crate::http::HttpClient;
use crate::message::{MessageClient, MessageError, Subscription};

/// Result of [`TabSession::refresh`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A snapshot of this tab arrived
    Updated,
    /// Nothing arrived in time; local state was left as it was
    TimedOut,
}

/// What an incoming event did to the session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    /// Local state replaced by the backend's snapshot
    Snapshot,
    /// The tab was closed and cleared
    Deleted,
    /// Backend reported an error
    ServerError(String),
    StockAlert(StockAlert),
    /// Not about this tab
    Ignored,
}

#[derive(Debug)]
pub struct TabSession {
    client: MessageClient,
    events: Subscription<TabEvent>,
    tab: TabState,
    payment: PaymentFlow,
    operator: String,
    refresh_timeout: Duration,
}

impl TabSession {
    /// Start listening for `tab_id`. The local state is empty until the
    /// first snapshot; call [`refresh`](Self::refresh) to ask for one.
    pub fn open(client: &MessageClient, tab_id: &str, operator: impl Into<String>) -> Self {
        let tab_id = tab_id.trim();
        tracing::debug!(tab = tab_id, "Tab session opened");
        Self {
            events: client.subscribe_tab_events(),
            client: client.clone(),
            tab: TabState::new(tab_id),
            payment: PaymentFlow::new(tab_id, Vec::new(), 0.0),
            operator: operator.into(),
            refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
        }
    }

    pub fn from_config(
        client: &MessageClient,
        config: &ClientConfig,
        tab_id: &str,
        operator: impl Into<String>,
    ) -> Self {
        Self::open(client, tab_id, operator).with_refresh_timeout(config.refresh_timeout)
    }

    pub fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    pub fn tab_id(&self) -> &str {
        self.tab.tab_id()
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    pub fn tab(&self) -> &TabState {
        &self.tab
    }

    /// Edit mode and quantity nudges
    pub fn tab_mut(&mut self) -> &mut TabState {
        &mut self.tab
    }

    pub fn payment(&self) -> &PaymentFlow {
        &self.payment
    }

    /// Mode, method, extras and itemized selection
    pub fn payment_mut(&mut self) -> &mut PaymentFlow {
        &mut self.payment
    }

    /// Apply one backend event
    pub fn handle_event(&mut self, event: TabEvent) -> SessionUpdate {
        match event {
            TabEvent::TabUpdated(snapshot) => {
                let lines = snapshot.lines.clone();
                let amount_due = snapshot.amount_due;
                if !self.tab.apply_snapshot(snapshot) {
                    return SessionUpdate::Ignored;
                }
                self.payment.refresh(lines, amount_due);
                SessionUpdate::Snapshot
            }
            TabEvent::TabDeleted(deleted) => {
                if !self.tab.apply_deleted(&deleted.fcomanda) {
                    return SessionUpdate::Ignored;
                }
                self.payment = PaymentFlow::new(self.tab.tab_id(), Vec::new(), 0.0);
                SessionUpdate::Deleted
            }
            TabEvent::Error(err) => {
                tracing::warn!(tab = self.tab.tab_id(), message = %err.message, "Server error");
                SessionUpdate::ServerError(err.message)
            }
            TabEvent::StockAlert(alert) => SessionUpdate::StockAlert(alert),
            TabEvent::OrdersListed(_) | TabEvent::MenuListed(_) | TabEvent::TabsListed(_) => {
                SessionUpdate::Ignored
            }
        }
    }

    /// Wait for the next event and apply it; `None` once the channel closed
    pub async fn next_update(&mut self) -> Option<SessionUpdate> {
        let event = self.events.recv().await?;
        Some(self.handle_event(event))
    }

    /// Ask the backend for fresh state and wait for this tab's snapshot.
    ///
    /// Events that arrive meanwhile are applied as usual. After the refresh
    /// timeout the wait stops and local state stays as it is.
    pub async fn refresh(&mut self) -> ClientResult<RefreshOutcome> {
        self.client
            .send_command(&OrderCommand::request_refresh())
            .await?;
        let deadline = tokio::time::Instant::now() + self.refresh_timeout;
        loop {
            match tokio::time::timeout_at(deadline, self.events.recv()).await {
                Err(_) => {
                    tracing::warn!(tab = self.tab.tab_id(), timeout = ?self.refresh_timeout, "Refresh timed out");
                    return Ok(RefreshOutcome::TimedOut);
                }
                Ok(None) => return Err(MessageError::Closed.into()),
                Ok(Some(event)) => match self.handle_event(event) {
                    SessionUpdate::Snapshot | SessionUpdate::Deleted => {
                        return Ok(RefreshOutcome::Updated);
                    }
                    _ => continue,
                },
            }
        }
    }

    /// Show the lines of payment round `round` (0 = current)
    pub async fn load_round<H: HttpClient>(
        &mut self,
        api: &ComandaApi<H>,
        round: u32,
    ) -> ClientResult<()> {
        let response = api.tab_lines(self.tab.tab_id(), round).await?;
        self.payment.refresh(response.data.clone(), response.preco);
        self.tab.apply_round(round, response.data, response.preco);
        Ok(())
    }

    /// Confirm the payment and hand it to the channel.
    ///
    /// A validation failure leaves the flow where it was. Once confirmed the
    /// flow returns to idle whether or not the send succeeded; a send error
    /// is transient and the operator retries.
    pub async fn confirm_payment(&mut self) -> ClientResult<PaymentRequest> {
        let request = self.payment.confirm()?;
        let sent = self
            .client
            .send_command(&request.clone().into_command())
            .await;
        self.payment.finish();
        match sent {
            Ok(()) => {
                tracing::info!(tab = %request.tab_id, mode = ?request.mode, total = request.total, "Payment sent");
                Ok(request)
            }
            Err(e) => {
                tracing::error!(tab = %request.tab_id, error = %e, "Payment not sent");
                Err(e.into())
            }
        }
    }

    /// Send the draft's lines to this tab
    pub async fn send_order(&mut self, draft: OrderDraft) -> ClientResult<InsertOrder> {
        let command = draft.into_command(self.tab.tab_id(), self.operator.clone(), now_hhmm())?;
        self.send(OrderCommand::InsertOrder(command.clone())).await?;
        Ok(command)
    }

    /// One free unit of `item`
    pub async fn send_complimentary(&mut self, item: &str) -> ClientResult<InsertOrder> {
        let command =
            draft::complimentary(self.tab.tab_id(), item, self.operator.clone(), now_hhmm())?;
        self.send(OrderCommand::InsertOrder(command.clone())).await?;
        Ok(command)
    }

    /// Leave edit mode and push the changed lines. Returns whether anything
    /// was sent.
    pub async fn commit_edit(&mut self) -> ClientResult<bool> {
        match self.tab.commit_edit(Some(self.operator.clone()))? {
            Some(update) => {
                self.send(OrderCommand::UpdateTab(update)).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Validate and send a line correction
    pub async fn submit_line_edit(&mut self, form: &LineForm) -> ClientResult<()> {
        let command = form.validate(Some(self.operator.clone()))?;
        self.send(OrderCommand::EditLine(command)).await
    }

    /// Revert the payments of the round being shown
    pub async fn undo_payment(&mut self) -> ClientResult<()> {
        let command = self.tab.undo_payment();
        self.send(OrderCommand::UndoPayment(command)).await
    }

    /// Manual change of the tab total (discount and similar)
    pub async fn adjust_total(&mut self, amount: &str, kind: &str) -> ClientResult<()> {
        let command = self.tab.adjust_total(amount, kind)?;
        self.send(OrderCommand::AdjustTotal(command)).await
    }

    async fn send(&self, command: OrderCommand) -> ClientResult<()> {
        self.client.send_command(&command).await.map_err(|e| {
            tracing::error!(tab = self.tab.tab_id(), event = command.event_name(), error = %e, "Command not sent");
            e.into()
        })
    }
}
