//! Subscription handles
//!
//! A subscription owns the task that listens on the client's event fan-out.
//! Dropping the handle cancels that task, so a screen or session that goes
//! away never leaves a listener behind.

use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::{CancellationToken, DropGuard};

use shared::message::BusMessage;

const BUFFER: usize = 64;

/// Stream of `T` picked out of the client's messages
#[derive(Debug)]
pub struct Subscription<T> {
    rx: mpsc::Receiver<T>,
    token: CancellationToken,
    _guard: DropGuard,
}

impl<T: Send + 'static> Subscription<T> {
    /// Spawn the listener. `filter` maps each message to an item or skips it;
    /// cancelling `token` ends the subscription.
    pub(crate) fn spawn<F>(
        mut events: broadcast::Receiver<BusMessage>,
        token: CancellationToken,
        mut filter: F,
    ) -> Self
    where
        F: FnMut(BusMessage) -> Option<T> + Send + 'static,
    {
        let cancelled = token.clone();
        let (tx, rx) = mpsc::channel(BUFFER);

        tokio::spawn(async move {
            loop {
                let msg = tokio::select! {
                    _ = cancelled.cancelled() => break,
                    msg = events.recv() => msg,
                };
                match msg {
                    Ok(msg) => {
                        let Some(item) = filter(msg) else { continue };
                        if tx.send(item).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Subscriber lagged, events skipped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            tracing::debug!("Subscription listener stopped");
        });

        Self {
            rx,
            _guard: token.clone().drop_guard(),
            token,
        }
    }
}

impl<T> Subscription<T> {
    /// Next item; `None` once the channel closed or the subscription was
    /// cancelled and everything buffered was read.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Next item if one is already waiting
    pub fn try_recv(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Stop listening without dropping the handle
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::message::EventType;
    use std::time::Duration;

    #[tokio::test]
    async fn test_filters_messages() {
        let (tx, rx) = broadcast::channel(8);
        let mut sub = Subscription::spawn(rx, CancellationToken::new(), |msg: BusMessage| {
            (msg.event_type == EventType::Notification).then(|| msg.payload)
        });

        tx.send(BusMessage::new(EventType::Sync, vec![1])).unwrap();
        tx.send(BusMessage::new(EventType::Notification, vec![2])).unwrap();
        assert_eq!(sub.recv().await, Some(vec![2]));
    }

    #[tokio::test]
    async fn test_closed_channel_ends_stream() {
        let (tx, rx) = broadcast::channel::<BusMessage>(8);
        let mut sub = Subscription::spawn(rx, CancellationToken::new(), Some);
        drop(tx);
        assert_eq!(sub.recv().await, None);
    }

    #[tokio::test]
    async fn test_drop_stops_listener() {
        let (tx, rx) = broadcast::channel::<BusMessage>(8);
        let sub = Subscription::spawn(rx, CancellationToken::new(), Some);
        assert_eq!(tx.receiver_count(), 1);
        drop(sub);

        tokio::time::timeout(Duration::from_secs(1), async {
            while tx.receiver_count() > 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("listener should release its receiver");
    }

    #[tokio::test]
    async fn test_cancel() {
        let (tx, rx) = broadcast::channel::<BusMessage>(8);
        let mut sub = Subscription::spawn(rx, CancellationToken::new(), Some);
        sub.cancel();
        assert!(sub.is_cancelled());
        assert_eq!(sub.recv().await, None);
        drop(tx);
    }
}
