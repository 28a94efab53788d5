//! Change-event fan-out to push subscribers
//!
//! Registry of live subscriber queues, independent of the push transport:
//! - `register` on connect hands out a bounded receiver
//! - `unregister` on close is idempotent and may race `publish`
//! - `publish` walks the membership as of the call and never blocks on a
//!   slow subscriber
//!
//! Each subscriber queue holds at most [`SUBSCRIBER_QUEUE_CAPACITY`] events.
//! A subscriber whose queue is full, or whose receiver is already gone, just
//! misses the event. The failure is logged and does not affect the other
//! subscribers or the caller.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::RwLock;

use crate::types::ChangeEvent;

/// Identifier handed out by [`Broadcaster::register`]
pub type SubscriberId = u64;

/// Events buffered per subscriber before new ones are dropped
pub const SUBSCRIBER_QUEUE_CAPACITY: usize = 256;

/// Receiving end of a registration
pub type Subscription = mpsc::Receiver<ChangeEvent>;

/// Publish/subscribe registry for board change events
#[derive(Clone, Default)]
pub struct Broadcaster {
    subscribers: Arc<RwLock<HashMap<SubscriberId, mpsc::Sender<ChangeEvent>>>>,
    next_id: Arc<AtomicU64>,
}

impl Broadcaster {
    /// Create empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber
    ///
    /// The subscription sees every event published after this returns and
    /// nothing published before.
    pub async fn register(&self) -> (SubscriberId, Subscription) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let (tx, rx) = mpsc::channel(SUBSCRIBER_QUEUE_CAPACITY);

        self.subscribers.write().await.insert(id, tx);
        tracing::debug!("Registered subscriber {}", id);

        (id, rx)
    }

    /// Remove a subscriber, no-op if already gone
    pub async fn unregister(&self, id: SubscriberId) {
        if self.subscribers.write().await.remove(&id).is_some() {
            tracing::debug!("Unregistered subscriber {}", id);
        }
    }

    /// Deliver `event` to every current subscriber
    ///
    /// Returns how many subscribers it was delivered to.
    pub async fn publish(&self, event: ChangeEvent) -> usize {
        let subscribers = self.subscribers.read().await;
        let mut delivered = 0;

        for (id, tx) in subscribers.iter() {
            match tx.try_send(event) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!("Delivery to subscriber {} failed: queue full, event dropped", id);
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::warn!("Delivery to subscriber {} failed: connection closing", id);
                }
            }
        }

        tracing::trace!(
            "Published ({}, {}) -> {} to {} subscriber(s)",
            event.x,
            event.y,
            event.color.get(),
            delivered
        );
        delivered
    }

    /// Number of registered subscribers
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::ColorIndex;

    fn event(x: usize, y: usize, color: i64) -> ChangeEvent {
        ChangeEvent::new(x, y, ColorIndex::new(color).unwrap())
    }

    #[tokio::test]
    async fn test_publish_reaches_all_subscribers() {
        let broadcaster = Broadcaster::new();
        let (_id1, mut rx1) = broadcaster.register().await;
        let (_id2, mut rx2) = broadcaster.register().await;

        assert_eq!(broadcaster.publish(event(0, 0, 5)).await, 2);

        assert_eq!(rx1.recv().await, Some(event(0, 0, 5)));
        assert_eq!(rx2.recv().await, Some(event(0, 0, 5)));
        assert!(rx1.try_recv().is_err());
        assert!(rx2.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_no_replay_for_late_subscriber() {
        let broadcaster = Broadcaster::new();
        let (_early, mut early_rx) = broadcaster.register().await;

        broadcaster.publish(event(0, 0, 5)).await;
        let (_late, mut late_rx) = broadcaster.register().await;

        assert_eq!(early_rx.recv().await, Some(event(0, 0, 5)));
        assert!(late_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unregister_idempotent() {
        let broadcaster = Broadcaster::new();
        let (id, _rx) = broadcaster.register().await;
        assert_eq!(broadcaster.subscriber_count().await, 1);

        broadcaster.unregister(id).await;
        broadcaster.unregister(id).await;
        assert_eq!(broadcaster.subscriber_count().await, 0);
        assert_eq!(broadcaster.publish(event(1, 1, 1)).await, 0);
    }

    #[tokio::test]
    async fn test_dropped_receiver_isolated() {
        let broadcaster = Broadcaster::new();
        let (_gone, gone_rx) = broadcaster.register().await;
        let (_live, mut live_rx) = broadcaster.register().await;
        drop(gone_rx);

        assert_eq!(broadcaster.publish(event(2, 3, 4)).await, 1);
        assert_eq!(live_rx.recv().await, Some(event(2, 3, 4)));
    }

    #[tokio::test]
    async fn test_stalled_subscriber_bounded() {
        let broadcaster = Broadcaster::new();
        let (_stalled, mut stalled_rx) = broadcaster.register().await;
        let (_live, mut live_rx) = broadcaster.register().await;

        let total = SUBSCRIBER_QUEUE_CAPACITY + 50;
        for i in 0..total {
            let delivered = broadcaster.publish(event(i % 4, 0, 1)).await;
            let expected = if i < SUBSCRIBER_QUEUE_CAPACITY { 2 } else { 1 };
            assert_eq!(delivered, expected, "publish #{}", i);

            // Live subscriber keeps up and sees every event
            assert_eq!(live_rx.recv().await.map(|e| e.x), Some(i % 4));
        }

        // Stalled subscriber only ever holds a full queue
        let mut buffered = 0;
        while stalled_rx.try_recv().is_ok() {
            buffered += 1;
        }
        assert_eq!(buffered, SUBSCRIBER_QUEUE_CAPACITY);
    }

    #[tokio::test]
    async fn test_events_arrive_in_publish_order() {
        let broadcaster = Broadcaster::new();
        let (_id, mut rx) = broadcaster.register().await;

        for i in 0..10 {
            broadcaster.publish(event(i, 0, 1)).await;
        }
        for i in 0..10 {
            assert_eq!(rx.recv().await.map(|e| e.x), Some(i));
        }
    }

    #[tokio::test]
    async fn test_unique_ids() {
        let broadcaster = Broadcaster::new();
        let (id1, _rx1) = broadcaster.register().await;
        let (id2, _rx2) = broadcaster.register().await;
        assert_ne!(id1, id2);
    }

    #[tokio::test]
    async fn test_unregister_during_publish() {
        let broadcaster = Broadcaster::new();
        let mut ids = Vec::new();
        let mut receivers = Vec::new();
        for _ in 0..32 {
            let (id, rx) = broadcaster.register().await;
            ids.push(id);
            receivers.push(rx);
        }

        let publisher = {
            let broadcaster = broadcaster.clone();
            tokio::spawn(async move {
                for i in 0..100 {
                    broadcaster.publish(event(i % 4, 0, 1)).await;
                }
            })
        };
        let remover = {
            let broadcaster = broadcaster.clone();
            tokio::spawn(async move {
                for id in ids {
                    broadcaster.unregister(id).await;
                }
            })
        };

        publisher.await.unwrap();
        remover.await.unwrap();
        assert_eq!(broadcaster.subscriber_count().await, 0);
    }
}
