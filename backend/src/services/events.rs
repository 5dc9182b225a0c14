//! Transition notification bus
//!
//! Events are published synchronously at the end of each successful mutating
//! ledger operation. Observers see post-mutation state; no further ordering
//! guarantee is made.

use tokio::sync::broadcast;

use shared::models::BatchEvent;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Broadcast bus for batch transition notifications
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<BatchEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publish an event to all current subscribers. A send failure only
    /// means nobody is listening, which is not an error for the ledger.
    pub fn publish(&self, event: BatchEvent) {
        tracing::debug!(event = event.name(), batch_id = event.batch_id(), "publishing event");
        let _ = self.tx.send(event);
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<BatchEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::types::Address;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        let actor = Address::from_bytes(&[7u8; 20]);
        bus.publish(BatchEvent::Created {
            batch_id: 1,
            actor: actor.clone(),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(event, BatchEvent::Created { batch_id: 1, actor });
    }

    #[test]
    fn publish_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.publish(BatchEvent::Approved {
            batch_id: 2,
            actor: Address::from_bytes(&[1u8; 20]),
        });
    }
}
