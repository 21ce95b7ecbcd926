use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::notifications::{notify_owner, LeaseNotice, Notifier};

/// Domain events published after a unit of work commits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    OwnerCreated(Uuid),
    OwnerUpdated(Uuid),
    OwnerDeleted(Uuid),

    PropertyCreated(Uuid),
    PropertyUpdated(Uuid),
    PropertyDeleted(Uuid),

    /// Emitted once per created lease; drives the owner notification.
    LeaseCreated(LeaseNotice),
    LeaseUpdated(Uuid),
    LeaseDeleted(Uuid),

    AvailabilityChanged { property_id: Uuid, disponible: bool },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Creates a sender together with its receiving end.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    /// Best-effort publish. A full or closed channel is logged and dropped.
    pub fn publish(&self, event: Event) {
        if let Err(e) = self.sender.try_send(event) {
            warn!(error = %e, "Dropping event");
        }
    }

    /// Publishes every event in order.
    pub fn publish_all(&self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            self.publish(event);
        }
    }
}

/// Consumes events until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>, notifier: Arc<dyn Notifier>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match event {
            Event::LeaseCreated(notice) => match notify_owner(notifier.as_ref(), &notice).await {
                Ok(true) => debug!(lease_id = %notice.lease_id, "Owner notified"),
                Ok(false) => {}
                Err(e) => warn!(
                    lease_id = %notice.lease_id,
                    error = %e,
                    "Failed to notify owner of lease request"
                ),
            },
            Event::AvailabilityChanged {
                property_id,
                disponible,
            } => {
                info!(%property_id, disponible, "Property availability changed");
            }
            other => debug!(event = ?other, "Event processed"),
        }
    }

    warn!("Event processing loop has ended");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_never_fails_when_channel_is_full_or_closed() {
        let (sender, mut rx) = EventSender::channel(1);
        sender.publish(Event::OwnerCreated(Uuid::new_v4()));
        sender.publish(Event::OwnerCreated(Uuid::new_v4()));
        assert!(matches!(rx.recv().await, Some(Event::OwnerCreated(_))));
        assert!(rx.try_recv().is_err());

        drop(rx);
        sender.publish(Event::OwnerDeleted(Uuid::new_v4()));
        sender.publish_all([Event::LeaseDeleted(Uuid::new_v4())]);
    }
}
