/// Application change feed
///
/// The dashboard re-renders when applications change. Instead of a reactive
/// query engine, the portal publishes explicit change events on an in-process
/// broadcast channel; the API exposes the feed over SSE and clients refetch
/// what they display.
///
/// Publishing is fire-and-forget: a mutation never blocks on the feed, and a
/// feed with no subscribers is not an error. A subscriber that falls behind
/// the channel capacity loses events and must resubscribe and refetch.
///
/// Events carry only identifiers, never application content.
///
/// # Example
///
/// ```
/// use launchpad_shared::events::{ApplicationEvent, ChangeFeed};
/// use uuid::Uuid;
///
/// # async fn example() {
/// let feed = ChangeFeed::default();
/// let mut rx = feed.subscribe();
///
/// feed.publish(ApplicationEvent::submitted(Uuid::new_v4(), Uuid::new_v4()));
///
/// let event = rx.recv().await.unwrap();
/// println!("application {} changed", event.application_id);
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Default broadcast capacity; slow subscribers past this lag are dropped
const DEFAULT_CAPACITY: usize = 256;

/// What happened to an application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// A new application was submitted
    Submitted,

    /// An existing pending application was edited
    Updated,
}

/// One change to the applications collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationEvent {
    /// What happened
    pub kind: ChangeKind,

    /// The application that changed
    pub application_id: Uuid,

    /// Its owner
    pub user_id: Uuid,

    /// When the change was observed
    pub occurred_at: DateTime<Utc>,
}

impl ApplicationEvent {
    /// Event for a freshly submitted application
    pub fn submitted(application_id: Uuid, user_id: Uuid) -> Self {
        Self {
            kind: ChangeKind::Submitted,
            application_id,
            user_id,
            occurred_at: Utc::now(),
        }
    }

    /// Event for an edited application
    pub fn updated(application_id: Uuid, user_id: Uuid) -> Self {
        Self {
            kind: ChangeKind::Updated,
            application_id,
            user_id,
            occurred_at: Utc::now(),
        }
    }
}

/// Broadcast channel of application changes
///
/// Cheap to clone; all clones publish into the same channel.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ApplicationEvent>,
}

impl ChangeFeed {
    /// Creates a feed with the given buffer capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publishes an event to all current subscribers
    ///
    /// Returns the number of subscribers that received it. Zero subscribers
    /// is normal (nobody is watching the dashboard).
    pub fn publish(&self, event: ApplicationEvent) -> usize {
        match self.tx.send(event) {
            Ok(receivers) => receivers,
            Err(_) => 0,
        }
    }

    /// Opens a new subscription starting at the next published event
    pub fn subscribe(&self) -> broadcast::Receiver<ApplicationEvent> {
        self.tx.subscribe()
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let feed = ChangeFeed::default();
        let mut rx = feed.subscribe();

        let application_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let delivered = feed.publish(ApplicationEvent::submitted(application_id, user_id));
        assert_eq!(delivered, 1);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, ChangeKind::Submitted);
        assert_eq!(event.application_id, application_id);
        assert_eq!(event.user_id, user_id);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let feed = ChangeFeed::default();
        let delivered = feed.publish(ApplicationEvent::updated(Uuid::new_v4(), Uuid::new_v4()));
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn test_subscription_starts_at_next_event() {
        let feed = ChangeFeed::default();

        feed.publish(ApplicationEvent::submitted(Uuid::new_v4(), Uuid::new_v4()));

        let mut rx = feed.subscribe();
        let id = Uuid::new_v4();
        feed.publish(ApplicationEvent::updated(id, Uuid::new_v4()));

        // Only the event published after subscribing is visible
        let event = rx.recv().await.unwrap();
        assert_eq!(event.application_id, id);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_event_serializes_kind_lowercase() {
        let event = ApplicationEvent::submitted(Uuid::new_v4(), Uuid::new_v4());
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["kind"], "submitted");
    }
}
