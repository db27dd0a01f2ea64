//! Cross-component change notifications
//!
//! Mutation events are pushed through an explicitly shared notifier rather
//! than a process-wide bus: whoever needs refresh signals holds a clone and
//! subscribes.

use tokio::sync::broadcast;
use tracing::debug;

use super::records::{EntryId, TermbaseId};

/// A mutation another component may want to react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// An edit session committed an entry
    EntrySaved {
        /// Termbase the entry belongs to
        termbase_id: TermbaseId,

        /// The committed entry
        entry_id: EntryId,
    },

    /// The language set of a termbase changed
    LanguagesChanged {
        /// The affected termbase
        termbase_id: TermbaseId,
    },

    /// Properties or input descriptors of a termbase changed
    SchemaChanged {
        /// The affected termbase
        termbase_id: TermbaseId,
    },

    /// A termbase was created, renamed, or deleted
    TermbasesChanged,
}

/// Broadcast handle for change events
///
/// Cloning shares the underlying channel; every subscriber receives every
/// event published after its subscription.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeNotifier {
    /// Create a notifier retaining up to `capacity` undelivered events per
    /// subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Open a new subscription
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    /// Publish an event to all current subscribers
    pub fn publish(&self, event: ChangeEvent) {
        if self.tx.send(event.clone()).is_err() {
            debug!(?event, "change event dropped, no subscribers");
        }
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new(16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_published_events() {
        let notifier = ChangeNotifier::default();
        let mut rx = notifier.subscribe();

        notifier.publish(ChangeEvent::EntrySaved {
            termbase_id: TermbaseId(1),
            entry_id: EntryId(2),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(
            event,
            ChangeEvent::EntrySaved {
                termbase_id: TermbaseId(1),
                entry_id: EntryId(2),
            }
        );
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_silent() {
        let notifier = ChangeNotifier::new(4);
        // Must not panic or error.
        notifier.publish(ChangeEvent::TermbasesChanged);
    }

    #[tokio::test]
    async fn test_late_subscribers_miss_earlier_events() {
        let notifier = ChangeNotifier::default();
        notifier.publish(ChangeEvent::TermbasesChanged);

        let mut rx = notifier.subscribe();
        notifier.publish(ChangeEvent::LanguagesChanged {
            termbase_id: TermbaseId(3),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(
            event,
            ChangeEvent::LanguagesChanged {
                termbase_id: TermbaseId(3),
            }
        );
    }
}
