//! Live-updating reads for the browsing surfaces
//!
//! The browsing list is refreshed on a fixed interval in addition to being
//! notified on explicit mutation events; both paths converge on the same
//! store read and are idempotent. Each feed owns one background task that
//! pushes snapshots through a watch channel and stops when the feed is
//! dropped.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::events::{ChangeEvent, ChangeNotifier};
use crate::domain::records::{Entry, Termbase, TermbaseId};
use crate::domain::repository::{RecordRepository, RecordStore, SchemaRepository};
use crate::CoreError;

/// Refresh cadence of the live feeds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Poll interval in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    2000
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// Live snapshot of all entries in one termbase
pub struct EntryFeed {
    rx: watch::Receiver<Vec<Entry>>,
    task: JoinHandle<()>,
}

impl EntryFeed {
    /// Spawn a feed for the given termbase
    pub fn spawn(
        store: Arc<dyn RecordStore>,
        notifier: &ChangeNotifier,
        termbase: TermbaseId,
        config: FeedConfig,
    ) -> Self {
        let (tx, rx) = watch::channel(Vec::new());
        let events = notifier.subscribe();
        let task = tokio::spawn(run_feed(
            tx,
            events,
            config,
            move |event| {
                matches!(
                    event,
                    ChangeEvent::EntrySaved { termbase_id, .. }
                    | ChangeEvent::LanguagesChanged { termbase_id }
                    | ChangeEvent::SchemaChanged { termbase_id }
                    if *termbase_id == termbase
                )
            },
            move || {
                let store = store.clone();
                async move { store.entries_of(termbase).await }
            },
        ));
        Self { rx, task }
    }

    /// Open a receiver onto the feed's snapshots
    pub fn subscribe(&self) -> watch::Receiver<Vec<Entry>> {
        self.rx.clone()
    }
}

impl Drop for EntryFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Live snapshot of all termbases
pub struct TermbaseFeed {
    rx: watch::Receiver<Vec<Termbase>>,
    task: JoinHandle<()>,
}

impl TermbaseFeed {
    /// Spawn the termbase list feed
    pub fn spawn(
        store: Arc<dyn RecordStore>,
        notifier: &ChangeNotifier,
        config: FeedConfig,
    ) -> Self {
        let (tx, rx) = watch::channel(Vec::new());
        let events = notifier.subscribe();
        let task = tokio::spawn(run_feed(
            tx,
            events,
            config,
            |event| matches!(event, ChangeEvent::TermbasesChanged),
            move || {
                let store = store.clone();
                async move { store.list_termbases().await }
            },
        ));
        Self { rx, task }
    }

    /// Open a receiver onto the feed's snapshots
    pub fn subscribe(&self) -> watch::Receiver<Vec<Termbase>> {
        self.rx.clone()
    }
}

impl Drop for TermbaseFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_feed<T, F, R, Fut>(
    tx: watch::Sender<Vec<T>>,
    mut events: broadcast::Receiver<ChangeEvent>,
    config: FeedConfig,
    relevant: F,
    read: R,
) where
    T: Send + Sync + 'static,
    F: Fn(&ChangeEvent) -> bool + Send + 'static,
    R: Fn() -> Fut + Send + 'static,
    Fut: std::future::Future<Output = Result<Vec<T>, CoreError>> + Send,
{
    let mut ticker = tokio::time::interval(Duration::from_millis(config.poll_interval_ms.max(1)));
    let mut events_open = true;
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            event = events.recv(), if events_open => {
                match event {
                    Ok(event) if relevant(&event) => {}
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "feed lagged behind change events, refreshing");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        events_open = false;
                        continue;
                    }
                }
            }
        }

        match read().await {
            Ok(snapshot) => {
                if tx.send(snapshot).is_err() {
                    // Every receiver is gone; the feed has no audience left.
                    break;
                }
            }
            Err(err) => warn!(error = %err, "feed refresh failed"),
        }
    }
}
