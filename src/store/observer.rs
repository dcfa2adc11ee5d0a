// SPDX-License-Identifier: GPL-3.0-only
use tokio::sync::broadcast;
use tracing::debug;

/// Capacity of the change channel; slow subscribers see `Lagged` past this.
const CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// A write transaction committed `count` records
    PhotosChanged { count: usize },
}

/// Observer registry owned by a store. Events are only sent after a commit.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    chan: broadcast::Sender<StoreEvent>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self {
            chan: broadcast::channel(CHANNEL_CAPACITY).0,
        }
    }

    pub fn notify(&self, event: StoreEvent) {
        if self.chan.receiver_count() > 0 {
            debug!(?event, subscribers = self.chan.receiver_count(), "Broadcasting store change");
            self.chan.send(event).ok();
        }
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.chan.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.chan.receiver_count()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Disposable registration handle. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<StoreEvent>,
}

impl Subscription {
    /// Wait for the next change.
    ///
    /// Returns `None` once the notifier is gone. Missed events collapse into a
    /// single change so callers always end up re-reading the store.
    pub async fn changed(&mut self) -> Option<StoreEvent> {
        match self.receiver.recv().await {
            Ok(event) => Some(event),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!(skipped, "Subscription lagged behind store changes");
                Some(StoreEvent::PhotosChanged { count: 0 })
            }
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}
