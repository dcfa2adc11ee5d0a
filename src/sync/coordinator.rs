// SPDX-License-Identifier: GPL-3.0-only
use chrono::Utc;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;
use crate::remote::PhotoSource;
use crate::store::PhotoStore;
use crate::sync::report::{SyncError, SyncReport, SyncResult};
use crate::ui::MainQueue;

type InFlight = Shared<BoxFuture<'static, SyncResult>>;

/// Slot holding the cycle currently in flight, tagged with its id
type InFlightSlot = Arc<Mutex<Option<(Uuid, InFlight)>>>;

/// Keeps the local store in step with the remote photo source.
///
/// At most one cycle runs at a time. Calls made while a cycle is in flight
/// join it and receive its result.
#[derive(Clone)]
pub struct SyncCoordinator {
    source: Arc<dyn PhotoSource>,
    store: Arc<dyn PhotoStore>,
    in_flight: InFlightSlot,
}

impl SyncCoordinator {
    pub fn new(source: Arc<dyn PhotoSource>, store: Arc<dyn PhotoStore>) -> Self {
        Self {
            source,
            store,
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    /// Fetch, upsert in one transaction, and report the outcome.
    ///
    /// The cycle runs on a background task; change subscribers are notified by
    /// the store once the transaction has committed.
    pub async fn sync(&self) -> SyncResult {
        let cycle = {
            let mut slot = self.in_flight.lock().await;
            match slot.as_ref() {
                Some((sync_id, cycle)) => {
                    debug!(%sync_id, "Joining in-flight sync");
                    cycle.clone()
                }
                None => {
                    let sync_id = Uuid::new_v4();
                    let cycle = self.start_cycle(sync_id);
                    *slot = Some((sync_id, cycle.clone()));
                    cycle
                }
            }
        };

        cycle.await
    }

    /// Run `sync` in the background and hand its result to `on_complete` on
    /// the main context, whether the cycle succeeded or not.
    pub fn sync_then<F>(&self, main: MainQueue, on_complete: F) -> JoinHandle<()>
    where
        F: FnOnce(SyncResult) + Send + 'static,
    {
        let coordinator = self.clone();
        tokio::spawn(async move {
            let result = coordinator.sync().await;
            if !main.dispatch(move |_| on_complete(result)) {
                warn!("Main loop stopped before sync completion could run");
            }
        })
    }

    // Called with the slot lock held, so the spawned task cannot clear the slot
    // before the new cycle is stored in it.
    fn start_cycle(&self, sync_id: Uuid) -> InFlight {
        let source = Arc::clone(&self.source);
        let store = Arc::clone(&self.store);
        let slot = Arc::clone(&self.in_flight);

        let task_slot = Arc::clone(&slot);
        let handle = tokio::spawn(
            async move {
                let result = run_cycle(sync_id, source.as_ref(), store.as_ref()).await;
                clear_slot(&task_slot, sync_id).await;
                result
            }
            .instrument(info_span!("sync", %sync_id)),
        );

        async move {
            match handle.await {
                Ok(result) => result,
                Err(e) => {
                    error!(%sync_id, error = %e, "Sync task failed");
                    clear_slot(&slot, sync_id).await;
                    Err(SyncError::Aborted(e.to_string()))
                }
            }
        }
        .boxed()
        .shared()
    }
}

async fn clear_slot(slot: &InFlightSlot, sync_id: Uuid) {
    let mut slot = slot.lock().await;
    if matches!(slot.as_ref(), Some((id, _)) if *id == sync_id) {
        slot.take();
    }
}

async fn run_cycle(sync_id: Uuid, source: &dyn PhotoSource, store: &dyn PhotoStore) -> SyncResult {
    info!("Starting sync");

    let photos = match source.fetch_photos().await {
        Ok(photos) => photos,
        Err(e) => {
            error!(error = %e, "Failed to fetch photos");
            return Err(SyncError::Fetch(e.to_string()));
        }
    };
    let fetched = photos.len();

    if let Err(e) = store.upsert_photos(photos).await {
        error!(error = %e, "Failed saving photos");
        return Err(SyncError::Commit(e.to_string()));
    }

    info!(fetched, "Sync completed");
    Ok(SyncReport {
        sync_id,
        fetched,
        finished_at: Utc::now(),
    })
}
