// SPDX-License-Identifier: GPL-3.0-only
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::Instant;
use tracing::{info, warn};
use crate::config::Config;
use crate::presenter::{HttpThumbnailLoader, ListPresenter, ThumbnailLoader, LIST_ACCESSIBILITY_LABEL};
use crate::remote::{authenticate_then, ApiClient, PhotoSource};
use crate::store::{PhotoStore, SqlitePhotoStore};
use crate::sync::{SyncCoordinator, SyncResult};
use crate::ui::MainQueue;

/// Background tasks to stop on shutdown, including ones spawned from completions
type TaskList = Arc<Mutex<Vec<AbortHandle>>>;

/// Wired-up services of a running gallery
pub struct App {
    source: Arc<dyn PhotoSource>,
    coordinator: SyncCoordinator,
    main_queue: MainQueue,
    main_task: JoinHandle<()>,
    tasks: TaskList,
}

impl App {
    pub async fn start(config: &Config) -> anyhow::Result<Self> {
        if let Some(parent) = config.store_db_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let store: Arc<dyn PhotoStore> = Arc::new(SqlitePhotoStore::new(&config.store_db_path).await?);
        info!(
            path = %config.store_db_path.display(),
            photos = store.count().await?,
            "Photo store opened"
        );

        let source: Arc<dyn PhotoSource> = Arc::new(ApiClient::new(&config.api_base_url, config.request_timeout())?);
        let loader = Arc::new(HttpThumbnailLoader::new(config.request_timeout())?);

        Ok(Self::assemble(store, source, loader))
    }

    fn assemble(
        store: Arc<dyn PhotoStore>,
        source: Arc<dyn PhotoSource>,
        loader: Arc<dyn ThumbnailLoader>,
    ) -> Self {
        let coordinator = SyncCoordinator::new(Arc::clone(&source), Arc::clone(&store));
        let presenter = ListPresenter::new(Arc::clone(&store), loader);

        let (main_queue, main_loop) = MainQueue::new();
        let main_task = tokio::spawn(main_loop.run(presenter, store.subscribe()));
        info!(label = LIST_ACCESSIBILITY_LABEL, "Photo list attached");

        Self {
            source,
            coordinator,
            main_queue,
            main_task,
            tasks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Kick off the first sync, signing in first when credentials are configured
    pub fn initial_sync(&self, config: &Config) -> JoinHandle<()> {
        let handle = match config.credentials() {
            Some(credentials) => {
                let coordinator = self.coordinator.clone();
                let main_queue = self.main_queue.clone();
                let tasks = Arc::clone(&self.tasks);
                authenticate_then(
                    Arc::clone(&self.source),
                    credentials,
                    self.main_queue.clone(),
                    move || {
                        let sync = coordinator.sync_then(main_queue, log_sync_outcome);
                        track(&tasks, &sync);
                    },
                )
            }
            None => self.coordinator.sync_then(self.main_queue.clone(), log_sync_outcome),
        };

        track(&self.tasks, &handle);
        handle
    }

    /// Sync every `period`, first tick one period from now
    pub fn spawn_periodic_sync(&self, period: Duration) {
        let coordinator = self.coordinator.clone();
        let main_queue = self.main_queue.clone();
        let tasks = Arc::clone(&self.tasks);

        let handle = tokio::spawn(async move {
            info!(interval_secs = period.as_secs(), "Periodic sync started");
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                let sync = coordinator.sync_then(main_queue.clone(), log_sync_outcome);
                track(&tasks, &sync);
            }
        });
        track(&self.tasks, &handle);
    }

    /// Abort every background task, then stop the main loop
    pub async fn shutdown(self) {
        let tasks = std::mem::take(&mut *lock(&self.tasks));
        let running = tasks.iter().filter(|task| !task.is_finished()).count();
        info!(running, "Stopping background tasks");
        for task in tasks {
            task.abort();
        }

        self.main_task.abort();
        if let Err(e) = self.main_task.await {
            if !e.is_cancelled() {
                warn!(error = %e, "Main loop ended abnormally");
            }
        }
    }
}

fn lock(tasks: &TaskList) -> MutexGuard<'_, Vec<AbortHandle>> {
    tasks.lock().unwrap_or_else(|e| e.into_inner())
}

fn track(tasks: &TaskList, handle: &JoinHandle<()>) {
    let mut tasks = lock(tasks);
    tasks.retain(|task| !task.is_finished());
    tasks.push(handle.abort_handle());
}

fn log_sync_outcome(result: SyncResult) {
    match result {
        Ok(report) => {
            info!(sync_id = %report.sync_id, fetched = report.fetched, "Photos synced");
        }
        Err(e) => {
            // The list keeps showing whatever the store already holds
            warn!(error = %e, "Sync failed, showing stored photos");
        }
    }
}
