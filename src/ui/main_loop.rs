// SPDX-License-Identifier: GPL-3.0-only
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use crate::presenter::{ListPresenter, RenderBatch, RenderedRows};
use crate::store::Subscription;

/// Work that must run on the main context
pub type MainJob = Box<dyn FnOnce(&mut ListPresenter) + Send>;

/// Handle for posting work to the main loop
#[derive(Clone)]
pub struct MainQueue {
    tx: mpsc::UnboundedSender<MainJob>,
}

impl MainQueue {
    pub fn new() -> (Self, MainLoop) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, MainLoop { rx })
    }

    /// Post a job. Returns `false` if the main loop is gone.
    pub fn dispatch<F>(&self, job: F) -> bool
    where
        F: FnOnce(&mut ListPresenter) + Send + 'static,
    {
        self.tx.send(Box::new(job)).is_ok()
    }
}

/// The single consumer that owns the presenter
pub struct MainLoop {
    rx: mpsc::UnboundedReceiver<MainJob>,
}

impl MainLoop {
    /// Run until every `MainQueue` handle is dropped or the store goes away.
    ///
    /// Thumbnails are loaded on a separate task and handed back to the loop,
    /// so posted jobs never wait on thumbnail requests.
    pub async fn run(mut self, mut presenter: ListPresenter, mut subscription: Subscription) {
        info!("Main loop started");
        let mut renderer = Renderer::new();
        reload(&mut presenter, &mut renderer).await;

        loop {
            tokio::select! {
                // Changes first, so a completion posted after a commit sees fresh rows
                biased;

                event = subscription.changed() => match event {
                    Some(event) => {
                        debug!(?event, "Reloading photo list");
                        reload(&mut presenter, &mut renderer).await;
                    }
                    None => break,
                },
                Some(rendered) = renderer.rx.recv() => {
                    if presenter.apply_render(rendered) {
                        log_rows(&presenter);
                    }
                },
                job = self.rx.recv() => match job {
                    Some(job) => job(&mut presenter),
                    None => break,
                },
            }
        }

        renderer.cancel();
        subscription.unsubscribe();
        info!("Main loop stopped");
    }
}

/// Background thumbnail loading for the main loop
struct Renderer {
    tx: mpsc::UnboundedSender<RenderedRows>,
    rx: mpsc::UnboundedReceiver<RenderedRows>,
    task: Option<JoinHandle<()>>,
}

impl Renderer {
    fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx, task: None }
    }

    /// Start loading `batch`, superseding any render still in progress
    fn start(&mut self, batch: RenderBatch) {
        self.cancel();
        let tx = self.tx.clone();
        self.task = Some(tokio::spawn(async move {
            tx.send(batch.load().await).ok();
        }));
    }

    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn reload(presenter: &mut ListPresenter, renderer: &mut Renderer) {
    if let Err(e) = presenter.refresh().await {
        // Keep showing the previous snapshot
        error!(error = %e, "Failed to refresh photo list");
        return;
    }

    renderer.start(presenter.render_batch());
}

fn log_rows(presenter: &ListPresenter) {
    let rows = presenter.rows();
    for row in rows {
        debug!(
            photo_id = row.photo_id,
            title = %row.title,
            thumbnail_bytes = row.thumbnail.as_ref().map_or(0, |bytes| bytes.len()),
            "Photo row"
        );
    }

    let missing = rows.iter().filter(|row| row.thumbnail.is_none()).count();
    info!(
        rows = rows.len(),
        missing_thumbnails = missing,
        selected = ?presenter.selected_record().map(|photo| photo.id),
        "Photo list rendered"
    );
}
