pub mod event;
pub mod filter;
pub mod settle;

pub use event::{FileEvent, FileEventKind};
pub use filter::EventFilter;
pub use settle::RecentPaths;

use crate::config::Config;
use crate::conversion::{BulkConverter, ConversionOutcome};
use crate::pipeline::ConversionPipeline;
use anyhow::{Context, Result};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Maximum number of notifications waiting to be processed.
const EVENT_QUEUE_CAPACITY: usize = 256;

/// Root directory of the recursive watch, checked to exist and be readable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget(PathBuf);

impl WatchTarget {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let canonical = std::fs::canonicalize(path)
            .with_context(|| format!("Watch path does not exist: {:?}", path))?;

        if !canonical.is_dir() {
            anyhow::bail!("Watch path is not a directory: {:?}", path);
        }

        std::fs::read_dir(&canonical)
            .with_context(|| format!("Watch path is not readable: {:?}", path))?;

        Ok(Self(canonical))
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Idle,
    Watching,
    Stopped,
}

/// File watcher that converts new source files under a directory tree.
///
/// Events are handled one at a time in arrival order. Cancellation is
/// only checked between events, so a conversion (and its deletion retries)
/// in flight always completes.
pub struct FileWatcher {
    target: WatchTarget,
    filter: EventFilter,
    pipeline: ConversionPipeline,
    recent: RecentPaths,
    state: WatcherState,
    watcher: Option<RecommendedWatcher>,
    events: Option<mpsc::Receiver<FileEvent>>,
}

impl FileWatcher {
    pub fn new(
        target: WatchTarget,
        filter: EventFilter,
        pipeline: ConversionPipeline,
        dedupe_window: Duration,
    ) -> Self {
        Self {
            target,
            filter,
            pipeline,
            recent: RecentPaths::new(dedupe_window),
            state: WatcherState::Idle,
            watcher: None,
            events: None,
        }
    }

    pub fn from_config(config: &Config, target: WatchTarget, pipeline: ConversionPipeline) -> Self {
        Self::new(
            target,
            EventFilter::from_config(config),
            pipeline,
            config.watch.dedupe_window(),
        )
    }

    pub fn state(&self) -> WatcherState {
        self.state
    }

    pub fn target(&self) -> &WatchTarget {
        &self.target
    }

    /// Subscribe to recursive notifications on the target.
    ///
    /// Events start queueing immediately; they are processed by [`run`](Self::run).
    pub fn start(&mut self) -> Result<()> {
        if self.state != WatcherState::Idle {
            anyhow::bail!("File watcher cannot start from state {:?}", self.state);
        }

        let (event_tx, event_rx) = mpsc::channel::<FileEvent>(EVENT_QUEUE_CAPACITY);

        let mut watcher = notify::recommended_watcher(
            move |res: Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    for file_event in FileEvent::from_notify(event) {
                        if event_tx.blocking_send(file_event).is_err() {
                            return; // receiver dropped, shutdown
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "File watcher error");
                }
            },
        )
        .context("Failed to create file watcher")?;

        watcher
            .watch(self.target.path(), RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch path: {:?}", self.target.path()))?;

        tracing::info!("Watching directory: {}", self.target.path().display());

        self.watcher = Some(watcher);
        self.events = Some(event_rx);
        self.state = WatcherState::Watching;
        Ok(())
    }

    /// Process events until `cancel` fires. Starts the watcher if needed.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<()> {
        if self.state == WatcherState::Idle {
            self.start()?;
        }

        let mut events = self
            .events
            .take()
            .with_context(|| format!("File watcher is {:?}", self.state))?;

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    tracing::info!("File watcher shutting down");
                    break;
                }
                next = events.recv() => {
                    match next {
                        Some(event) => {
                            self.dispatch(event).await;
                        }
                        None => {
                            tracing::warn!("File watcher event stream closed");
                            break;
                        }
                    }
                }
            }
        }

        drop(events);
        self.stop();
        Ok(())
    }

    /// Filter one event and run it through the pipeline if it passes.
    pub async fn dispatch(&mut self, event: FileEvent) -> Option<ConversionOutcome> {
        if !self.filter.should_convert(&event) {
            return None;
        }

        if !self.recent.first_seen(&event.path) {
            tracing::debug!(path = %event.path.display(), "Ignoring duplicate create event");
            return None;
        }

        let outcome = self.pipeline.process(&event.path).await;
        self.recent.mark_done(&event.path);
        Some(outcome)
    }

    /// Drop the subscription.
    pub fn stop(&mut self) {
        self.events = None;
        self.watcher = None;
        self.state = WatcherState::Stopped;
        tracing::info!("File watcher stopped");
    }
}

/// Convert existing files if the policy asks for it, then watch until cancelled.
pub async fn run(config: &Config, target: WatchTarget, cancel: CancellationToken) -> Result<()> {
    let pipeline = ConversionPipeline::from_config(config, target.path());

    if pipeline.policy().convert_existing {
        BulkConverter::from_config(config, pipeline.clone())
            .convert_existing(target.path())
            .await;
    }

    let mut watcher = FileWatcher::from_config(config, target, pipeline);
    watcher.start()?;
    watcher.run(cancel).await
}
