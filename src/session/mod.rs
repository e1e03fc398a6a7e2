//! Session runtime: owns the current run and exposes it read-only.
//!
//! Provides the surface a view binds to:
//! - [`StudioSession::start`] - submit a provider and stream a new run
//! - [`StudioSession::cancel`] - stop the in-flight run
//! - [`StudioSession::snapshot`] / [`StudioSession::subscribe`] / [`StudioSession::updates`] - observe the run
//! - [`StudioSession::wait`] - block until the current run finishes

use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::StudioConfig;
use crate::error::Result;
use crate::pipeline::{self, reduce, RunEvent};
use crate::stream::{HttpTransport, PipelineTransport};
use crate::types::{PipelineRun, ProviderInput, RunId};

type RunSlot = watch::Sender<Option<PipelineRun>>;

struct ActiveRun {
    id: RunId,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Owns at most one run at a time.
///
/// Starting a new run cancels the previous one; a cancelled run can never
/// write into its successor's state.
///
/// # Example
///
/// ```ignore
/// let session = StudioSession::new(StudioConfig::global())?;
/// session.start(ProviderInput::new("Dr. Sarah Smith")).await?;
/// let run = session.wait().await;
/// ```
pub struct StudioSession {
    transport: Arc<dyn PipelineTransport>,
    idle_timeout: Option<Duration>,
    slot: Arc<RunSlot>,
    active: Mutex<Option<ActiveRun>>,
}

impl StudioSession {
    /// Session streaming from the backend described by `config`.
    pub fn new(config: &StudioConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::with_transport(Arc::new(transport), config.idle_timeout))
    }

    pub fn with_transport(
        transport: Arc<dyn PipelineTransport>,
        idle_timeout: Option<Duration>,
    ) -> Self {
        let (slot, _) = watch::channel(None);
        Self {
            transport,
            idle_timeout,
            slot: Arc::new(slot),
            active: Mutex::new(None),
        }
    }

    /// Start a run for `input`, cancelling any run still in flight.
    ///
    /// Fails without touching the current run when `input` has no name.
    pub async fn start(&self, input: ProviderInput) -> Result<RunId> {
        let input = input.prepare()?;
        let mut active = self.active.lock().await;
        if let Some(previous) = active.take() {
            debug!(run_id = %previous.id, "Cancelling previous run");
            stop(previous);
        }

        let run = reduce(PipelineRun::new(input), RunEvent::Started);
        let id = run.id;
        self.slot.send_replace(Some(run.clone()));

        let cancel = CancellationToken::new();
        let task = tokio::spawn({
            let transport = Arc::clone(&self.transport);
            let slot = Arc::clone(&self.slot);
            let cancel = cancel.clone();
            let idle_timeout = self.idle_timeout;
            async move {
                pipeline::execute(transport.as_ref(), run, idle_timeout, &cancel, |run| {
                    publish(&slot, run)
                })
                .await;
            }
        });

        *active = Some(ActiveRun { id, cancel, task });
        Ok(id)
    }

    /// Cancel the in-flight run. Returns `false` when there was nothing to cancel.
    pub async fn cancel(&self) -> bool {
        let Some(current) = self.active.lock().await.take() else {
            return false;
        };
        let id = current.id;
        stop(current);
        self.slot.send_if_modified(|slot| match slot {
            Some(run) if run.id == id && !run.is_finished() => {
                *run = reduce(run.clone(), RunEvent::Cancelled);
                true
            }
            _ => false,
        })
    }

    /// Current state of the latest run.
    pub fn snapshot(&self) -> Option<PipelineRun> {
        self.slot.borrow().clone()
    }

    /// Receive every state change of the latest run.
    pub fn subscribe(&self) -> watch::Receiver<Option<PipelineRun>> {
        self.slot.subscribe()
    }

    /// Every state of the latest run, starting with the current one.
    ///
    /// Intermediate states may be skipped when the consumer falls behind;
    /// the most recent state is always delivered.
    pub fn updates(&self) -> impl Stream<Item = PipelineRun> + Send + 'static {
        WatchStream::new(self.slot.subscribe()).filter_map(futures::future::ready)
    }

    /// Wait until the latest run reaches a terminal status.
    ///
    /// Resolves early with the replacement run's state if another run is
    /// started meanwhile. Returns `None` when no run was ever started.
    pub async fn wait(&self) -> Option<PipelineRun> {
        let mut rx = self.subscribe();
        let id = rx.borrow().as_ref()?.id;
        let ready = rx
            .wait_for(|slot| match slot {
                Some(run) => run.id != id || run.is_finished(),
                None => true,
            })
            .await
            .ok()?;
        (*ready).clone()
    }
}

impl Drop for StudioSession {
    fn drop(&mut self) {
        if let Some(active) = self.active.get_mut().take() {
            stop(active);
        }
    }
}

fn stop(run: ActiveRun) {
    run.cancel.cancel();
    run.task.abort();
}

// Only the run currently in the slot may update it, and only until it finishes.
fn publish(slot: &RunSlot, run: &PipelineRun) {
    slot.send_if_modified(|current| match current {
        Some(existing) if existing.id == run.id && !existing.is_finished() => {
            *existing = run.clone();
            true
        }
        _ => false,
    });
}
