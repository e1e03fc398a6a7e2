//! Run state machine: folds stream events into a [`PipelineRun`].
//!
//! [`reduce`] is the only place a run changes. It routes each event to the
//! aggregator, the progress tracker and the log; none of them reads the log.

pub mod aggregator;
pub mod driver;
pub mod log;
pub mod progress;

pub use driver::execute;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::StudioError;
use crate::stream::MalformedFrame;
use crate::types::{EventKind, PipelineRun, RunStatus, StreamEvent};

/// Everything that can happen to a run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// The run was submitted.
    Started,
    /// A decoded event frame.
    Stream(StreamEvent),
    /// A frame that could not be decoded.
    Malformed(MalformedFrame),
    /// The terminal sentinel.
    Done,
    /// The response ended without the terminal sentinel.
    Closed,
    /// The transport failed.
    Failed(String),
    Cancelled,
}

/// Apply `event` to `run`.
///
/// Events before [`RunEvent::Started`] and after a terminal status are ignored,
/// as is a repeated `Started`.
pub fn reduce(mut run: PipelineRun, event: RunEvent) -> PipelineRun {
    if run.status.is_terminal() {
        debug!(run_id = %run.id, status = ?run.status, "Ignoring event for finished run");
        return run;
    }
    if run.status == RunStatus::Idle && event != RunEvent::Started {
        return run;
    }

    match event {
        RunEvent::Started if run.status == RunStatus::Idle => start(&mut run),
        RunEvent::Started => {}
        RunEvent::Stream(event) => apply_stream_event(&mut run, event),
        RunEvent::Malformed(frame) => {
            let error = StudioError::malformed(frame.data, frame.reason);
            warn!(run_id = %run.id, %error, "Skipping frame");
            run.log.push(log::skipped(&error));
        }
        RunEvent::Done => {
            if run.stage_results.is_complete() {
                finish(&mut run, RunStatus::Completed);
                run.log.push(log::RUN_COMPLETED);
            } else {
                fail(&mut run, StudioError::Incomplete.to_string());
            }
        }
        RunEvent::Closed => fail(&mut run, StudioError::ConnectionClosed.to_string()),
        RunEvent::Failed(message) => fail(&mut run, message),
        RunEvent::Cancelled => {
            finish(&mut run, RunStatus::Cancelled);
            run.log.push(log::RUN_CANCELLED);
        }
    }
    run
}

fn start(run: &mut PipelineRun) {
    run.status = RunStatus::Running;
    run.started_at = Some(Utc::now());
    run.progress.start();
    run.log.push(log::run_started(&run.input.name));
}

fn apply_stream_event(run: &mut PipelineRun, event: StreamEvent) {
    let tool = event.name.as_deref().unwrap_or("unknown");
    match event.kind {
        EventKind::OnToolStart => run.log.push(log::tool_started(tool)),
        EventKind::OnToolEnd => run.log.push(log::tool_finished(tool)),
        EventKind::OnChainEnd => {
            for stage in aggregator::aggregate(&mut run.stage_results, &event) {
                run.progress.observe(stage);
                debug!(run_id = %run.id, %stage, step = run.progress.step(), "Stage completed");
                run.log.push(log::stage_completed(stage));
            }
        }
        EventKind::Error => {
            let message = event
                .message
                .unwrap_or_else(|| "backend reported an unknown error".to_string());
            fail(run, StudioError::Backend(message).to_string());
        }
        EventKind::OnChainStart | EventKind::Other => {}
    }
}

fn fail(run: &mut PipelineRun, message: String) {
    warn!(run_id = %run.id, error = %message, "Pipeline run failed");
    run.log.push(log::run_failed(&message));
    run.error = Some(message);
    finish(run, RunStatus::Failed);
}

fn finish(run: &mut PipelineRun, status: RunStatus) {
    info!(run_id = %run.id, ?status, step = run.progress.step(), "Pipeline run finished");
    run.status = status;
    run.finished_at = Some(Utc::now());
}
