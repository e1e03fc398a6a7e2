//! Read loop: transport chunks → frames → reducer.

use std::time::Duration;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{reduce, RunEvent};
use crate::stream::{Frame, FrameParser, PipelineTransport};
use crate::types::PipelineRun;
use crate::util::timeout::with_idle_timeout;

/// Drive `run` to a terminal status.
///
/// `on_update` sees every intermediate state, in order. Chunks are handled one
/// at a time; once `cancel` fires no further event reaches the run.
/// `idle_timeout` bounds both the wait for the response and each chunk wait.
pub async fn execute<F>(
    transport: &dyn PipelineTransport,
    run: PipelineRun,
    idle_timeout: Option<Duration>,
    cancel: &CancellationToken,
    mut on_update: F,
) -> PipelineRun
where
    F: FnMut(&PipelineRun),
{
    let mut run = reduce(run, RunEvent::Started);
    on_update(&run);
    debug!(run_id = %run.id, provider = %run.input.name, "Pipeline run started");

    // The wait for response headers counts against the idle timeout too.
    let opened = tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        opened = with_idle_timeout(idle_timeout, transport.open(&run.input)) => Some(opened),
    };
    let mut chunks = match opened {
        None => return step(run, RunEvent::Cancelled, &mut on_update),
        Some(Ok(Ok(chunks))) => chunks,
        Some(Ok(Err(err)) | Err(err)) => {
            return step(run, RunEvent::Failed(err.to_string()), &mut on_update)
        }
    };

    let mut parser = FrameParser::new();
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            next = with_idle_timeout(idle_timeout, chunks.next()) => Some(next),
        };
        let (frames, ended) = match next {
            None => return step(run, RunEvent::Cancelled, &mut on_update),
            Some(Err(timeout)) => {
                return step(run, RunEvent::Failed(timeout.to_string()), &mut on_update)
            }
            Some(Ok(Some(Err(err)))) => {
                return step(run, RunEvent::Failed(err.to_string()), &mut on_update)
            }
            Some(Ok(Some(Ok(chunk)))) => (parser.push(&chunk), false),
            Some(Ok(None)) => (parser.finish(), true),
        };

        for frame in frames {
            if cancel.is_cancelled() {
                return step(run, RunEvent::Cancelled, &mut on_update);
            }
            let event = match frame {
                Frame::Event(event) => RunEvent::Stream(event),
                Frame::Malformed(frame) => {
                    debug!(run_id = %run.id, data = %frame.data, "Malformed frame");
                    RunEvent::Malformed(frame)
                }
                Frame::Done => RunEvent::Done,
            };
            run = step(run, event, &mut on_update);
            if run.is_finished() {
                return run;
            }
        }

        if ended {
            debug!(run_id = %run.id, "Stream closed without terminal sentinel");
            return step(run, RunEvent::Closed, &mut on_update);
        }
    }
}

fn step<F>(run: PipelineRun, event: RunEvent, on_update: &mut F) -> PipelineRun
where
    F: FnMut(&PipelineRun),
{
    let run = reduce(run, event);
    on_update(&run);
    run
}
