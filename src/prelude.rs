//! Convenience re-exports for common use.

pub use crate::config::StudioConfig;
pub use crate::error::{Result, StudioError};
pub use crate::pipeline::{reduce, RunEvent};
pub use crate::session::StudioSession;
pub use crate::stream::{HttpTransport, PipelineTransport};
pub use crate::types::{
    EventKind, LogEntry, PipelineRun, ProviderInput, RunId, RunStatus, Stage, StageOutput,
    StageResults, StreamEvent,
};
