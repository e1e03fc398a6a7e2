//! pipeline-studio: streaming client for the provider-data agent pipeline.
//!
//! Submits a provider record to the backend, consumes the run's
//! server-sent-event stream, and keeps a [`PipelineRun`](types::PipelineRun)
//! up to date: per-stage results (validation, enrichment, quality, directory),
//! a step index from 0 to 5, and an append-only log.
//!
//! # Quick Start
//!
//! ```no_run
//! use pipeline_studio::prelude::*;
//!
//! # async fn example() -> pipeline_studio::error::Result<()> {
//! let session = StudioSession::new(StudioConfig::global())?;
//! session
//!     .start(ProviderInput::builder().name("Dr. Sarah Smith").npi("1234567890").build())
//!     .await?;
//! if let Some(run) = session.wait().await {
//!     println!("{:?} at step {}", run.status, run.current_step());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod prelude;
pub mod session;
pub mod stream;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
