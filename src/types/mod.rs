//! Core types for pipeline-studio.

pub mod provider;
pub mod event;
pub mod run;

pub use provider::*;
pub use event::*;
pub use run::*;
