//! Progress Tracker: the step index shown while a run is in flight.

use serde::{Deserialize, Serialize};

use crate::types::Stage;

/// Step of a submitted run that has no completed stage yet.
pub const STARTED_STEP: u8 = 1;
/// Step of a run whose directory stage has completed.
pub const FINAL_STEP: u8 = 5;

/// Monotonic step in `0..=5`. Requests to move backwards are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressTracker {
    step: u8,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> u8 {
        self.step
    }

    pub fn start(&mut self) -> bool {
        self.advance_to(STARTED_STEP)
    }

    /// Record that `stage` has completed.
    pub fn observe(&mut self, stage: Stage) -> bool {
        self.advance_to(stage.step())
    }

    /// Move to `step` if it is ahead of the current one. Returns whether it moved.
    pub fn advance_to(&mut self, step: u8) -> bool {
        let step = step.min(FINAL_STEP);
        if step <= self.step {
            return false;
        }
        self.step = step;
        true
    }

    pub fn is_complete(&self) -> bool {
        self.step == FINAL_STEP
    }
}
