//! Log Sink: an append-only, timestamped record of what a run did.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::StudioError;
use crate::types::{LogEntry, Stage};

/// Append-only list of log lines.
///
/// There is no way to remove or reorder entries once pushed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunLog {
    entries: Vec<LogEntry>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line stamped with the current time.
    pub fn push(&mut self, text: impl Into<String>) {
        self.entries.push(LogEntry {
            text: text.into(),
            timestamp: Utc::now(),
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Just the text of each line.
    pub fn lines(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.text.as_str()).collect()
    }
}

pub(crate) fn run_started(provider: &str) -> String {
    format!("Starting pipeline for {provider}...")
}

pub(crate) fn tool_started(tool: &str) -> String {
    format!("Running tool: {tool}...")
}

pub(crate) fn tool_finished(tool: &str) -> String {
    format!("Tool {tool} finished.")
}

pub(crate) fn stage_completed(stage: Stage) -> String {
    format!("{} completed.", stage.agent_name())
}

pub(crate) fn skipped(error: &StudioError) -> String {
    format!("Skipped: {error}")
}

pub(crate) const RUN_COMPLETED: &str = "Pipeline completed.";
pub(crate) const RUN_CANCELLED: &str = "Run cancelled.";

pub(crate) fn run_failed(message: &str) -> String {
    format!("Error: {message}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_keep_insertion_order_and_timestamps() {
        let mut log = RunLog::new();
        log.push("first");
        log.push(tool_started("NPIRegistry"));
        log.push(stage_completed(Stage::Quality));

        assert_eq!(
            log.lines(),
            vec!["first", "Running tool: NPIRegistry...", "QA Agent completed."]
        );
        let stamps: Vec<_> = log.iter().map(|e| e.timestamp).collect();
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn skipped_line_carries_the_error_message() {
        let error = StudioError::malformed("{\"type\":", "EOF while parsing an object");
        assert_eq!(skipped(&error), "Skipped: Malformed event: EOF while parsing an object");
    }

    #[test]
    fn serializes_as_a_plain_list() {
        let mut log = RunLog::new();
        log.push("only");
        let value = serde_json::to_value(&log).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(1));
        assert_eq!(value[0]["text"], "only");
    }
}
