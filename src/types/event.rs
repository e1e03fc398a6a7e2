//! Events carried by the pipeline's SSE stream.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumIter, EnumString};

/// Kind of a streamed event, from the event's `type` field.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    OnToolStart,
    OnToolEnd,
    OnChainStart,
    OnChainEnd,
    /// The backend failed mid-run; `message` carries the reason.
    Error,
    /// Anything else. Carried through but never acted on.
    #[default]
    #[serde(other)]
    Other,
}

/// One decoded event frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    #[serde(rename = "type", default)]
    pub kind: EventKind,
    /// Tool or chain identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Stage payload; meaningful on `on_chain_end` only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StreamEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            name: None,
            output: None,
            message: None,
        }
    }

    pub fn tool_start(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(EventKind::OnToolStart)
        }
    }

    pub fn tool_end(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(EventKind::OnToolEnd)
        }
    }

    pub fn chain_end(output: Value) -> Self {
        Self {
            output: Some(output),
            ..Self::new(EventKind::OnChainEnd)
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::new(EventKind::Error)
        }
    }

    /// Stage outputs carried by this event, in pipeline order.
    ///
    /// Empty for anything but an `on_chain_end` event with a recognized payload.
    pub fn stage_outputs(&self) -> Vec<StageOutput> {
        match (&self.kind, &self.output) {
            (EventKind::OnChainEnd, Some(output)) => StageOutput::extract(output),
            _ => Vec::new(),
        }
    }
}

/// The four pipeline stages.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
    EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    Validation,
    Enrichment,
    Quality,
    Directory,
}

impl Stage {
    /// Progress step reached once this stage has completed.
    pub fn step(self) -> u8 {
        match self {
            Self::Validation => 2,
            Self::Enrichment => 3,
            Self::Quality => 4,
            Self::Directory => 5,
        }
    }

    /// Name of the agent that runs this stage.
    pub fn agent_name(self) -> &'static str {
        match self {
            Self::Validation => "Validation Agent",
            Self::Enrichment => "Enrichment Agent",
            Self::Quality => "QA Agent",
            Self::Directory => "Directory Agent",
        }
    }

    /// Key in an `on_chain_end` output that marks this stage as complete.
    pub fn marker_key(self) -> &'static str {
        match self {
            Self::Validation => "validated_data",
            Self::Enrichment => "enriched_data",
            Self::Quality => "quality_data",
            Self::Directory => "final_profile",
        }
    }
}

/// A recognized stage payload.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutput {
    Validation {
        validated_data: Value,
        npi_result: Option<Value>,
        google_result: Option<Value>,
    },
    Enrichment {
        enriched_data: Value,
    },
    Quality {
        quality_data: Value,
    },
    Directory {
        final_profile: Value,
        summary_report: Option<Value>,
    },
}

impl StageOutput {
    pub fn stage(&self) -> Stage {
        match self {
            Self::Validation { .. } => Stage::Validation,
            Self::Enrichment { .. } => Stage::Enrichment,
            Self::Quality { .. } => Stage::Quality,
            Self::Directory { .. } => Stage::Directory,
        }
    }

    /// Every stage marker present in `output`, in pipeline order.
    ///
    /// A marker counts as present when its key exists and is not `null`.
    pub fn extract(output: &Value) -> Vec<StageOutput> {
        let Some(map) = output.as_object() else {
            return Vec::new();
        };
        let present = |key: &str| map.get(key).filter(|v| !v.is_null()).cloned();

        let mut stages = Vec::new();
        if let Some(validated_data) = present(Stage::Validation.marker_key()) {
            stages.push(Self::Validation {
                validated_data,
                npi_result: present("npi_result"),
                google_result: present("google_result"),
            });
        }
        if let Some(enriched_data) = present(Stage::Enrichment.marker_key()) {
            stages.push(Self::Enrichment { enriched_data });
        }
        if let Some(quality_data) = present(Stage::Quality.marker_key()) {
            stages.push(Self::Quality { quality_data });
        }
        if let Some(final_profile) = present(Stage::Directory.marker_key()) {
            stages.push(Self::Directory {
                final_profile,
                summary_report: present("summary_report"),
            });
        }
        stages
    }
}
