//! Result Aggregator: folds stage payloads into [`StageResults`].

use chrono::Utc;
use serde_json::Value;

use crate::types::{Stage, StageOutput, StageResults, StreamEvent};

/// Apply every stage payload carried by `event`.
///
/// Returns the stages that were written, in pipeline order. Events other than
/// `on_chain_end`, and outputs with no stage marker, change nothing.
pub fn aggregate(results: &mut StageResults, event: &StreamEvent) -> Vec<Stage> {
    event
        .stage_outputs()
        .into_iter()
        .map(|output| {
            let stage = output.stage();
            apply(results, output);
            stage
        })
        .collect()
}

/// Overwrite the slot of `output`'s stage. Earlier payloads are discarded, not merged.
pub fn apply(results: &mut StageResults, output: StageOutput) {
    match output {
        StageOutput::Validation {
            validated_data,
            npi_result,
            google_result,
        } => {
            results.validation = Some(with_lookups(validated_data, npi_result, google_result));
        }
        StageOutput::Enrichment { enriched_data } => {
            results.enrichment = Some(enriched_data);
        }
        StageOutput::Quality { quality_data } => {
            results.quality = Some(quality_data);
        }
        StageOutput::Directory {
            final_profile,
            summary_report,
        } => {
            results.directory = Some(final_profile);
            results.summary_report = summary_report;
            results.completed_at = Some(Utc::now());
        }
    }
}

// Raw registry/search lookups arrive next to `validated_data` and are stored inside it.
// A non-object payload is kept as-is.
fn with_lookups(validated: Value, npi_result: Option<Value>, google_result: Option<Value>) -> Value {
    match validated {
        Value::Object(mut map) => {
            if let Some(npi) = npi_result {
                map.insert("npi_result".into(), npi);
            }
            if let Some(google) = google_result {
                map.insert("google_result".into(), google);
            }
            Value::Object(map)
        }
        other => other,
    }
}
