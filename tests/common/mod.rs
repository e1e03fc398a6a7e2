//! Shared test helpers and a scripted transport.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use pipeline_studio::error::{Result, StudioError};
use pipeline_studio::stream::{ChunkStream, PipelineTransport};
use pipeline_studio::types::ProviderInput;

pub const DONE: &str = "data: [DONE]\n\n";

/// A transport that replays queued chunk streams, one per `open` call.
#[derive(Default)]
pub struct ScriptedTransport {
    streams: Mutex<VecDeque<Result<ChunkStream>>>,
    requests: Mutex<Vec<ProviderInput>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response made of `chunks`, delivered in order.
    pub fn queue_chunks<I, S>(&self, chunks: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items: Vec<Result<String>> = chunks.into_iter().map(|c| Ok(c.into())).collect();
        self.queue_stream(Box::pin(futures::stream::iter(items)));
    }

    pub fn queue_stream(&self, stream: ChunkStream) {
        self.streams.lock().unwrap().push_back(Ok(stream));
    }

    /// Queue a failure to open the stream.
    pub fn queue_open_error(&self, error: StudioError) {
        self.streams.lock().unwrap().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<ProviderInput> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PipelineTransport for ScriptedTransport {
    async fn open(&self, input: &ProviderInput) -> Result<ChunkStream> {
        self.requests.lock().unwrap().push(input.clone());
        self.streams
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Box::pin(futures::stream::empty())))
    }
}

/// Encode `event` as one SSE frame.
pub fn frame(event: Value) -> String {
    format!("data: {event}\n\n")
}

pub fn tool_start(name: &str) -> String {
    frame(json!({ "type": "on_tool_start", "name": name }))
}

pub fn tool_end(name: &str) -> String {
    frame(json!({ "type": "on_tool_end", "name": name }))
}

pub fn chain_end(output: Value) -> String {
    frame(json!({ "type": "on_chain_end", "name": "LangGraph", "output": output }))
}

pub fn validation_frame() -> String {
    chain_end(json!({
        "validated_data": { "name": "Dr. Sarah Smith", "npi_valid": true },
        "npi_result": { "npi": "1234567890", "status": "active" },
        "google_result": { "google_address": "200 First St SW, Rochester, MN" },
    }))
}

pub fn enrichment_frame() -> String {
    chain_end(json!({ "enriched_data": { "phone": "507-284-2511", "board_certified": true } }))
}

pub fn quality_frame() -> String {
    chain_end(json!({ "quality_data": { "confidence_score": 0.92, "issues": [] } }))
}

pub fn directory_frame() -> String {
    chain_end(json!({
        "final_profile": { "name": "Dr. Sarah Smith", "specialty": "Cardiology" },
        "summary_report": { "status": "verified", "changes": 2 },
    }))
}

/// The full happy-path body: two tool calls, four stages, then the sentinel.
pub fn scenario_frames() -> Vec<String> {
    vec![
        tool_start("NPIRegistry"),
        validation_frame(),
        tool_start("WebSearch"),
        enrichment_frame(),
        quality_frame(),
        directory_frame(),
        DONE.to_string(),
    ]
}

pub fn scenario_body() -> String {
    scenario_frames().concat()
}

pub fn sarah_smith() -> ProviderInput {
    ProviderInput::builder()
        .name("Dr. Sarah Smith")
        .npi("1234567890")
        .build()
}
