//! HTTP client construction and response status mapping.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};

use crate::config::StudioConfig;
use crate::error::{Result, StudioError};

/// Build a client for streaming requests.
///
/// No overall request timeout is set: a run's response stays open for as long
/// as the pipeline runs. Stalls are caught by the per-chunk idle timeout.
pub fn build_client(config: &StudioConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(config.connect_timeout)
        .pool_max_idle_per_host(4)
        .build()
        .map_err(StudioError::from)
}

/// Headers for a JSON request expecting an event stream back.
pub fn stream_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
    headers
}

/// Turn a non-success status and its body into an error.
pub fn status_to_error(status: u16, body: &str) -> StudioError {
    let message = extract_detail(body).unwrap_or_else(|| {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            "Failed to start pipeline".to_string()
        } else {
            trimmed.to_string()
        }
    });
    StudioError::api(status, message)
}

fn extract_detail(body: &str) -> Option<String> {
    // Validation errors carry a list under `detail`; plain errors carry a string.
    let value = serde_json::from_str::<serde_json::Value>(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
