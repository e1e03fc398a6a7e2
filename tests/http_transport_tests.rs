mod common;

use std::time::Duration;

use futures::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;
use pipeline_studio::config::StudioConfig;
use pipeline_studio::error::{ErrorCategory, StudioError};
use pipeline_studio::pipeline::execute;
use pipeline_studio::session::StudioSession;
use pipeline_studio::stream::{HttpTransport, PipelineTransport};
use pipeline_studio::types::{PipelineRun, ProviderInput, RunStatus};
use tokio_util::sync::CancellationToken;

fn config_for(server: &MockServer) -> StudioConfig {
    StudioConfig::new()
        .with_base_url(server.uri())
        .with_idle_timeout(Some(Duration::from_secs(5)))
}

fn event_stream(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/event-stream")
}

#[tokio::test]
async fn posts_the_provider_and_streams_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/run-stream"))
        .and(header("accept", "text/event-stream"))
        .and(body_json(json!({ "name": "Dr. Sarah Smith", "npi": "1234567890" })))
        .respond_with(event_stream(scenario_body()))
        .expect(1)
        .mount(&server)
        .await;

    let session = StudioSession::new(&config_for(&server)).unwrap();
    session.start(sarah_smith()).await.unwrap();
    let run = session.wait().await.unwrap();

    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.current_step(), 5);
    assert_eq!(
        run.stage_results.summary_report,
        Some(json!({ "status": "verified", "changes": 2 }))
    );
    assert_eq!(run.log.len(), 8);
}

#[tokio::test]
async fn server_error_detail_fails_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/run-stream"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "detail": "Agent graph crashed" })),
        )
        .mount(&server)
        .await;

    let session = StudioSession::new(&config_for(&server)).unwrap();
    session.start(sarah_smith()).await.unwrap();
    let run = session.wait().await.unwrap();

    assert_eq!(run.status, RunStatus::Failed);
    assert_eq!(run.current_step(), 1);
    assert_eq!(
        run.error.as_deref(),
        Some("API error (status 500): Agent graph crashed")
    );
}

#[tokio::test]
async fn open_returns_api_error_for_rejected_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(422).set_body_string("name: field required"))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(&config_for(&server)).unwrap();
    let err = match transport.open(&ProviderInput::new("x")).await {
        Ok(_) => panic!("expected the request to be rejected"),
        Err(err) => err,
    };

    match err {
        StudioError::Api { status, ref message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "name: field required");
        }
        ref other => panic!("unexpected error: {other:?}"),
    }
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn slow_response_headers_hit_the_idle_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/run-stream"))
        .respond_with(event_stream(scenario_body()).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(&config_for(&server)).unwrap();
    let run = tokio::time::timeout(
        Duration::from_secs(2),
        execute(
            &transport,
            PipelineRun::new(sarah_smith()),
            Some(Duration::from_millis(200)),
            &CancellationToken::new(),
            |_| {},
        ),
    )
    .await
    .expect("run should give up before the response arrives");

    assert_eq!(run.status, RunStatus::Failed);
    assert_eq!(run.error.as_deref(), Some("Stream idle for 200ms"));
    assert_eq!(run.current_step(), 1);
    assert!(run.stage_results.validation.is_none());
}

#[tokio::test]
async fn custom_stream_path_is_used() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/pipeline"))
        .respond_with(event_stream(directory_frame() + DONE))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server).with_stream_path("v2/pipeline");
    let transport = HttpTransport::new(&config).unwrap();
    assert_eq!(transport.url(), format!("{}/v2/pipeline", server.uri()));

    let chunks = transport.open(&ProviderInput::new("x")).await.unwrap();
    let body: Vec<String> = chunks.map(|chunk| chunk.unwrap()).collect().await;
    assert_eq!(body.concat(), directory_frame() + DONE);
}

#[tokio::test]
async fn unreachable_backend_fails_with_a_transport_error() {
    let config = StudioConfig::new()
        .with_base_url("http://127.0.0.1:1")
        .with_connect_timeout(Duration::from_secs(1));

    let transport = HttpTransport::new(&config).unwrap();
    let err = match transport.open(&ProviderInput::new("x")).await {
        Ok(_) => panic!("expected a connection failure"),
        Err(err) => err,
    };
    assert_eq!(err.category(), ErrorCategory::Transport);

    let session = StudioSession::new(&config).unwrap();
    session.start(ProviderInput::new("x")).await.unwrap();
    let run = session.wait().await.unwrap();
    assert_eq!(run.status, RunStatus::Failed);
    assert!(run.error.is_some());
}

#[test]
fn invalid_base_url_is_rejected() {
    let config = StudioConfig::new().with_base_url("localhost:8000");
    let err = HttpTransport::new(&config).unwrap_err();
    assert!(matches!(err, StudioError::Configuration(_)));
}
