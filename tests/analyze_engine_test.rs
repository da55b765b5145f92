mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use reqwest::Method;
use secrecy::SecretString;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use common::*;
use rusty_cu_runner::models::{AccessToken, OperationStatus, TokenCredential};
use rusty_cu_runner::{ContentUnderstandingError, Credentials, PollOptions};

const ANALYZE_URL: &str = "https://test-resource.services.ai.azure.com/contentunderstanding/analyzers/invoices:analyze?api-version=2024-12-01-preview";

/// Two-second interval; waits are virtual under the paused clock.
fn default_poll() -> PollOptions {
    PollOptions::default()
}

#[tokio::test(start_paused = true)]
async fn given_no_operation_location_when_analyzing_then_returns_body_after_one_call() {
    let transport = MockTransport::scripted(vec![succeeded("# Direct")]);
    let client = client(transport.clone());

    let result = client
        .analyze_url("invoices", "https://example.com/a.pdf", &default_poll())
        .await
        .unwrap();

    assert!(result.is_succeeded());
    assert_eq!(result.contents()[0].markdown.as_deref(), Some("# Direct"));
    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::POST);
    assert_eq!(requests[0].url, ANALYZE_URL);
    assert_eq!(requests[0].body, Some(json!({"url": "https://example.com/a.pdf"})));
    assert_eq!(requests[0].headers["ocp-apim-subscription-key"], TEST_API_KEY);
}

#[tokio::test(start_paused = true)]
async fn given_running_running_succeeded_when_polling_then_submits_once_and_polls_three_times() {
    let transport = MockTransport::scripted(vec![
        accepted(),
        status("Running"),
        status("Running"),
        succeeded("# Done"),
    ]);
    let client = client(transport.clone());
    let started = tokio::time::Instant::now();

    let result = client
        .analyze_url("invoices", "https://example.com/a.pdf", &default_poll())
        .await
        .unwrap();

    assert_eq!(result.status, OperationStatus::Succeeded);
    assert!(started.elapsed() >= Duration::from_secs(6));
    let requests = transport.requests();
    assert_eq!(requests.len(), 4);
    assert_eq!(requests[0].method, Method::POST);
    for poll in &requests[1..] {
        assert_eq!(poll.method, Method::GET);
        assert_eq!(poll.url, OPERATION_URL);
        assert_eq!(poll.headers["ocp-apim-subscription-key"], TEST_API_KEY);
        assert!(poll.body.is_none());
    }
}

#[tokio::test(start_paused = true)]
async fn given_failed_terminal_status_when_polling_then_returns_error_as_data() {
    let transport = MockTransport::scripted(vec![
        accepted(),
        json_response(
            200,
            json!({
                "id": "op-1",
                "status": "Failed",
                "error": {"code": "InvalidContentLength", "message": "too large"}
            }),
        ),
    ]);
    let client = client(transport.clone());

    let result = client
        .analyze_url("invoices", "https://example.com/a.pdf", &default_poll())
        .await
        .unwrap();

    assert_eq!(result.status, OperationStatus::Failed);
    assert_eq!(result.error.unwrap().code, "InvalidContentLength");
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn given_unknown_status_when_polling_then_keeps_polling_until_terminal() {
    let transport = MockTransport::scripted(vec![accepted(), status("Queued"), status("Canceled")]);
    let client = client(transport.clone());

    let result = client
        .analyze_url("invoices", "https://example.com/a.pdf", &default_poll())
        .await
        .unwrap();

    assert_eq!(result.status, OperationStatus::Canceled);
    assert_eq!(transport.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn given_bad_request_on_submit_when_analyzing_then_raises_service_error_with_body() {
    let transport = MockTransport::scripted(vec![json_response(
        400,
        json!({"error": {"code": "InvalidRequest", "message": "url is not reachable"}}),
    )]);
    let client = client(transport.clone());

    let err = client
        .analyze_url("invoices", "https://example.com/a.pdf", &default_poll())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert!(err.body().unwrap().contains("\"InvalidRequest\""));
    assert_eq!(err.error_code().as_deref(), Some("InvalidRequest"));
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn given_server_error_while_polling_when_analyzing_then_aborts_without_retry() {
    let transport = MockTransport::scripted(vec![
        accepted(),
        json_response(503, json!({"error": {"code": "ServiceUnavailable"}})),
    ]);
    let client = client(transport.clone());

    let err = client
        .analyze_url("invoices", "https://example.com/a.pdf", &default_poll())
        .await
        .unwrap_err();

    assert!(matches!(err, ContentUnderstandingError::Service { status: 503, .. }));
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn given_blank_analyzer_id_or_url_when_analyzing_then_fails_before_any_request() {
    let transport = MockTransport::scripted(vec![]);
    let client = client(transport.clone());

    let blank_id = client
        .analyze_url("  ", "https://example.com/a.pdf", &default_poll())
        .await
        .unwrap_err();
    let blank_url = client.analyze_url("invoices", "", &default_poll()).await.unwrap_err();
    let empty_data = client
        .analyze_data("invoices", b"", "application/pdf", &default_poll())
        .await
        .unwrap_err();

    assert!(matches!(blank_id, ContentUnderstandingError::Validation(_)));
    assert!(matches!(blank_url, ContentUnderstandingError::Validation(_)));
    assert!(matches!(empty_data, ContentUnderstandingError::Validation(_)));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn given_cancellation_during_poll_wait_when_analyzing_then_no_further_requests() {
    let transport = MockTransport::scripted(vec![accepted(), status("Running")]);
    let client = client(transport.clone());
    let cancel = CancellationToken::new();
    let options = PollOptions::default()
        .with_interval(Duration::from_secs(10))
        .with_cancellation(cancel.clone());

    let task = tokio::spawn({
        let client = client.clone();
        async move {
            client
                .analyze_url("invoices", "https://example.com/a.pdf", &options)
                .await
        }
    });
    tokio::time::sleep(Duration::from_millis(500)).await;
    cancel.cancel();

    let outcome = task.await.unwrap();

    assert!(matches!(outcome, Err(ContentUnderstandingError::Cancelled)));
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn given_cancellation_after_a_poll_when_looping_then_stops_before_next_request() {
    let cancel = CancellationToken::new();
    let cancel_on_poll = cancel.clone();
    let transport = MockTransport::new(move |_, index| match index {
        0 => accepted(),
        _ => {
            cancel_on_poll.cancel();
            status("Running")
        }
    });
    let client = client(transport.clone());
    let options = default_poll().with_cancellation(cancel);

    let outcome = client
        .analyze_url("invoices", "https://example.com/a.pdf", &options)
        .await;

    assert!(matches!(outcome, Err(ContentUnderstandingError::Cancelled)));
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn given_local_file_when_analyzing_then_sends_base64_data_with_extension_mime_type() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scan.PDF");
    std::fs::write(&path, b"%PDF-1.7").unwrap();
    let transport = MockTransport::scripted(vec![succeeded("# Scan")]);
    let client = client(transport.clone());

    let result = client
        .analyze_document_from_file(&path, &default_poll())
        .await
        .unwrap();

    assert!(result.is_succeeded());
    let request = &transport.requests()[0];
    assert!(request.url.contains("/analyzers/prebuilt-documentAnalyzer:analyze"));
    assert_eq!(
        request.body,
        Some(json!({
            "data": general_purpose::STANDARD.encode(b"%PDF-1.7"),
            "mimeType": "application/pdf"
        }))
    );
}

#[tokio::test(start_paused = true)]
async fn given_missing_file_when_analyzing_then_reports_file_not_found_without_requests() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.png");
    let transport = MockTransport::scripted(vec![]);
    let client = client(transport.clone());

    let err = client
        .analyze_image_from_file(&missing, &default_poll())
        .await
        .unwrap_err();

    assert!(matches!(err, ContentUnderstandingError::FileNotFound(ref p) if *p == missing));
    assert_eq!(transport.call_count(), 0);
}

struct SequenceCredential {
    issued: Mutex<u32>,
}

#[async_trait]
impl TokenCredential for SequenceCredential {
    async fn get_token(
        &self,
        _scopes: &[&str],
        _cancel: &CancellationToken,
    ) -> anyhow::Result<AccessToken> {
        let mut issued = self.issued.lock().unwrap();
        *issued += 1;
        Ok(AccessToken {
            token: SecretString::from(format!("t{issued}")),
            expires_on: None,
        })
    }
}

#[tokio::test(start_paused = true)]
async fn given_token_credential_when_polling_then_each_request_carries_a_fresh_bearer_token() {
    let transport = MockTransport::scripted(vec![accepted(), status("Running"), succeeded("ok")]);
    let credential = Arc::new(SequenceCredential {
        issued: Mutex::new(0),
    });
    let client = client_with(
        Credentials::with_token_credential(ENDPOINT, credential),
        transport.clone(),
    );

    client
        .analyze_url("invoices", "https://example.com/a.pdf", &default_poll())
        .await
        .unwrap();

    let tokens: Vec<String> = transport
        .requests()
        .iter()
        .map(|r| r.headers["authorization"].to_str().unwrap().to_string())
        .collect();
    assert_eq!(tokens, vec!["Bearer t1", "Bearer t2", "Bearer t3"]);
    assert!(
        transport
            .requests()
            .iter()
            .all(|r| r.headers.get("ocp-apim-subscription-key").is_none())
    );
}

#[tokio::test(start_paused = true)]
async fn given_prebuilt_url_wrapper_when_analyzing_then_targets_fixed_analyzer() {
    let transport = MockTransport::scripted(vec![succeeded("# Video")]);
    let client = client(transport.clone());

    client
        .analyze_video_from_url("https://example.com/clip.mp4", &default_poll())
        .await
        .unwrap();

    assert!(
        transport.requests()[0]
            .url
            .contains("/analyzers/prebuilt-videoAnalyzer:analyze?api-version=")
    );
}
