#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::{Method, StatusCode, header::HeaderMap};
use serde_json::{Value, json};

use rusty_cu_runner::clients::{HttpRequest, HttpResponse, HttpTransport};
use rusty_cu_runner::{ClientOptions, ContentUnderstandingClient, Credentials, Result};

pub const ENDPOINT: &str = "https://test-resource.services.ai.azure.com";
pub const OPERATION_URL: &str =
    "https://test-resource.services.ai.azure.com/contentunderstanding/analyzerResults/op-1?api-version=2024-12-01-preview";
pub const TEST_API_KEY: &str = "test-api-key";

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

type Handler = Box<dyn Fn(&RecordedRequest, usize) -> HttpResponse + Send + Sync>;

/// Transport double that records every request and answers from a handler.
pub struct MockTransport {
    handler: Handler,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new(
        handler: impl Fn(&RecordedRequest, usize) -> HttpResponse + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Answers with `responses` in order.
    pub fn scripted(responses: Vec<HttpResponse>) -> Arc<Self> {
        let queue = Mutex::new(VecDeque::from(responses));
        Self::new(move |request, _| {
            queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| panic!("unexpected request: {} {}", request.method, request.url))
        })
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let recorded = RecordedRequest {
            method: request.method,
            url: request.url,
            headers: request.headers,
            body: request
                .body
                .map(|bytes| serde_json::from_slice(&bytes).expect("request body is json")),
        };
        let index = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(recorded.clone());
            requests.len() - 1
        };
        Ok((self.handler)(&recorded, index))
    }
}

pub fn client_with(credentials: Credentials, transport: Arc<MockTransport>) -> ContentUnderstandingClient {
    ContentUnderstandingClient::with_transport(credentials, ClientOptions::default(), transport)
        .expect("should build client")
}

pub fn client(transport: Arc<MockTransport>) -> ContentUnderstandingClient {
    client_with(Credentials::with_key(ENDPOINT, TEST_API_KEY), transport)
}

pub fn json_response(status: u16, body: Value) -> HttpResponse {
    HttpResponse::new(
        StatusCode::from_u16(status).expect("valid status"),
        body.to_string(),
    )
}

/// 202 pointing at [`OPERATION_URL`].
pub fn accepted() -> HttpResponse {
    json_response(202, json!({"id": "op-1", "status": "NotStarted"}))
        .with_header("operation-location", OPERATION_URL)
}

pub fn status(status: &str) -> HttpResponse {
    json_response(200, json!({"id": "op-1", "status": status}))
}

pub fn succeeded(markdown: &str) -> HttpResponse {
    json_response(
        200,
        json!({
            "id": "op-1",
            "status": "Succeeded",
            "result": {
                "analyzerId": "prebuilt-documentAnalyzer",
                "apiVersion": "2024-12-01-preview",
                "createdAt": "2024-12-01T00:00:00Z",
                "contents": [{"markdown": markdown, "kind": "document"}]
            }
        }),
    )
}

pub fn no_content() -> HttpResponse {
    HttpResponse::new(StatusCode::NO_CONTENT, Vec::new())
}
