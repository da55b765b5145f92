use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, Method, StatusCode,
    header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::error::{ContentUnderstandingError, Result};

pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

/// A response whose body has already been read in full.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Sends one HTTP request. Implementations must be safe to share between
/// concurrent submissions.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ContentUnderstandingError::transport)?;
        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(ContentUnderstandingError::transport)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(ContentUnderstandingError::transport)?
            .to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn with_json<T: Serialize>(mut self, value: &T) -> Result<Self> {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = Some(encode(value)?);
        Ok(self)
    }
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Adds a header; names are case-insensitive and invalid pairs are skipped.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Turns a non-2xx response into [`ContentUnderstandingError::Service`]
/// carrying the status and the raw body.
pub fn ensure_success(response: HttpResponse, operation: &str) -> Result<HttpResponse> {
    if response.status.is_success() {
        return Ok(response);
    }
    let status = response.status;
    let body = response.text();
    debug!(
        operation = operation,
        status_code = status.as_u16(),
        "Service rejected request"
    );
    Err(ContentUnderstandingError::Service {
        message: format!(
            "{operation} failed: {}",
            status.canonical_reason().unwrap_or("unexpected status")
        ),
        status: status.as_u16(),
        body,
    })
}

/// Serializes a wire type. Naming and null omission are declared on the
/// type itself with serde attributes.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|source| ContentUnderstandingError::Decode {
        context: "request body",
        source,
    })
}

pub fn decode<T: DeserializeOwned>(response: &HttpResponse, context: &'static str) -> Result<T> {
    serde_json::from_slice(&response.body)
        .map_err(|source| ContentUnderstandingError::Decode { context, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_bad_request_when_ensuring_success_then_keeps_status_and_body() {
        let response = HttpResponse::new(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"code":"InvalidRequest","message":"nope"}}"#,
        );

        let err = ensure_success(response, "analyze").unwrap_err();

        assert_eq!(err.status(), Some(400));
        assert!(err.body().unwrap().contains("InvalidRequest"));
        assert_eq!(err.to_string(), "analyze failed: Bad Request (status 400)");
    }

    #[test]
    fn given_created_response_when_ensuring_success_then_passes_through() {
        let response = HttpResponse::new(StatusCode::CREATED, "{}");

        assert!(ensure_success(response, "create analyzer").is_ok());
    }

    #[test]
    fn given_mixed_case_header_name_when_building_response_then_reads_back_lowercase() {
        let response = HttpResponse::new(StatusCode::ACCEPTED, "{}")
            .with_header("Operation-Location", "https://res/op-1")
            .with_header("bad header", "ignored");

        assert_eq!(response.header("operation-location"), Some("https://res/op-1"));
        assert_eq!(response.headers.len(), 1);
    }

    #[test]
    fn given_mismatched_body_when_decoding_then_reports_context() {
        let response = HttpResponse::new(StatusCode::OK, "not json");

        let err = decode::<serde_json::Value>(&response, "analyze result").unwrap_err();

        assert!(matches!(
            err,
            ContentUnderstandingError::Decode {
                context: "analyze result",
                ..
            }
        ));
    }
}
