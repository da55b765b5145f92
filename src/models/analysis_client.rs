use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::clients::auth::{AuthPolicy, policy_for};
use crate::clients::transport::{
    HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, ensure_success,
};
use crate::config::ClientOptions;
use crate::error::{ContentUnderstandingError, Result};
use crate::models::credentials::Credentials;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// A client for Azure AI Content Understanding analyzers.
///
/// Holds only immutable state (endpoint, api version, auth policy and
/// transport), so one instance can serve concurrent submissions as long as
/// the transport and credential can.
///
/// # Example
///
/// ```no_run
/// # async fn run() -> rusty_cu_runner::Result<()> {
/// use rusty_cu_runner::{ContentUnderstandingClient, Credentials, PollOptions};
///
/// let client = ContentUnderstandingClient::new(Credentials::with_key(
///     "https://my-resource.services.ai.azure.com",
///     "api-key",
/// ))?;
/// let result = client
///     .analyze_url("prebuilt-documentAnalyzer", "https://example.com/a.pdf", &PollOptions::default())
///     .await?;
/// println!("{}", result.status);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ContentUnderstandingClient {
    endpoint: String,
    api_version: String,
    auth: Arc<dyn AuthPolicy>,
    transport: Arc<dyn HttpTransport>,
}

/// Per-call polling behaviour.
///
/// There is no attempt limit or deadline; callers that need one cancel
/// `cancellation` (for example from a timer).
#[derive(Clone, Debug)]
pub struct PollOptions {
    pub interval: Duration,
    pub cancellation: CancellationToken,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            cancellation: CancellationToken::new(),
        }
    }
}

impl PollOptions {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }
}

impl ContentUnderstandingClient {
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_options(credentials, ClientOptions::default())
    }

    pub fn with_options(credentials: Credentials, options: ClientOptions) -> Result<Self> {
        let transport = ReqwestTransport::new(options.request_timeout)?;
        Self::with_transport(credentials, options, Arc::new(transport))
    }

    pub fn with_transport(
        credentials: Credentials,
        options: ClientOptions,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        let endpoint = credentials.endpoint.trim().trim_end_matches('/');
        if endpoint.is_empty() {
            return Err(ContentUnderstandingError::validation("endpoint must not be blank"));
        }
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(ContentUnderstandingError::validation(format!(
                "endpoint must be an http(s) url, got '{endpoint}'"
            )));
        }
        if options.api_version.trim().is_empty() {
            return Err(ContentUnderstandingError::validation("api version must not be blank"));
        }

        Ok(Self {
            endpoint: endpoint.to_string(),
            api_version: options.api_version,
            auth: policy_for(&credentials.auth)?,
            transport,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// `{endpoint}/contentunderstanding/{path}?api-version={version}`
    pub(crate) fn service_url(&self, path: &str) -> String {
        format!(
            "{}/contentunderstanding/{}?api-version={}",
            self.endpoint, path, self.api_version
        )
    }

    /// Authorizes and sends one request, racing the cancellation token and
    /// mapping any non-success status to the service error.
    pub(crate) async fn execute(
        &self,
        mut request: HttpRequest,
        operation: &str,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse> {
        if cancel.is_cancelled() {
            return Err(ContentUnderstandingError::Cancelled);
        }
        self.auth.authorize(&mut request.headers, cancel).await?;

        debug!(
            operation = operation,
            method = %request.method,
            url = request.url.as_str(),
            "Sending request"
        );
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ContentUnderstandingError::Cancelled),
            response = self.transport.send(request) => response?,
        };
        ensure_success(response, operation)
    }
}

/// Analyzer ids end up in the url path, so they must be non-blank and free
/// of path or query delimiters.
pub(crate) fn validate_analyzer_id(analyzer_id: &str) -> Result<()> {
    if analyzer_id.trim().is_empty() {
        return Err(ContentUnderstandingError::validation(
            "analyzer id must not be blank",
        ));
    }
    if analyzer_id
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '%'))
    {
        return Err(ContentUnderstandingError::validation(format!(
            "analyzer id '{analyzer_id}' contains characters not allowed in a url path"
        )));
    }
    Ok(())
}
