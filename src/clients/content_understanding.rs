use std::path::Path;

use reqwest::Method;
use tokio::{fs::File, io::AsyncReadExt};
use tracing::{info, instrument};

use crate::clients::transport::{HttpRequest, decode};
use crate::error::{ContentUnderstandingError, Result};
use crate::models::analysis_client::{ContentUnderstandingClient, PollOptions, validate_analyzer_id};
use crate::models::{AnalyzeRequest, AnalyzeResult};
use crate::utils::get_content_type;

pub const OPERATION_LOCATION_HEADER: &str = "operation-location";

impl ContentUnderstandingClient {
    /// Submits `request` to `analyzer_id` and waits for a terminal result.
    ///
    /// If the service answers without an `Operation-Location` header the
    /// body is returned as-is after a single call. Otherwise the operation
    /// url is polled every `options.interval` until the status is
    /// Succeeded, Failed or Canceled. Failed and Canceled come back as data;
    /// only transport and service rejections are errors.
    #[instrument(skip(self, request, options), fields(source = request.kind()))]
    pub async fn analyze(
        &self,
        analyzer_id: &str,
        request: &AnalyzeRequest,
        options: &PollOptions,
    ) -> Result<AnalyzeResult> {
        validate_analyzer_id(analyzer_id)?;
        let cancel = &options.cancellation;

        let analyze_url = self.service_url(&format!("analyzers/{analyzer_id}:analyze"));
        let submit = HttpRequest::new(Method::POST, analyze_url).with_json(request)?;
        let response = self.execute(submit, "analyze", cancel).await?;

        info!(
            analyzer_id = analyzer_id,
            status_code = response.status.as_u16(),
            "Analysis request submitted"
        );

        let Some(operation_location) = response
            .header(OPERATION_LOCATION_HEADER)
            .map(str::to_owned)
        else {
            let result: AnalyzeResult = decode(&response, "analyze result")?;
            info!(
                analyzer_id = analyzer_id,
                status = result.status.as_str(),
                "Service answered synchronously"
            );
            return Ok(result);
        };

        info!(
            analyzer_id = analyzer_id,
            operation_location = operation_location.as_str(),
            "Analysis operation initiated"
        );
        self.poll_operation(&operation_location, options).await
    }

    /// Polls an operation url until its status is terminal.
    ///
    /// Cancellation is checked before each wait and before each request.
    /// Errors are never retried.
    pub async fn poll_operation(
        &self,
        operation_location: &str,
        options: &PollOptions,
    ) -> Result<AnalyzeResult> {
        let cancel = &options.cancellation;
        let mut attempt: u64 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(ContentUnderstandingError::Cancelled);
            }
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ContentUnderstandingError::Cancelled),
                _ = tokio::time::sleep(options.interval) => {}
            }

            attempt += 1;
            let poll = HttpRequest::new(Method::GET, operation_location);
            let response = self.execute(poll, "poll operation", cancel).await?;
            let result: AnalyzeResult = decode(&response, "analyze result")?;

            info!(
                attempt = attempt,
                status = result.status.as_str(),
                operation_location = operation_location,
                "Polling analysis status"
            );

            if result.status.is_terminal() {
                return Ok(result);
            }
        }
    }

    pub async fn analyze_url(
        &self,
        analyzer_id: &str,
        url: &str,
        options: &PollOptions,
    ) -> Result<AnalyzeResult> {
        let request = AnalyzeRequest::from_url(url)?;
        self.analyze(analyzer_id, &request, options).await
    }

    pub async fn analyze_data(
        &self,
        analyzer_id: &str,
        data: &[u8],
        mime_type: &str,
        options: &PollOptions,
    ) -> Result<AnalyzeResult> {
        let request = AnalyzeRequest::from_bytes(data, mime_type)?;
        self.analyze(analyzer_id, &request, options).await
    }

    /// Reads `path` fully, picks a MIME type from its extension and submits
    /// it inline.
    pub async fn analyze_file(
        &self,
        analyzer_id: &str,
        path: impl AsRef<Path>,
        options: &PollOptions,
    ) -> Result<AnalyzeResult> {
        let path = path.as_ref();
        validate_analyzer_id(analyzer_id)?;
        let file_contents = read_file(path).await?;
        let content_type = get_content_type(path);

        info!(
            file_name = %path.display(),
            content_type = content_type,
            size = file_contents.len(),
            "Submitting local file"
        );
        self.analyze_data(analyzer_id, &file_contents, content_type, options)
            .await
    }
}

pub(crate) async fn read_file(path: &Path) -> Result<Vec<u8>> {
    let io_error = |source: std::io::Error| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ContentUnderstandingError::FileNotFound(path.to_path_buf())
        } else {
            ContentUnderstandingError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    };

    let mut file = File::open(path).await.map_err(io_error)?;
    let mut file_contents = Vec::new();
    file.read_to_end(&mut file_contents)
        .await
        .map_err(io_error)?;
    Ok(file_contents)
}
