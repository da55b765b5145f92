use std::path::PathBuf;

use serde::Deserialize;

pub type Result<T, E = ContentUnderstandingError> = std::result::Result<T, E>;

/// Every failure the client can report.
///
/// Local problems (`Validation`, `FileNotFound`, `DirectoryNotFound`, `Io`)
/// are raised before anything is sent to the service. `Service` is the one
/// kind used for non-success HTTP responses from any call. A terminal
/// `Failed` or `Canceled` analysis is not an error: it comes back as a
/// normal [`AnalyzeResult`](crate::models::AnalyzeResult).
#[derive(Debug, thiserror::Error)]
pub enum ContentUnderstandingError {
    #[error("invalid argument: {0}")]
    Validation(String),

    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{message} (status {status})")]
    Service {
        message: String,
        status: u16,
        body: String,
    },

    #[error("transport failure: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Credential(anyhow::Error),

    #[error("failed to decode {context}: {source}")]
    Decode {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("operation cancelled")]
    Cancelled,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorCode,
}

#[derive(Deserialize)]
struct ErrorCode {
    code: Option<String>,
}

impl ContentUnderstandingError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Box::new(err))
    }

    /// HTTP status of a service rejection.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Service { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body of a service rejection.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Service { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Service-specific code from a `{"error":{"code":..}}` body, if present.
    pub fn error_code(&self) -> Option<String> {
        let body = self.body()?;
        serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .and_then(|envelope| envelope.error.code)
    }

    /// True for errors caused by the caller's input rather than the service.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::FileNotFound(_) | Self::DirectoryNotFound(_) | Self::Io { .. }
        )
    }
}
