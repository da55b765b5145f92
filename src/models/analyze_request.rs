use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};

use crate::error::{ContentUnderstandingError, Result};

/// Body of an `:analyze` submission. Exactly one source is ever populated.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum AnalyzeRequest {
    Url {
        url: String,
    },
    Data {
        /// Base64 of the raw bytes.
        data: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
}

impl AnalyzeRequest {
    pub fn from_url(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(ContentUnderstandingError::validation(
                "content url must not be blank",
            ));
        }
        Ok(Self::Url { url })
    }

    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Result<Self> {
        let mime_type = mime_type.into();
        if bytes.is_empty() {
            return Err(ContentUnderstandingError::validation(
                "content data must not be empty",
            ));
        }
        if mime_type.trim().is_empty() {
            return Err(ContentUnderstandingError::validation(
                "mime type must not be blank",
            ));
        }
        Ok(Self::Data {
            data: general_purpose::STANDARD.encode(bytes),
            mime_type,
        })
    }

    /// Short label used in log fields. Urls may carry SAS tokens, so they
    /// are not logged.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Url { .. } => "url",
            Self::Data { .. } => "data",
        }
    }
}
