use std::time::Duration;

use crate::error::{ContentUnderstandingError, Result};
use crate::models::credentials::{Credentials, StaticTokenCredential};

pub const ENDPOINT_VAR: &str = "AZURE_CONTENT_UNDERSTANDING_ENDPOINT";
pub const KEY_VAR: &str = "AZURE_CONTENT_UNDERSTANDING_KEY";
pub const TOKEN_VAR: &str = "AZURE_CONTENT_UNDERSTANDING_TOKEN";
pub const API_VERSION_VAR: &str = "AZURE_CONTENT_UNDERSTANDING_API_VERSION";
pub const TIMEOUT_VAR: &str = "AZURE_CONTENT_UNDERSTANDING_TIMEOUT_SECS";

pub const DEFAULT_API_VERSION: &str = "2024-12-01-preview";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Settings fixed for the lifetime of a client.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientOptions {
    /// Sent as the `api-version` query parameter on every call.
    pub api_version: String,
    /// Per-HTTP-request timeout of the default transport.
    pub request_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ClientOptions {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut options = Self::default();
        if let Some(version) = non_blank(lookup(API_VERSION_VAR)) {
            options.api_version = version;
        }
        if let Some(raw) = non_blank(lookup(TIMEOUT_VAR)) {
            let secs: u64 = raw.parse().map_err(|_| {
                ContentUnderstandingError::validation(format!(
                    "{TIMEOUT_VAR} must be a whole number of seconds, got '{raw}'"
                ))
            })?;
            options.request_timeout = Duration::from_secs(secs);
        }
        Ok(options)
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Endpoint plus exactly one of a subscription key or a bearer token.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let endpoint = non_blank(lookup(ENDPOINT_VAR)).ok_or_else(|| {
            ContentUnderstandingError::validation(format!("{ENDPOINT_VAR} is not set"))
        })?;
        match (non_blank(lookup(KEY_VAR)), non_blank(lookup(TOKEN_VAR))) {
            (Some(key), None) => Ok(Credentials::with_key(endpoint, key)),
            (None, Some(token)) => Ok(Credentials::with_token_credential(
                endpoint,
                std::sync::Arc::new(StaticTokenCredential::new(token)),
            )),
            (Some(_), Some(_)) => Err(ContentUnderstandingError::validation(format!(
                "set only one of {KEY_VAR} or {TOKEN_VAR}"
            ))),
            (None, None) => Err(ContentUnderstandingError::validation(format!(
                "one of {KEY_VAR} or {TOKEN_VAR} must be set"
            ))),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
