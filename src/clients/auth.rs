use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{ContentUnderstandingError, Result};
use crate::models::credentials::{Authentication, TokenCredential};

pub const SUBSCRIPTION_KEY_HEADER: &str = "ocp-apim-subscription-key";
pub const COGNITIVE_SERVICES_SCOPE: &str = "https://cognitiveservices.azure.com/.default";

/// Attaches credentials to an outgoing request.
#[async_trait]
pub trait AuthPolicy: Send + Sync {
    async fn authorize(&self, headers: &mut HeaderMap, cancel: &CancellationToken) -> Result<()>;
}

/// Static subscription key; the header value is built once.
pub struct SubscriptionKeyPolicy {
    header: HeaderValue,
}

impl SubscriptionKeyPolicy {
    pub fn new(api_key: &SecretString) -> Result<Self> {
        let mut header = HeaderValue::from_str(api_key.expose_secret()).map_err(|_| {
            ContentUnderstandingError::validation("subscription key is not a valid header value")
        })?;
        header.set_sensitive(true);
        Ok(Self { header })
    }
}

#[async_trait]
impl AuthPolicy for SubscriptionKeyPolicy {
    async fn authorize(&self, headers: &mut HeaderMap, _cancel: &CancellationToken) -> Result<()> {
        headers.insert(
            HeaderName::from_static(SUBSCRIPTION_KEY_HEADER),
            self.header.clone(),
        );
        Ok(())
    }
}

/// Fetches a token on every request; nothing is cached here.
pub struct BearerTokenPolicy {
    credential: Arc<dyn TokenCredential>,
    scope: String,
}

impl BearerTokenPolicy {
    pub fn new(credential: Arc<dyn TokenCredential>) -> Self {
        Self {
            credential,
            scope: COGNITIVE_SERVICES_SCOPE.to_string(),
        }
    }
}

#[async_trait]
impl AuthPolicy for BearerTokenPolicy {
    async fn authorize(&self, headers: &mut HeaderMap, cancel: &CancellationToken) -> Result<()> {
        let scopes = [self.scope.as_str()];
        let token = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ContentUnderstandingError::Cancelled),
            token = self.credential.get_token(&scopes, cancel) => {
                token.map_err(ContentUnderstandingError::Credential)?
            }
        };
        debug!(scope = self.scope.as_str(), "Acquired bearer token");

        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.token.expose_secret()))
            .map_err(|_| {
                ContentUnderstandingError::validation("bearer token is not a valid header value")
            })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
        Ok(())
    }
}

/// Builds the one policy a client uses for its whole lifetime.
pub fn policy_for(auth: &Authentication) -> Result<Arc<dyn AuthPolicy>> {
    Ok(match auth {
        Authentication::SubscriptionKey(key) => Arc::new(SubscriptionKeyPolicy::new(key)?),
        Authentication::TokenCredential(credential) => {
            Arc::new(BearerTokenPolicy::new(credential.clone()))
        }
    })
}
