use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use tokio_util::sync::CancellationToken;

/// A bearer token handed out by a [`TokenCredential`].
#[derive(Clone)]
pub struct AccessToken {
    pub token: SecretString,
    /// Unix timestamp in seconds, when the identity provider reports one.
    pub expires_on: Option<u64>,
}

/// Something that can produce a bearer token for a scope, such as a managed
/// identity or a CLI login. Implementations are expected to observe `cancel`
/// while they wait on the identity provider.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    async fn get_token(
        &self,
        scopes: &[&str],
        cancel: &CancellationToken,
    ) -> anyhow::Result<AccessToken>;
}

/// Hands out one pre-acquired token.
pub struct StaticTokenCredential {
    token: AccessToken,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: AccessToken {
                token: SecretString::from(token.into()),
                expires_on: None,
            },
        }
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn get_token(
        &self,
        _scopes: &[&str],
        _cancel: &CancellationToken,
    ) -> anyhow::Result<AccessToken> {
        Ok(self.token.clone())
    }
}

/// How a client authenticates. Chosen once at construction.
#[derive(Clone)]
pub enum Authentication {
    /// Sent as `Ocp-Apim-Subscription-Key`.
    SubscriptionKey(SecretString),
    /// Fresh `Authorization: Bearer` token on every request.
    TokenCredential(Arc<dyn TokenCredential>),
}

/// Endpoint plus authentication for one Content Understanding resource.
///
/// # Fields
///
/// * `endpoint` - Resource URL, e.g. `https://my-resource.services.ai.azure.com`.
/// * `auth` - The single authentication mode used for every call.
#[derive(Clone)]
pub struct Credentials {
    pub endpoint: String,
    pub auth: Authentication,
}

impl Credentials {
    pub fn with_key(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            auth: Authentication::SubscriptionKey(SecretString::from(api_key.into())),
        }
    }

    pub fn with_token_credential(
        endpoint: impl Into<String>,
        credential: Arc<dyn TokenCredential>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            auth: Authentication::TokenCredential(credential),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match self.auth {
            Authentication::SubscriptionKey(_) => "subscription-key",
            Authentication::TokenCredential(_) => "token-credential",
        };
        f.debug_struct("Credentials")
            .field("endpoint", &self.endpoint)
            .field("auth", &mode)
            .finish()
    }
}
