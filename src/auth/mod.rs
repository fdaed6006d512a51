//! OAuth refresh-token authentication
//!
//! The provider hands out short-lived access tokens in exchange for a
//! long-lived refresh token. Tokens are not cached or expiry-tracked: a run
//! acquires one up front and replaces it whenever a call comes back 401.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use campaign_loader::auth::{TokenProvider, TokenSession};
//!
//! let provider = TokenProvider::new(transport, &config.endpoints, config.credentials.clone())
//!     .with_timeout(config.upload.read_timeout());
//! let mut session = TokenSession::start(provider)?;
//! // ... a call returns StaleToken
//! session.refresh()?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::api::{ApiError, ApiRequest, ApiResult, Transport};
use crate::config::{Credentials, Endpoints};

/// Opaque bearer credential
///
/// Never printed in full by `Debug` or `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a token, rejecting blank values
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccessToken(<redacted>)")
    }
}

impl std::fmt::Display for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix: String = self.0.chars().take(4).collect();
        write!(f, "{}***", prefix)
    }
}

/// Exchanges the refresh token for access tokens
pub struct TokenProvider {
    transport: Arc<dyn Transport>,
    token_url: String,
    credentials: Credentials,
    timeout: Duration,
}

impl TokenProvider {
    pub fn new(
        transport: Arc<dyn Transport>,
        endpoints: &Endpoints,
        credentials: Credentials,
    ) -> Self {
        Self {
            transport,
            token_url: endpoints.token_url(),
            credentials,
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the token exchange timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Perform one token exchange
    ///
    /// No retries at this layer.
    pub fn acquire(&self) -> ApiResult<AccessToken> {
        let request = ApiRequest::post(&self.token_url, self.timeout)
            .with_form("refresh_token", &self.credentials.refresh_token)
            .with_form("client_id", &self.credentials.client_id)
            .with_form("client_secret", &self.credentials.client_secret)
            .with_form("grant_type", "refresh_token");

        let reply = self
            .transport
            .send(&request)
            .map_err(|e| ApiError::Auth(e.to_string()))?;

        if !reply.is_success() {
            return Err(ApiError::Auth(format!(
                "token endpoint returned HTTP {}: {}",
                reply.status,
                reply.body_excerpt(200)
            )));
        }

        let json = reply
            .json()
            .map_err(|e| ApiError::Auth(format!("token response is not JSON: {}", e)))?;

        let token = json
            .get("access_token")
            .and_then(|v| v.as_str())
            .and_then(AccessToken::new);

        match token {
            Some(token) => {
                tracing::debug!(token = %token, "Acquired access token");
                Ok(token)
            }
            None => {
                let reason = json
                    .get("error")
                    .and_then(|v| v.as_str())
                    .unwrap_or("no access_token in response");
                Err(ApiError::Auth(reason.to_string()))
            }
        }
    }
}

/// The current access token for one run
///
/// `refresh` swaps the token wholesale; every later call uses the new one.
pub struct TokenSession {
    provider: TokenProvider,
    current: AccessToken,
    refreshes: u32,
}

impl TokenSession {
    /// Acquire the first token
    pub fn start(provider: TokenProvider) -> ApiResult<Self> {
        let current = provider.acquire()?;
        Ok(Self {
            provider,
            current,
            refreshes: 0,
        })
    }

    /// Session seeded with a known token
    pub fn with_token(provider: TokenProvider, token: AccessToken) -> Self {
        Self {
            provider,
            current: token,
            refreshes: 0,
        }
    }

    pub fn token(&self) -> &AccessToken {
        &self.current
    }

    /// Replace the token with a fresh one
    pub fn refresh(&mut self) -> ApiResult<&AccessToken> {
        tracing::info!("Refreshing access token");
        self.current = self.provider.acquire()?;
        self.refreshes += 1;
        Ok(&self.current)
    }

    /// Number of successful refreshes so far
    pub fn refreshes(&self) -> u32 {
        self.refreshes
    }
}
