//! Error types for provider API calls

use thiserror::Error;

/// Errors returned by the provider API layer
#[derive(Error, Debug)]
pub enum ApiError {
    /// Token exchange failed or returned no access token
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The provider rejected the access token (HTTP 401)
    #[error("Access token rejected by {endpoint}")]
    StaleToken { endpoint: String },

    /// HTTP 429 persisted past the retry ceiling
    #[error("Rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },

    /// Non-success status other than 401/429
    #[error("HTTP {status} from {url}: {body}")]
    Http {
        status: u16,
        url: String,
        body: String,
    },

    /// List creation neither succeeded nor resolved to an existing list
    #[error("Could not create or find list '{listname}': {response}")]
    ListResolution { listname: String, response: String },

    /// Transport-level failure (DNS, TLS, timeout, ...)
    #[error("Network error calling {url}: {message}")]
    Network { url: String, message: String },

    /// A success status with a body we could not interpret
    #[error("Unexpected response from {url}: {message}")]
    InvalidResponse { url: String, message: String },

    /// Failed or non-JSON reply, with enough of the body to debug it
    #[error("HTTP {status} {url}\nContent-Type: {content_type}\nBody:\n{excerpt}")]
    Detailed {
        status: u16,
        url: String,
        content_type: String,
        excerpt: String,
    },
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Create an HTTP error
    pub fn http(status: u16, url: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            url: url.into(),
            body: body.into(),
        }
    }

    /// Create an invalid-response error
    pub fn invalid(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Whether a token refresh may fix this error
    pub fn is_stale_token(&self) -> bool {
        matches!(self, ApiError::StaleToken { .. })
    }

    /// HTTP status attached to the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::StaleToken { .. } => Some(401),
            ApiError::RateLimited { .. } => Some(429),
            ApiError::Http { status, .. } | ApiError::Detailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Auth(msg) => format!(
                "Authentication failed: {msg}\n\nHint: Check ZOHO_CLIENT_ID, ZOHO_CLIENT_SECRET, ZOHO_REFRESH_TOKEN and the data center (ZOHO_DC)."
            ),
            ApiError::StaleToken { endpoint } => format!(
                "The access token was rejected by {endpoint}.\n\nHint: The refresh token may lack the required scopes."
            ),
            ApiError::RateLimited { attempts } => format!(
                "The provider kept rate limiting after {attempts} attempts.\n\nHint: Wait a few minutes and run again, or raise upload.bulk_delay_ms."
            ),
            ApiError::ListResolution { listname, response } => format!(
                "Could not create or find list '{listname}'.\nProvider response: {response}"
            ),
            ApiError::Network { url, message } => format!(
                "Network error calling {url}: {message}\n\nHint: Check connectivity and the configured endpoints."
            ),
            _ if self.status().is_some_and(|status| status >= 500) => format!(
                "{self}\n\nHint: The provider is having trouble. Try again in a few minutes."
            ),
            _ => self.to_string(),
        }
    }
}
