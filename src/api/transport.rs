//! HTTP transport seam
//!
//! All provider calls go through the [`Transport`] trait. The production
//! implementation wraps a blocking `reqwest` client; tests plug in a scripted
//! transport that replays canned replies and records what was sent.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

use super::error::{ApiError, ApiResult};

/// HTTP method used by the provider API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One outgoing request
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    /// Form-urlencoded body fields (POST only)
    pub form: Vec<(String, String)>,
    /// Access token for the Authorization header
    pub token: Option<String>,
    /// Extra request headers
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            query: Vec::new(),
            form: Vec::new(),
            token: None,
            headers: Vec::new(),
            timeout,
        }
    }

    pub fn post(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            method: Method::Post,
            ..Self::get(url, timeout)
        }
    }

    /// Add a query parameter
    pub fn with_query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    /// Add a form field
    pub fn with_form(mut self, key: &str, value: impl Into<String>) -> Self {
        self.form.push((key.to_string(), value.into()));
        self
    }

    /// Attach an access token
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    /// Add a request header
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    /// Look up a request header by name, ignoring case
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Look up a form field by name
    pub fn form_value(&self, key: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Look up a query parameter by name
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A received response, fully buffered
#[derive(Debug, Clone)]
pub struct ApiReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl ApiReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: None,
            body: body.into(),
        }
    }

    /// A 200 reply carrying a JSON document
    pub fn json_ok(value: serde_json::Value) -> Self {
        Self {
            status: 200,
            content_type: Some("application/json".to_string()),
            body: value.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON
    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// First `max_chars` characters of the body
    pub fn body_excerpt(&self, max_chars: usize) -> String {
        self.body.chars().take(max_chars).collect()
    }
}

/// Sends provider requests
pub trait Transport: Send + Sync {
    /// Send a request and buffer the full reply
    ///
    /// Only transport-level failures are errors here; any HTTP status is a
    /// reply for the caller to classify.
    fn send(&self, request: &ApiRequest) -> ApiResult<ApiReply>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: &ApiRequest) -> ApiResult<ApiReply> {
        (**self).send(request)
    }
}

/// Blocking `reqwest` transport
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    auth_scheme: String,
}

impl HttpTransport {
    /// Create a transport using the given Authorization scheme
    pub fn new(auth_scheme: impl Into<String>) -> ApiResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("campaign-loader/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network {
                url: String::new(),
                message: format!("Failed to create HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            auth_scheme: auth_scheme.into(),
        })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &ApiRequest) -> ApiResult<ApiReply> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        builder = builder.timeout(request.timeout);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if !request.form.is_empty() {
            builder = builder.form(&request.form);
        }
        if let Some(token) = &request.token {
            builder = builder.header(AUTHORIZATION, format!("{} {}", self.auth_scheme, token));
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        tracing::debug!(method = ?request.method, url = %request.url, "Sending request");

        let response = builder.send().map_err(|e| ApiError::Network {
            url: request.url.clone(),
            message: e.to_string(),
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().map_err(|e| ApiError::Network {
            url: request.url.clone(),
            message: format!("Failed to read response body: {}", e),
        })?;

        tracing::debug!(url = %request.url, status, "Received response");

        Ok(ApiReply {
            status,
            content_type,
            body,
        })
    }
}

/// Pauses between provider calls
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Sleeps the current thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Records requested pauses instead of sleeping
///
/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    pauses: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every pause requested so far, in order
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Sum of all requested pauses
    pub fn total(&self) -> Duration {
        self.pauses().iter().sum()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        if let Ok(mut pauses) = self.pauses.lock() {
            pauses.push(duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builders() {
        let request = ApiRequest::post("https://x/api", Duration::from_secs(60))
            .with_form("listkey", "abc")
            .with_form("resfmt", "JSON")
            .with_query("type", "json")
            .with_token("tok")
            .with_header("Accept", "application/json");

        assert_eq!(request.method, Method::Post);
        assert_eq!(request.header_value("accept"), Some("application/json"));
        assert_eq!(request.form_value("listkey"), Some("abc"));
        assert_eq!(request.query_value("type"), Some("json"));
        assert_eq!(request.form_value("missing"), None);
        assert_eq!(request.token.as_deref(), Some("tok"));
    }

    #[test]
    fn test_reply_helpers() {
        let reply = ApiReply::json_ok(serde_json::json!({"status": "success"}));
        assert!(reply.is_success());
        assert_eq!(reply.json().unwrap()["status"], "success");

        let reply = ApiReply::new(502, "é".repeat(1000));
        assert!(!reply.is_success());
        assert_eq!(reply.body_excerpt(800).chars().count(), 800);
        assert!(reply.json().is_err());
    }

    #[test]
    fn test_recording_sleeper_shares_record() {
        let sleeper = RecordingSleeper::new();
        let handle = sleeper.clone();
        sleeper.sleep(Duration::from_secs(1));
        sleeper.sleep(Duration::from_secs(2));
        assert_eq!(handle.pauses().len(), 2);
        assert_eq!(handle.total(), Duration::from_secs(3));
    }
}
