//! Provider API client
//!
//! [`CampaignsClient`] wraps the handful of Campaigns endpoints the loader
//! needs. Each area lives in its own file:
//!
//! - `fields`: contact field catalog
//! - `lists`: mailing list directory and list creation
//! - `subscribers`: bulk add (with 429 backoff) and single-contact upsert
//! - `templates`: saved email templates
//!
//! Calls are blocking and take the access token explicitly so the caller
//! decides when to refresh it.

mod error;
mod fields;
mod lists;
mod subscribers;
mod templates;
mod transport;

use std::sync::Arc;
use std::time::Duration;

use crate::auth::AccessToken;
use crate::config::{Endpoints, UploadSettings};

pub use error::{ApiError, ApiResult};
pub use fields::{FALLBACK_FIELDS, FallbackReason, FieldCatalog};
pub use lists::{MailingList, Visibility, find_by_name};
pub use subscribers::ProviderResponse;
pub use templates::TemplateSummary;
pub use transport::{
    ApiReply, ApiRequest, HttpTransport, Method, RecordingSleeper, Sleeper, ThreadSleeper,
    Transport,
};

/// Client for the Campaigns v1.1 and Email v2 APIs
pub struct CampaignsClient {
    transport: Arc<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
    campaigns_base: String,
    email_api_base: String,
    read_timeout: Duration,
    write_timeout: Duration,
    rate_limit_retries: u32,
}

impl CampaignsClient {
    /// Create a client that really sleeps during backoff
    pub fn new(
        transport: Arc<dyn Transport>,
        endpoints: &Endpoints,
        upload: &UploadSettings,
    ) -> Self {
        Self {
            transport,
            sleeper: Arc::new(ThreadSleeper),
            campaigns_base: endpoints.campaigns_base(),
            email_api_base: endpoints.email_api_base(),
            read_timeout: upload.read_timeout(),
            write_timeout: upload.write_timeout(),
            rate_limit_retries: upload.rate_limit_retries,
        }
    }

    /// Replace the sleeper used for rate-limit backoff
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn campaigns_base(&self) -> &str {
        &self.campaigns_base
    }

    fn campaigns_url(&self, path: &str) -> String {
        format!("{}/{}", self.campaigns_base, path)
    }

    fn email_api_url(&self, path: &str) -> String {
        format!("{}/{}", self.email_api_base, path)
    }

    fn read(&self, url: String, token: &AccessToken) -> ApiRequest {
        ApiRequest::get(url, self.read_timeout).with_token(token.as_str())
    }

    fn write(&self, url: String, token: &AccessToken) -> ApiRequest {
        ApiRequest::post(url, self.write_timeout).with_token(token.as_str())
    }

    /// Send a request and map 401 and other failures to errors
    fn send_checked(&self, endpoint: &str, request: &ApiRequest) -> ApiResult<ApiReply> {
        let reply = self.transport.send(request)?;
        check_status(endpoint, &request.url, reply)
    }
}

fn check_status(endpoint: &str, url: &str, reply: ApiReply) -> ApiResult<ApiReply> {
    match reply.status {
        401 => Err(ApiError::StaleToken {
            endpoint: endpoint.to_string(),
        }),
        _ if reply.is_success() => Ok(reply),
        status => Err(ApiError::http(status, url, reply.body)),
    }
}

fn parse_json(url: &str, reply: &ApiReply) -> ApiResult<serde_json::Value> {
    reply
        .json()
        .map_err(|e| ApiError::invalid(url, format!("body is not JSON: {}", e)))
}
