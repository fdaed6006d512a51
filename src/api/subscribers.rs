//! Bulk subscriber add and single-contact upsert

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::Value;

use super::{ApiError, ApiReply, ApiResult, CampaignsClient, check_status};
use crate::auth::AccessToken;
use crate::config::MAX_BATCH_SIZE;

/// Body of a successful write call
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse(pub Value);

impl ProviderResponse {
    fn from_reply(reply: &ApiReply) -> Self {
        match reply.json() {
            Ok(value) => ProviderResponse(value),
            Err(_) => ProviderResponse(Value::String(reply.body.clone())),
        }
    }

    /// Short human-readable outcome
    ///
    /// The provider's `message`, else its `status`, else the whole body.
    pub fn summary(&self) -> String {
        let field = |name: &str| {
            self.0
                .get(name)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        field("message")
            .or_else(|| field("status"))
            .unwrap_or_else(|| match &self.0 {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
    }
}

impl std::fmt::Display for ProviderResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Backoff before retry number `retry` (0-based): 2^retry seconds
fn backoff_delay(retry: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(retry))
}

impl CampaignsClient {
    /// Add 1 to 10 emails to a list
    ///
    /// HTTP 429 is retried with exponential backoff up to the configured
    /// ceiling. A 401 is returned as [`ApiError::StaleToken`] without retry.
    ///
    /// # Panics
    /// When `emails` is empty or holds more than 10 addresses.
    pub fn add_batch(
        &self,
        token: &AccessToken,
        list_key: &str,
        emails: &[String],
    ) -> ApiResult<ProviderResponse> {
        assert!(
            !emails.is_empty() && emails.len() <= MAX_BATCH_SIZE,
            "a batch holds 1 to {} emails, got {}",
            MAX_BATCH_SIZE,
            emails.len()
        );

        let url = self.campaigns_url("addlistsubscribersinbulk");
        let emailids = serde_json::to_string(emails)
            .map_err(|e| ApiError::invalid(&url, format!("cannot encode emails: {}", e)))?;
        let request = self
            .write(url.clone(), token)
            .with_form("listkey", list_key)
            .with_form("resfmt", "JSON")
            .with_form("emailids", emailids);

        let mut retries = 0u32;
        loop {
            let reply = self.transport.send(&request)?;

            if reply.status == 429 {
                if retries < self.rate_limit_retries {
                    let delay = backoff_delay(retries);
                    tracing::warn!(
                        retry = retries + 1,
                        delay_secs = delay.as_secs(),
                        "Rate limited, backing off"
                    );
                    self.sleeper.sleep(delay);
                    retries += 1;
                    continue;
                }
                return Err(ApiError::RateLimited {
                    attempts: retries + 1,
                });
            }

            let reply = check_status("addlistsubscribersinbulk", &url, reply)?;
            return Ok(ProviderResponse::from_reply(&reply));
        }
    }

    /// Create or update one contact with all of its fields
    ///
    /// Single attempt; a 401 is returned as [`ApiError::StaleToken`].
    pub fn upsert_contact(
        &self,
        token: &AccessToken,
        list_key: &str,
        contact_info: &BTreeMap<String, String>,
    ) -> ApiResult<ProviderResponse> {
        let url = self.campaigns_url("json/listsubscribe");
        let contactinfo = serde_json::to_string(contact_info)
            .map_err(|e| ApiError::invalid(&url, format!("cannot encode contact: {}", e)))?;
        let request = self
            .write(url.clone(), token)
            .with_form("listkey", list_key)
            .with_form("resfmt", "JSON")
            .with_form("contactinfo", contactinfo);

        let reply = self.send_checked("json/listsubscribe", &request)?;
        Ok(ProviderResponse::from_reply(&reply))
    }
}
