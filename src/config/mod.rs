//! Loader configuration
//!
//! Everything the tool needs at start-up lives in one [`LoaderConfig`] value:
//! OAuth credentials, endpoint locations, and the pacing knobs used by the
//! upload pipeline. A config is read from an optional TOML file and then
//! overlaid with environment variables, so secrets never have to be written
//! to disk.
//!
//! # Example
//!
//! ```toml
//! fixed_list_key = ""
//!
//! [credentials]
//! client_id = "1000.XXXX"
//! client_secret = "..."
//! refresh_token = "1000.xxxx.yyyy"
//!
//! [endpoints]
//! data_center = "eu"
//!
//! [upload]
//! batch_size = 10
//! bulk_delay_ms = 200
//! row_delay_ms = 50
//! rate_limit_retries = 5
//! ```

mod error;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use error::{ConfigError, ConfigResult};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "campaign-loader.toml";

/// Largest batch the bulk-add endpoint accepts
pub const MAX_BATCH_SIZE: usize = 10;

/// Environment variable names
pub mod env {
    pub const CLIENT_ID: &str = "ZOHO_CLIENT_ID";
    pub const CLIENT_SECRET: &str = "ZOHO_CLIENT_SECRET";
    pub const REFRESH_TOKEN: &str = "ZOHO_REFRESH_TOKEN";
    pub const DATA_CENTER: &str = "ZOHO_DC";
    pub const FIXED_LIST_KEY: &str = "ZOHO_FIXED_LIST_KEY";
    pub const ACCOUNTS_URL: &str = "ZOHO_ACCOUNTS_URL";
    pub const CAMPAIGNS_URL: &str = "ZOHO_CAMPAIGNS_URL";
    pub const EMAIL_API_URL: &str = "ZOHO_EMAIL_API_URL";
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// OAuth client credentials
    pub credentials: Credentials,
    /// Provider endpoint locations
    pub endpoints: Endpoints,
    /// Pipeline pacing and retry settings
    pub upload: UploadSettings,
    /// Existing list to use without asking
    pub fixed_list_key: Option<String>,
}

impl LoaderConfig {
    /// Create a config with default settings and no credentials
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read a config file
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Load the config the way the CLI does
    ///
    /// An explicit path must exist. Without one, [`DEFAULT_CONFIG_FILE`] is
    /// used when present. Environment variables are applied last.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    tracing::debug!(path = %default_path.display(), "Using default config file");
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Overlay values from an environment lookup
    ///
    /// Empty values are ignored so an exported-but-blank variable does not
    /// wipe a value from the file.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(env::CLIENT_ID) {
            self.credentials.client_id = v;
        }
        if let Some(v) = get(env::CLIENT_SECRET) {
            self.credentials.client_secret = v;
        }
        if let Some(v) = get(env::REFRESH_TOKEN) {
            self.credentials.refresh_token = v;
        }
        if let Some(v) = get(env::DATA_CENTER) {
            self.endpoints.data_center = v;
        }
        if let Some(v) = get(env::FIXED_LIST_KEY) {
            self.fixed_list_key = Some(v);
        }
        if let Some(v) = get(env::ACCOUNTS_URL) {
            self.endpoints.accounts_url = Some(v);
        }
        if let Some(v) = get(env::CAMPAIGNS_URL) {
            self.endpoints.campaigns_url = Some(v);
        }
        if let Some(v) = get(env::EMAIL_API_URL) {
            self.endpoints.email_api_url = Some(v);
        }
    }

    /// Set credentials
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Set endpoints
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Set upload settings
    pub fn with_upload(mut self, upload: UploadSettings) -> Self {
        self.upload = upload;
        self
    }

    /// Set the fixed list key
    pub fn with_fixed_list_key(mut self, key: impl Into<String>) -> Self {
        self.fixed_list_key = Some(key.into());
        self
    }

    /// The fixed list key, if one is configured and non-blank
    pub fn fixed_list_key(&self) -> Option<&str> {
        self.fixed_list_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Validate everything needed to talk to the provider
    pub fn validate(&self) -> ConfigResult<()> {
        self.credentials.validate()?;
        self.upload.validate()?;
        if self.endpoints.data_center.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "endpoints.data_center cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// OAuth refresh-token credentials
///
/// `Debug` never prints the secret values.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl Credentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Names of the credential fields that are blank
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.client_id.trim().is_empty() {
            missing.push(env::CLIENT_ID);
        }
        if self.client_secret.trim().is_empty() {
            missing.push(env::CLIENT_SECRET);
        }
        if self.refresh_token.trim().is_empty() {
            missing.push(env::REFRESH_TOKEN);
        }
        missing
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let missing = self.missing();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingCredentials(
                missing.into_iter().map(String::from).collect(),
            ))
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &redact(&self.client_id))
            .field("client_secret", &redact(&self.client_secret))
            .field("refresh_token", &redact(&self.refresh_token))
            .finish()
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() { "<unset>" } else { "<redacted>" }
}

/// Provider endpoint locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// Zoho data center suffix (com, eu, in, com.au, jp, ...)
    pub data_center: String,
    /// Override for the OAuth accounts server
    pub accounts_url: Option<String>,
    /// Override for the Campaigns v1.1 API base
    pub campaigns_url: Option<String>,
    /// Override for the Email API v2 base (templates)
    pub email_api_url: Option<String>,
    /// Scheme placed before the token in the Authorization header
    pub auth_scheme: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            data_center: "com".to_string(),
            accounts_url: None,
            campaigns_url: None,
            email_api_url: None,
            auth_scheme: "Zoho-oauthtoken".to_string(),
        }
    }
}

impl Endpoints {
    /// Endpoints for a data center
    pub fn for_data_center(dc: impl Into<String>) -> Self {
        Self {
            data_center: dc.into(),
            ..Default::default()
        }
    }

    /// Point every endpoint at one base URL (fake servers, proxies)
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.accounts_url = Some(base.to_string());
        self.campaigns_url = Some(format!("{}/api/v1.1", base));
        self.email_api_url = Some(format!("{}/emailapi/v2", base));
        self
    }

    fn dc(&self) -> &str {
        self.data_center.trim().trim_start_matches('.')
    }

    /// OAuth accounts server root
    pub fn accounts_base(&self) -> String {
        match &self.accounts_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://accounts.zoho.{}", self.dc()),
        }
    }

    /// Campaigns API v1.1 root
    pub fn campaigns_base(&self) -> String {
        match &self.campaigns_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://campaigns.zoho.{}/api/v1.1", self.dc()),
        }
    }

    /// Email API v2 root
    pub fn email_api_base(&self) -> String {
        match &self.email_api_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://campaigns.zoho.{}/emailapi/v2", self.dc()),
        }
    }

    /// Token exchange URL
    pub fn token_url(&self) -> String {
        format!("{}/oauth/v2/token", self.accounts_base())
    }
}

/// Pacing, batching and retry settings for uploads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    /// Emails per bulk-add call (1..=10)
    pub batch_size: usize,
    /// Pause after each bulk-add call, in milliseconds
    pub bulk_delay_ms: u64,
    /// Pause after each contact upsert, in milliseconds
    pub row_delay_ms: u64,
    /// Retries after HTTP 429 before a batch gives up
    pub rate_limit_retries: u32,
    /// Timeout for reads and token exchange, in seconds
    pub read_timeout_secs: u64,
    /// Timeout for write calls, in seconds
    pub write_timeout_secs: u64,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            batch_size: MAX_BATCH_SIZE,
            bulk_delay_ms: 200,
            row_delay_ms: 50,
            rate_limit_retries: 5,
            read_timeout_secs: 30,
            write_timeout_secs: 60,
        }
    }
}

impl UploadSettings {
    /// Settings with every pause set to zero
    pub fn without_delays() -> Self {
        Self {
            bulk_delay_ms: 0,
            row_delay_ms: 0,
            ..Default::default()
        }
    }

    /// Set the batch size
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Set the 429 retry ceiling
    pub fn with_rate_limit_retries(mut self, retries: u32) -> Self {
        self.rate_limit_retries = retries;
        self
    }

    pub fn bulk_delay(&self) -> Duration {
        Duration::from_millis(self.bulk_delay_ms)
    }

    pub fn row_delay(&self) -> Duration {
        Duration::from_millis(self.row_delay_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::Invalid(format!(
                "upload.batch_size must be between 1 and {}, got {}",
                MAX_BATCH_SIZE, self.batch_size
            )));
        }
        if self.read_timeout_secs == 0 || self.write_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "upload timeouts must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
