//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use campaign_loader::api::{ApiReply, ApiRequest, ApiResult, RecordingSleeper, Transport};
use campaign_loader::auth::{AccessToken, TokenProvider, TokenSession};
use campaign_loader::config::{Credentials, Endpoints, UploadSettings};
use campaign_loader::contacts::{ContactTable, CsvReader};
use campaign_loader::{CampaignsClient, FieldCatalog, UploadPipeline};
use serde_json::{Value, json};

pub const BASE: &str = "https://mock.campaigns.test";
pub const TOKEN_PATH: &str = "oauth/v2/token";
pub const BULK_PATH: &str = "addlistsubscribersinbulk";
pub const UPSERT_PATH: &str = "json/listsubscribe";
pub const CREATE_PATH: &str = "addlistandcontacts";
pub const LISTS_PATH: &str = "getmailinglists";
pub const FIELDS_PATH: &str = "contact/allfields";

/// Transport that replays scripted replies per URL suffix
///
/// Each route serves its queue in order, then repeats its fallback reply.
/// Unrouted requests get a 404.
#[derive(Default)]
pub struct MockTransport {
    queues: Mutex<HashMap<String, VecDeque<ApiReply>>>,
    fallbacks: Mutex<HashMap<String, ApiReply>>,
    sent: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        let mock = Self::default();
        mock.always(TOKEN_PATH, ApiReply::json_ok(json!({"access_token": "tok-fresh"})));
        mock.always(BULK_PATH, ApiReply::json_ok(json!({"status": "success", "message": "ok"})));
        mock.always(UPSERT_PATH, ApiReply::json_ok(json!({"status": "success"})));
        Arc::new(mock)
    }

    /// Queue replies for a route, served before its fallback
    pub fn queue(&self, suffix: &str, replies: impl IntoIterator<Item = ApiReply>) {
        self.queues
            .lock()
            .unwrap()
            .entry(suffix.to_string())
            .or_default()
            .extend(replies);
    }

    /// Reply used once a route's queue is empty
    pub fn always(&self, suffix: &str, reply: ApiReply) {
        self.fallbacks
            .lock()
            .unwrap()
            .insert(suffix.to_string(), reply);
    }

    pub fn sent(&self) -> Vec<ApiRequest> {
        self.sent.lock().unwrap().clone()
    }

    /// Requests whose URL ends with `suffix`
    pub fn sent_to(&self, suffix: &str) -> Vec<ApiRequest> {
        self.sent()
            .into_iter()
            .filter(|r| r.url.ends_with(suffix))
            .collect()
    }

    /// Email arrays of every bulk request, in order
    pub fn bulk_batches(&self) -> Vec<Vec<String>> {
        self.sent_to(BULK_PATH)
            .iter()
            .map(|r| serde_json::from_str(r.form_value("emailids").unwrap()).unwrap())
            .collect()
    }

    /// Decoded contactinfo payloads of every upsert, in order
    pub fn upserts(&self) -> Vec<Value> {
        self.sent_to(UPSERT_PATH)
            .iter()
            .map(|r| serde_json::from_str(r.form_value("contactinfo").unwrap()).unwrap())
            .collect()
    }

    fn route(&self, url: &str) -> Option<String> {
        let queues = self.queues.lock().unwrap();
        let fallbacks = self.fallbacks.lock().unwrap();
        queues
            .keys()
            .chain(fallbacks.keys())
            .filter(|suffix| url.ends_with(suffix.as_str()))
            .max_by_key(|suffix| suffix.len())
            .cloned()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &ApiRequest) -> ApiResult<ApiReply> {
        self.sent.lock().unwrap().push(request.clone());

        let Some(route) = self.route(&request.url) else {
            return Ok(ApiReply::new(404, "no route"));
        };
        if let Some(reply) = self
            .queues
            .lock()
            .unwrap()
            .get_mut(&route)
            .and_then(VecDeque::pop_front)
        {
            return Ok(reply);
        }
        Ok(self
            .fallbacks
            .lock()
            .unwrap()
            .get(&route)
            .cloned()
            .unwrap_or_else(|| ApiReply::new(404, "route exhausted")))
    }
}

pub fn endpoints() -> Endpoints {
    Endpoints::default().with_base_url(BASE)
}

pub fn credentials() -> Credentials {
    Credentials::new("client-id", "client-secret", "refresh-token")
}

pub fn client(transport: Arc<MockTransport>, settings: &UploadSettings) -> CampaignsClient {
    CampaignsClient::new(transport, &endpoints(), settings)
}

pub fn token() -> AccessToken {
    AccessToken::new("tok-1").unwrap()
}

/// A pipeline holding `tok-1`, recording pauses instead of sleeping
pub fn pipeline(
    transport: Arc<MockTransport>,
    catalog: FieldCatalog,
    settings: UploadSettings,
) -> (UploadPipeline, RecordingSleeper) {
    let provider = TokenProvider::new(transport.clone(), &endpoints(), credentials());
    let session = TokenSession::with_token(provider, token());
    let sleeper = RecordingSleeper::new();
    let pipeline = UploadPipeline::new(client(transport, &settings), session, catalog, settings)
        .with_sleeper(Arc::new(sleeper.clone()));
    (pipeline, sleeper)
}

/// A CSV with an `Email` column and `n` valid addresses
pub fn numbered_table(n: usize) -> ContactTable {
    let mut csv = String::from("Email,First Name\n");
    for i in 0..n {
        csv.push_str(&format!("user{}@example.com,User{}\n", i, i));
    }
    CsvReader::new().read_str(&csv).unwrap()
}

pub fn error_reply(status: u16) -> ApiReply {
    ApiReply::new(status, format!("{{\"status\":\"error\",\"code\":{}}}", status))
}
