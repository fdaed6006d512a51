//! Saved email templates (Email API v2)

use serde_json::Value;

use super::{ApiError, ApiReply, ApiResult, CampaignsClient};
use crate::auth::AccessToken;

/// Characters of a failed body kept in error messages
const BODY_EXCERPT_CHARS: usize = 800;

/// One entry of the template listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
}

impl TemplateSummary {
    fn from_json(item: &Value) -> Option<Self> {
        let id = match item.get("template_id")? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let name = item
            .get("template_name")
            .and_then(Value::as_str)
            .unwrap_or("(unnamed)")
            .to_string();
        Some(Self { id, name })
    }
}

fn detailed(url: &str, reply: &ApiReply) -> ApiError {
    ApiError::Detailed {
        status: reply.status,
        url: url.to_string(),
        content_type: reply.content_type.clone().unwrap_or_default(),
        excerpt: reply.body_excerpt(BODY_EXCERPT_CHARS),
    }
}

impl CampaignsClient {
    fn fetch_template_json(
        &self,
        url: String,
        query: &[(&str, String)],
        token: &AccessToken,
    ) -> ApiResult<Value> {
        let mut request = self
            .read(url.clone(), token)
            .with_header("Accept", "application/json");
        for (key, value) in query {
            request = request.with_query(key, value.clone());
        }
        let reply = self.transport.send(&request)?;
        if !reply.is_success() {
            return Err(detailed(&url, &reply));
        }
        reply.json().map_err(|_| detailed(&url, &reply))
    }

    /// List templates between two 1-based indexes, inclusive
    pub fn list_templates(
        &self,
        token: &AccessToken,
        start_index: u32,
        end_index: u32,
    ) -> ApiResult<Vec<TemplateSummary>> {
        let url = self.email_api_url("templates");
        let json = self.fetch_template_json(
            url,
            &[
                ("start_index", start_index.to_string()),
                ("end_index", end_index.to_string()),
            ],
            token,
        )?;

        Ok(json
            .get("templates")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(TemplateSummary::from_json).collect())
            .unwrap_or_default())
    }

    /// HTML content of one template, or an empty string for non-HTML templates
    pub fn template_html(&self, token: &AccessToken, template_id: &str) -> ApiResult<String> {
        let url = self.email_api_url(&format!("templates/{}", urlencoding::encode(template_id)));
        let json = self.fetch_template_json(url, &[], token)?;

        let is_html = json.get("content_type").and_then(Value::as_str) == Some("html");
        Ok(if is_html {
            json.get("content")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        } else {
            String::new()
        })
    }
}
