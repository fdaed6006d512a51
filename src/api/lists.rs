//! Mailing list directory and list creation

use serde_json::Value;

use super::{ApiError, ApiResult, CampaignsClient, parse_json};
use crate::auth::AccessToken;
use crate::config::MAX_BATCH_SIZE;

/// Provider code for "a list with this name already exists"
const DUPLICATE_LIST_CODE: i64 = 2205;

/// Page size used when resolving a duplicate name
const RESOLVE_PAGE_SIZE: u32 = 200;

/// A mailing list as reported by the directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailingList {
    pub name: String,
    pub key: String,
    /// `None` when the provider omitted or garbled the flag
    pub is_public: Option<bool>,
}

impl MailingList {
    fn from_json(item: &Value) -> Option<Self> {
        let key = item.get("listkey").and_then(Value::as_str)?;
        let name = item
            .get("listname")
            .and_then(Value::as_str)
            .unwrap_or_default();
        Some(Self {
            name: name.to_string(),
            key: key.to_string(),
            is_public: item.get("is_public").and_then(lenient_bool),
        })
    }

    /// Case-insensitive comparison after trimming both sides
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.trim().to_lowercase() == name.trim().to_lowercase()
    }
}

fn lenient_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        _ => None,
    }
}

/// Find a list by name, ignoring case and surrounding whitespace
pub fn find_by_name<'a>(lists: &'a [MailingList], name: &str) -> Option<&'a MailingList> {
    lists.iter().find(|l| l.name_matches(name))
}

/// Sign-up visibility for a newly created list
///
/// Private lists do not trigger confirmation emails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Private,
    Public,
}

impl Visibility {
    /// Value of the `signupform` parameter
    pub fn as_param(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Public => "public",
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_param())
    }
}

fn is_duplicate_code(json: &Value) -> bool {
    match json.get("code") {
        Some(Value::Number(n)) => n.as_i64() == Some(DUPLICATE_LIST_CODE),
        Some(Value::String(s)) => s.trim() == DUPLICATE_LIST_CODE.to_string(),
        _ => false,
    }
}

impl CampaignsClient {
    /// Fetch one page of mailing lists, sorted ascending
    pub fn list_all(
        &self,
        token: &AccessToken,
        start_index: u32,
        page_size: u32,
    ) -> ApiResult<Vec<MailingList>> {
        let url = self.campaigns_url("getmailinglists");
        let request = self
            .read(url.clone(), token)
            .with_query("resfmt", "JSON")
            .with_query("fromindex", start_index.to_string())
            .with_query("range", page_size.to_string())
            .with_query("sort", "asc");

        let reply = self.send_checked("getmailinglists", &request)?;
        let json = parse_json(&url, &reply)?;

        let lists: Vec<MailingList> = json
            .get("list_of_details")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(MailingList::from_json).collect())
            .unwrap_or_default();

        tracing::debug!(count = lists.len(), start_index, "Fetched mailing lists");
        Ok(lists)
    }

    /// Create a list seeded with up to 10 emails
    ///
    /// If the name is already taken the existing list's key is returned.
    ///
    /// # Panics
    /// When more than 10 emails are passed.
    pub fn create_list_with_contacts(
        &self,
        token: &AccessToken,
        name: &str,
        description: &str,
        emails: &[String],
        visibility: Visibility,
    ) -> ApiResult<String> {
        assert!(
            emails.len() <= MAX_BATCH_SIZE,
            "a new list takes at most {} initial emails, got {}",
            MAX_BATCH_SIZE,
            emails.len()
        );

        let url = self.campaigns_url("addlistandcontacts");
        let request = self
            .write(url.clone(), token)
            .with_form("resfmt", "JSON")
            .with_form("listname", name)
            .with_form("signupform", visibility.as_param())
            .with_form("mode", "newlist")
            .with_form("listdescription", description)
            .with_form("emailids", emails.join(","));

        let reply = self.send_checked("addlistandcontacts", &request)?;
        let unresolved = || ApiError::ListResolution {
            listname: name.to_string(),
            response: reply.body.clone(),
        };
        let json = reply.json().map_err(|_| unresolved())?;

        let status = json.get("status").and_then(Value::as_str);
        let listkey = json
            .get("listkey")
            .and_then(Value::as_str)
            .filter(|k| !k.is_empty());

        if let (Some("success"), Some(key)) = (status, listkey) {
            tracing::info!(list = name, list_key = key, visibility = %visibility, "Created list");
            return Ok(key.to_string());
        }

        if is_duplicate_code(&json) {
            tracing::info!(list = name, "List name already exists, looking up its key");
            let lists = self.list_all(token, 1, RESOLVE_PAGE_SIZE)?;
            if let Some(existing) = find_by_name(&lists, name) {
                return Ok(existing.key.clone());
            }
        }

        Err(unresolved())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mailing_list_from_json() {
        let list = MailingList::from_json(&json!({
            "listname": "Leads", "listkey": "3z1", "is_public": "false"
        }))
        .unwrap();
        assert_eq!(list.name, "Leads");
        assert_eq!(list.is_public, Some(false));

        let list = MailingList::from_json(&json!({"listkey": "3z2", "is_public": true})).unwrap();
        assert_eq!(list.is_public, Some(true));
        assert_eq!(list.name, "");

        assert!(MailingList::from_json(&json!({"listname": "no key"})).is_none());
    }

    #[test]
    fn test_find_by_name_is_case_insensitive_and_trimmed() {
        let lists = vec![
            MailingList {
                name: "Spring Leads ".to_string(),
                key: "k1".to_string(),
                is_public: None,
            },
            MailingList {
                name: "Other".to_string(),
                key: "k2".to_string(),
                is_public: None,
            },
        ];
        assert_eq!(find_by_name(&lists, "  spring leads").unwrap().key, "k1");
        assert!(find_by_name(&lists, "spring").is_none());
    }

    #[test]
    fn test_duplicate_code_accepts_number_or_string() {
        assert!(is_duplicate_code(&json!({"code": 2205})));
        assert!(is_duplicate_code(&json!({"code": "2205"})));
        assert!(!is_duplicate_code(&json!({"code": "2001"})));
        assert!(!is_duplicate_code(&json!({})));
    }

    #[test]
    fn test_visibility_default_is_private() {
        assert_eq!(Visibility::default(), Visibility::Private);
        assert_eq!(Visibility::Public.as_param(), "public");
    }
}
