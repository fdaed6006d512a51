//! Contact field catalog

use std::collections::BTreeSet;

use super::{ApiError, ApiResult, CampaignsClient, check_status, parse_json};
use crate::auth::AccessToken;

/// Fields assumed to exist when the live catalog is unavailable
pub const FALLBACK_FIELDS: [&str; 6] = [
    "Contact Email",
    "First Name",
    "Last Name",
    "Full Name",
    "Title",
    "Job Title",
];

/// Why the fallback catalog is in use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// The catalog endpoint answered 401
    Unauthorized,
    /// The catalog came back with no fields
    EmptyCatalog,
    /// No catalog was requested (dry runs, previews)
    Offline,
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackReason::Unauthorized => write!(f, "catalog endpoint unauthorized"),
            FallbackReason::EmptyCatalog => write!(f, "empty catalog"),
            FallbackReason::Offline => write!(f, "not fetched"),
        }
    }
}

/// Display names of the contact fields the provider accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldCatalog {
    Live(BTreeSet<String>),
    Fallback {
        names: BTreeSet<String>,
        reason: FallbackReason,
    },
}

impl FieldCatalog {
    /// The built-in minimal catalog
    pub fn fallback(reason: FallbackReason) -> Self {
        FieldCatalog::Fallback {
            names: FALLBACK_FIELDS.iter().map(|s| s.to_string()).collect(),
            reason,
        }
    }

    /// A live catalog, or the fallback when `names` is empty
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            Self::fallback(FallbackReason::EmptyCatalog)
        } else {
            FieldCatalog::Live(names)
        }
    }

    fn set(&self) -> &BTreeSet<String> {
        match self {
            FieldCatalog::Live(names) => names,
            FieldCatalog::Fallback { names, .. } => names,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.set().contains(name)
    }

    pub fn has_full_name(&self) -> bool {
        self.contains("Full Name")
    }

    /// Sorted field names
    pub fn names(&self) -> Vec<&str> {
        self.set().iter().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.set().len()
    }

    pub fn is_empty(&self) -> bool {
        self.set().is_empty()
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, FieldCatalog::Fallback { .. })
    }

    pub fn fallback_reason(&self) -> Option<FallbackReason> {
        match self {
            FieldCatalog::Fallback { reason, .. } => Some(*reason),
            FieldCatalog::Live(_) => None,
        }
    }
}

impl CampaignsClient {
    /// Fetch the contact field catalog
    ///
    /// A 401 or an empty catalog yields [`FieldCatalog::Fallback`]; other
    /// failures are errors.
    pub fn field_catalog(&self, token: &AccessToken) -> ApiResult<FieldCatalog> {
        let url = self.campaigns_url("contact/allfields");
        let request = self.read(url.clone(), token).with_query("type", "json");

        let reply = match check_status("contact/allfields", &url, self.transport.send(&request)?) {
            Ok(reply) => reply,
            Err(ApiError::StaleToken { .. }) => {
                tracing::warn!("Field catalog unauthorized, using fallback fields");
                return Ok(FieldCatalog::fallback(FallbackReason::Unauthorized));
            }
            Err(e) => return Err(e),
        };

        let json = parse_json(&url, &reply)?;
        let names = json
            .pointer("/response/fieldnames/fieldname")
            .and_then(|v| v.as_array())
            .map(|fields| {
                fields
                    .iter()
                    .filter_map(|f| f.get("DISPLAY_NAME").and_then(|v| v.as_str()))
                    .filter(|name| !name.trim().is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let catalog = FieldCatalog::from_names(names);
        if catalog.is_fallback() {
            tracing::warn!("Field catalog is empty, using fallback fields");
        } else {
            tracing::debug!(fields = catalog.len(), "Fetched field catalog");
        }
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_catalog() {
        let catalog = FieldCatalog::fallback(FallbackReason::Unauthorized);
        assert!(catalog.is_fallback());
        assert!(catalog.has_full_name());
        assert!(catalog.contains("Job Title"));
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog.fallback_reason(), Some(FallbackReason::Unauthorized));
    }

    #[test]
    fn test_from_names() {
        let catalog = FieldCatalog::from_names(["Last Name", "Contact Email", "Company"]);
        assert!(!catalog.is_fallback());
        assert!(!catalog.has_full_name());
        assert_eq!(catalog.names(), vec!["Company", "Contact Email", "Last Name"]);

        let empty = FieldCatalog::from_names(Vec::<String>::new());
        assert_eq!(empty.fallback_reason(), Some(FallbackReason::EmptyCatalog));
    }
}
