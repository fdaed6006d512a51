//! Column mapping types and contact record building

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::error::{MappingError, MappingResult};
use crate::api::FieldCatalog;
use crate::contacts::ContactRow;

/// Provider field that identifies a contact
pub const CONTACT_EMAIL: &str = "Contact Email";
pub const FIRST_NAME: &str = "First Name";
pub const LAST_NAME: &str = "Last Name";
pub const FULL_NAME: &str = "Full Name";

/// Provider display name to value, as sent to the upsert call
pub type ContactInfo = BTreeMap<String, String>;

/// One additional provider field filled from a column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraFieldMapping {
    /// Provider display name
    #[serde(rename = "field")]
    pub provider_field: String,
    /// Source column
    pub column: String,
}

impl ExtraFieldMapping {
    pub fn new(provider_field: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            provider_field: provider_field.into(),
            column: column.into(),
        }
    }

    /// Parse `Provider Field=column`
    pub fn parse(spec: &str) -> MappingResult<Self> {
        let (field, column) = spec.split_once('=').ok_or_else(|| {
            MappingError::Parse(format!(
                "extra mapping '{}' must look like 'Provider Field=column'",
                spec
            ))
        })?;
        Ok(Self::new(field.trim(), column.trim()))
    }

    fn is_blank(&self) -> bool {
        self.provider_field.trim().is_empty() || self.column.trim().is_empty()
    }
}

/// An unvalidated mapping, as assembled by a front end
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(rename = "extra")]
    pub extras: Vec<ExtraFieldMapping>,
}

impl MappingDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_email(mut self, column: impl Into<String>) -> Self {
        self.email = Some(column.into());
        self
    }

    pub fn with_first_name(mut self, column: impl Into<String>) -> Self {
        self.first_name = Some(column.into());
        self
    }

    pub fn with_last_name(mut self, column: impl Into<String>) -> Self {
        self.last_name = Some(column.into());
        self
    }

    pub fn with_full_name(mut self, column: impl Into<String>) -> Self {
        self.full_name = Some(column.into());
        self
    }

    pub fn with_extra(
        mut self,
        provider_field: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        self.extras.push(ExtraFieldMapping::new(provider_field, column));
        self
    }

    /// Overlay the slots and extras set in `other`
    ///
    /// Extras from `other` replace extras targeting the same field.
    pub fn merge(mut self, other: MappingDraft) -> Self {
        if other.email.is_some() {
            self.email = other.email;
        }
        if other.first_name.is_some() {
            self.first_name = other.first_name;
        }
        if other.last_name.is_some() {
            self.last_name = other.last_name;
        }
        if other.full_name.is_some() {
            self.full_name = other.full_name;
        }
        for extra in other.extras {
            self.extras
                .retain(|e| e.provider_field.trim() != extra.provider_field.trim());
            self.extras.push(extra);
        }
        self
    }

    /// Check the draft against the file's headers
    ///
    /// Blank extras and extras targeting `Contact Email` are dropped. Every
    /// remaining column must exist and no provider field may repeat.
    pub fn validate(self, headers: &[String]) -> MappingResult<FieldMapping> {
        let known = |column: &str| headers.iter().any(|h| h == column);
        let slot = |name: &str, column: Option<String>| -> MappingResult<Option<String>> {
            match column.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()) {
                Some(c) if !known(&c) => Err(MappingError::UnknownColumn {
                    slot: name.to_string(),
                    column: c,
                }),
                other => Ok(other),
            }
        };

        let email = slot("Email", self.email)?.ok_or(MappingError::MissingEmailColumn)?;
        let first_name = slot(FIRST_NAME, self.first_name)?;
        let last_name = slot(LAST_NAME, self.last_name)?;
        let full_name = slot(FULL_NAME, self.full_name)?;

        let mut extras = Vec::new();
        for extra in self.extras {
            if extra.is_blank() {
                continue;
            }
            let extra = ExtraFieldMapping::new(extra.provider_field.trim(), extra.column.trim());
            if extra.provider_field == CONTACT_EMAIL {
                tracing::warn!(column = %extra.column, "Ignoring extra mapping onto Contact Email");
                continue;
            }
            if !known(&extra.column) {
                return Err(MappingError::UnknownColumn {
                    slot: extra.provider_field,
                    column: extra.column,
                });
            }
            extras.push(extra);
        }

        let mut seen = BTreeSet::new();
        let duplicates: BTreeSet<&str> = extras
            .iter()
            .map(|e| e.provider_field.as_str())
            .filter(|f| !seen.insert(*f))
            .collect();
        if !duplicates.is_empty() {
            return Err(MappingError::DuplicateTargets(
                duplicates.into_iter().map(str::to_string).collect(),
            ));
        }

        Ok(FieldMapping {
            email,
            first_name,
            last_name,
            full_name,
            extras,
        })
    }
}

/// A validated column mapping
///
/// Built once per run by [`MappingDraft::validate`] and not changed after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    full_name: Option<String>,
    extras: Vec<ExtraFieldMapping>,
}

impl FieldMapping {
    pub fn email_column(&self) -> &str {
        &self.email
    }

    pub fn first_name_column(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    pub fn last_name_column(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    pub fn full_name_column(&self) -> Option<&str> {
        self.full_name.as_deref()
    }

    pub fn extras(&self) -> &[ExtraFieldMapping] {
        &self.extras
    }

    /// Trimmed email cell of a row
    pub fn email_of<'a>(&self, row: &'a ContactRow) -> &'a str {
        row.get(&self.email)
    }

    /// Build the upsert payload for one row
    ///
    /// Always contains `Contact Email`; other fields only when their cell is
    /// non-empty. `Full Name` is sent only if the catalog knows it. Extras
    /// are applied last.
    pub fn contact_info(&self, row: &ContactRow, catalog: &FieldCatalog) -> ContactInfo {
        let mut info = ContactInfo::new();
        info.insert(CONTACT_EMAIL.to_string(), self.email_of(row).to_string());

        let mut put = |field: &str, value: &str| {
            if !value.is_empty() {
                info.insert(field.to_string(), value.to_string());
            }
        };

        put(FIRST_NAME, row.get_opt(self.first_name_column()));
        put(LAST_NAME, row.get_opt(self.last_name_column()));
        if catalog.has_full_name() {
            put(FULL_NAME, row.get_opt(self.full_name_column()));
        }
        for extra in &self.extras {
            put(&extra.provider_field, row.get(&extra.column));
        }
        info
    }

    /// Back to an editable draft
    pub fn to_draft(&self) -> MappingDraft {
        MappingDraft {
            email: Some(self.email.clone()),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            full_name: self.full_name.clone(),
            extras: self.extras.clone(),
        }
    }
}
