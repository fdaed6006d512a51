//! Column auto-detection from common header names

use std::collections::HashMap;

use super::types::MappingDraft;
use crate::api::FieldCatalog;

const EMAIL_ALIASES: &[&str] = &["work email (enterprise)", "email", "work email"];
const FIRST_NAME_ALIASES: &[&str] = &["first name", "nombre", "name"];
const LAST_NAME_ALIASES: &[&str] = &["last name", "apellido", "surname"];
const FULL_NAME_ALIASES: &[&str] = &["full name", "nombre completo"];
const TITLE_ALIASES: &[&str] = &["title"];

/// Guess a mapping from header names
///
/// Headers are compared lowercased and trimmed; the first alias present
/// wins, and among headers equal after folding the last one wins. A title
/// column becomes an extra targeting `Job Title`, or `Title` when only that
/// exists in the catalog.
pub fn detect_mapping(headers: &[String], catalog: &FieldCatalog) -> MappingDraft {
    let by_key: HashMap<String, &String> = headers
        .iter()
        .map(|h| (h.trim().to_lowercase(), h))
        .collect();
    let pick = |aliases: &[&str]| {
        aliases
            .iter()
            .find_map(|alias| by_key.get(*alias).map(|h| h.to_string()))
    };

    let mut draft = MappingDraft {
        email: pick(EMAIL_ALIASES),
        first_name: pick(FIRST_NAME_ALIASES),
        last_name: pick(LAST_NAME_ALIASES),
        full_name: pick(FULL_NAME_ALIASES),
        extras: Vec::new(),
    };

    if let Some(column) = pick(TITLE_ALIASES) {
        let target = ["Job Title", "Title"]
            .into_iter()
            .find(|field| catalog.contains(field));
        if let Some(field) = target {
            draft = draft.with_extra(field, column);
        }
    }

    tracing::debug!(
        email = ?draft.email,
        first_name = ?draft.first_name,
        last_name = ?draft.last_name,
        full_name = ?draft.full_name,
        extras = draft.extras.len(),
        "Detected column mapping"
    );
    draft
}
