//! Mapping files
//!
//! A mapping can be kept next to a recurring export:
//!
//! ```toml
//! email = "Work Email (Enterprise)"
//! first_name = "First Name"
//! last_name = "Last Name"
//!
//! [[extra]]
//! field = "Job Title"
//! column = "Title"
//! ```

use std::path::Path;

use super::error::{MappingError, MappingResult};
use super::types::MappingDraft;

/// Parse a mapping from TOML text
pub fn parse_mapping(content: &str) -> MappingResult<MappingDraft> {
    toml::from_str(content).map_err(|e| MappingError::Parse(e.to_string()))
}

/// Read a mapping file
pub fn load_mapping(path: &Path) -> MappingResult<MappingDraft> {
    let content = std::fs::read_to_string(path).map_err(|source| MappingError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_mapping(&content)
}

/// Write a mapping file
pub fn save_mapping(path: &Path, draft: &MappingDraft) -> MappingResult<()> {
    let content = toml::to_string_pretty(draft).map_err(|e| MappingError::Parse(e.to_string()))?;
    std::fs::write(path, content).map_err(|source| MappingError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::ExtraFieldMapping;
    use tempfile::TempDir;

    #[test]
    fn test_parse_mapping() {
        let draft = parse_mapping(
            r#"
            email = "Work Email"
            first_name = "First"

            [[extra]]
            field = "Job Title"
            column = "Role"

            [[extra]]
            field = "Company"
            column = "Org"
            "#,
        )
        .unwrap();
        assert_eq!(draft.email.as_deref(), Some("Work Email"));
        assert_eq!(draft.first_name.as_deref(), Some("First"));
        assert!(draft.last_name.is_none());
        assert_eq!(
            draft.extras,
            vec![
                ExtraFieldMapping::new("Job Title", "Role"),
                ExtraFieldMapping::new("Company", "Org"),
            ]
        );
    }

    #[test]
    fn test_parse_mapping_rejects_bad_extra() {
        let result = parse_mapping("[[extra]]\nfield = \"Company\"\n");
        assert!(matches!(result, Err(MappingError::Parse(_))));
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mapping.toml");
        let draft = MappingDraft::new()
            .with_email("email")
            .with_full_name("name")
            .with_extra("Company", "org");

        save_mapping(&path, &draft).unwrap();
        assert_eq!(load_mapping(&path).unwrap(), draft);

        let missing = load_mapping(&temp.path().join("nope.toml"));
        assert!(matches!(missing, Err(MappingError::Read { .. })));
    }
}
