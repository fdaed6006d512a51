//! Upload planning
//!
//! The plan is computed up front from the table and mapping without any
//! network access, so the same value drives both a real run and a dry run.

use serde::Serialize;

use super::error::{PipelineError, PipelineResult};
use crate::api::Visibility;
use crate::config::MAX_BATCH_SIZE;
use crate::contacts::{ContactTable, is_valid_email};
use crate::mapping::FieldMapping;

/// Where contacts go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListTarget {
    /// Create a list seeded with the first emails
    CreateNew {
        name: String,
        description: String,
        visibility: Visibility,
    },
    /// Use a list that already exists
    Existing { key: String },
}

impl ListTarget {
    /// New private list with an empty description
    pub fn create(name: impl Into<String>) -> Self {
        ListTarget::CreateNew {
            name: name.into(),
            description: String::new(),
            visibility: Visibility::Private,
        }
    }

    pub fn existing(key: impl Into<String>) -> Self {
        ListTarget::Existing { key: key.into() }
    }

    pub fn is_create(&self) -> bool {
        matches!(self, ListTarget::CreateNew { .. })
    }

    fn validate(&self) -> PipelineResult<()> {
        match self {
            ListTarget::CreateNew { name, .. } if name.trim().is_empty() => {
                Err(PipelineError::validation("list name cannot be empty"))
            }
            ListTarget::Existing { key } if key.trim().is_empty() => {
                Err(PipelineError::validation("list key cannot be empty"))
            }
            _ => Ok(()),
        }
    }
}

/// What a run will send, batch by batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadPlan {
    /// Rows in the input
    pub total_rows: usize,
    /// Rows whose email is empty or lacks "@"
    pub skipped_rows: usize,
    /// Emails sent with list creation (empty for an existing list)
    pub creation_batch: Vec<String>,
    /// Remaining emails in bulk-add order
    pub batches: Vec<Vec<String>>,
}

impl UploadPlan {
    /// Plan an upload
    ///
    /// Fails when the batch size is outside 1..=10 or the target is blank.
    pub fn build(
        table: &ContactTable,
        mapping: &FieldMapping,
        target: &ListTarget,
        batch_size: usize,
    ) -> PipelineResult<Self> {
        if batch_size == 0 || batch_size > MAX_BATCH_SIZE {
            return Err(PipelineError::validation(format!(
                "batch size must be between 1 and {}, got {}",
                MAX_BATCH_SIZE, batch_size
            )));
        }
        target.validate()?;

        let emails = table.valid_emails(mapping.email_column());
        let skipped_rows = table
            .rows
            .iter()
            .filter(|row| !is_valid_email(mapping.email_of(row)))
            .count();

        let (creation_batch, queue) = if target.is_create() {
            let split = emails.len().min(MAX_BATCH_SIZE);
            (emails[..split].to_vec(), &emails[split..])
        } else {
            (Vec::new(), &emails[..])
        };

        Ok(Self {
            total_rows: table.len(),
            skipped_rows,
            creation_batch,
            batches: partition(queue, batch_size),
        })
    }

    /// Rows that will be enriched
    pub fn valid_rows(&self) -> usize {
        self.total_rows - self.skipped_rows
    }

    /// Emails sent through bulk add
    pub fn queued_emails(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }
}

/// Split emails into contiguous groups of at most `size`
pub fn partition(emails: &[String], size: usize) -> Vec<Vec<String>> {
    emails.chunks(size.max(1)).map(<[String]>::to_vec).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::ContactRow;
    use crate::mapping::MappingDraft;

    fn table(emails: &[&str]) -> (ContactTable, FieldMapping) {
        let headers = vec!["email".to_string()];
        let rows = emails
            .iter()
            .map(|e| ContactRow::from_pairs([("email", *e)]))
            .collect();
        let mapping = MappingDraft::new().with_email("email").validate(&headers).unwrap();
        (ContactTable::new(headers, rows), mapping)
    }

    fn numbered(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("user{}@example.com", i)).collect()
    }

    #[test]
    fn test_partition_is_contiguous_and_ordered() {
        for (n, size) in [(0, 10), (1, 10), (10, 10), (23, 10), (23, 3), (7, 1)] {
            let emails = numbered(n);
            let batches = partition(&emails, size);
            assert_eq!(batches.len(), n.div_ceil(size));
            assert!(batches.iter().all(|b| !b.is_empty() && b.len() <= size));
            assert_eq!(batches.concat(), emails);
        }
    }

    #[test]
    fn test_existing_list_plan() {
        let emails = numbered(23);
        let refs: Vec<&str> = emails.iter().map(String::as_str).collect();
        let (table, mapping) = table(&refs);

        let plan = UploadPlan::build(&table, &mapping, &ListTarget::existing("k"), 10).unwrap();
        assert!(plan.creation_batch.is_empty());
        let sizes: Vec<usize> = plan.batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![10, 10, 3]);
        assert_eq!(plan.skipped_rows, 0);
        assert_eq!(plan.valid_rows(), 23);
    }

    #[test]
    fn test_create_plan_skips_invalid_rows() {
        let (table, mapping) = table(&[
            "a@x.com", "", "nope", "b@x.com", "c@x.com", "d@x.com", "e@x.com", "f@x.com",
            "g@x.com", "h@x.com", "i@x.com", "j@x.com", "k@x.com", "l@x.com",
        ]);

        let plan = UploadPlan::build(&table, &mapping, &ListTarget::create("Leads"), 5).unwrap();
        assert_eq!(plan.creation_batch.len(), 10);
        assert_eq!(plan.creation_batch[0], "a@x.com");
        assert_eq!(plan.creation_batch[1], "b@x.com");
        assert_eq!(plan.batches, vec![vec!["k@x.com".to_string(), "l@x.com".to_string()]]);
        assert_eq!(plan.skipped_rows, 2);
        assert_eq!(plan.queued_emails(), 2);
    }

    #[test]
    fn test_plan_validation() {
        let (table, mapping) = table(&["a@x.com"]);
        assert!(matches!(
            UploadPlan::build(&table, &mapping, &ListTarget::existing("k"), 11),
            Err(PipelineError::Validation(_))
        ));
        assert!(matches!(
            UploadPlan::build(&table, &mapping, &ListTarget::existing("k"), 0),
            Err(PipelineError::Validation(_))
        ));
        assert!(matches!(
            UploadPlan::build(&table, &mapping, &ListTarget::create("  "), 10),
            Err(PipelineError::Validation(_))
        ));
    }
}
