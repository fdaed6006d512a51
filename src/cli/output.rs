//! Output formatting for CLI

use crate::api::{FieldCatalog, MailingList, TemplateSummary};
use crate::contacts::ContactTable;
use crate::mapping::{FieldMapping, MappingDraft};
use crate::pipeline::{ListTarget, UploadPlan, UploadReport};

/// Printed after a run and before creating a public list
pub const VISIBILITY_NOTE: &str = "Note: private lists do not send confirmation emails. \
Contacts added to public lists may receive a confirmation email, depending on the list settings.";

fn public_flag(list: &MailingList) -> &'static str {
    match list.is_public {
        Some(true) => "public",
        Some(false) => "private",
        None => "unknown",
    }
}

/// Numbered list directory
pub fn format_lists(lists: &[MailingList]) -> String {
    if lists.is_empty() {
        return "No mailing lists found.\n".to_string();
    }
    let mut output = String::new();
    for (i, list) in lists.iter().enumerate() {
        output.push_str(&format!(
            "{:3}. {}   (listkey={}, {})\n",
            i + 1,
            list.name,
            list.key,
            public_flag(list)
        ));
    }
    output
}

/// Field catalog with a note when it is the fallback set
pub fn format_catalog(catalog: &FieldCatalog) -> String {
    let mut output = String::new();
    if let Some(reason) = catalog.fallback_reason() {
        output.push_str(&format!(
            "⚠️  Using built-in fallback fields ({})\n",
            reason
        ));
    }
    output.push_str(&format!("{} contact field(s):\n", catalog.len()));
    for name in catalog.names() {
        output.push_str(&format!("  - {}\n", name));
    }
    output
}

/// Template listing
pub fn format_templates(templates: &[TemplateSummary]) -> String {
    if templates.is_empty() {
        return "No templates found in that range.\n".to_string();
    }
    let mut output = String::new();
    for t in templates {
        output.push_str(&format!("  {}  {}\n", t.id, t.name));
    }
    output
}

/// Draft or validated mapping, one slot per line
pub fn format_draft(draft: &MappingDraft) -> String {
    let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "(none)".to_string());
    let mut output = String::new();
    output.push_str(&format!("  Email      <- {}\n", show(&draft.email)));
    output.push_str(&format!("  First Name <- {}\n", show(&draft.first_name)));
    output.push_str(&format!("  Last Name  <- {}\n", show(&draft.last_name)));
    output.push_str(&format!("  Full Name  <- {}\n", show(&draft.full_name)));
    for extra in &draft.extras {
        output.push_str(&format!("  {} <- {}\n", extra.provider_field, extra.column));
    }
    output
}

pub fn format_mapping(mapping: &FieldMapping) -> String {
    format_draft(&mapping.to_draft())
}

/// Headers, size and the first `rows` rows of a table
pub fn format_preview(table: &ContactTable, rows: usize) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{} row(s), {} column(s), decoded as {}\n",
        table.len(),
        table.headers.len(),
        table.encoding
    ));
    output.push_str(&format!("Columns: {}\n", table.headers.join(", ")));
    for (i, row) in table.rows.iter().take(rows).enumerate() {
        let cells: Vec<String> = table
            .headers
            .iter()
            .map(|h| format!("{}={}", h, row.get(h)))
            .collect();
        output.push_str(&format!("{:4}: {}\n", i + 1, cells.join(" | ")));
    }
    output
}

/// Dry-run plan
pub fn format_plan(plan: &UploadPlan, target: &ListTarget, mapping: &FieldMapping) -> String {
    let mut output = String::new();
    output.push_str("DRY RUN - nothing will be sent\n\n");
    match target {
        ListTarget::CreateNew {
            name, visibility, ..
        } => output.push_str(&format!("Target: new {} list '{}'\n", visibility, name)),
        ListTarget::Existing { key } => {
            output.push_str(&format!("Target: existing list {}\n", key))
        }
    }
    output.push_str("Mapping:\n");
    output.push_str(&format_mapping(mapping));
    output.push_str(&format!(
        "\nRows: {} total, {} with a valid email, {} skipped\n",
        plan.total_rows,
        plan.valid_rows(),
        plan.skipped_rows
    ));
    if target.is_create() {
        output.push_str(&format!(
            "Sent with list creation: {} email(s)\n",
            plan.creation_batch.len()
        ));
    }
    output.push_str(&format!(
        "Bulk batches: {} ({} email(s))\n",
        plan.batches.len(),
        plan.queued_emails()
    ));
    for (i, batch) in plan.batches.iter().enumerate() {
        output.push_str(&format!("  Batch {}/{}: {} email(s)\n", i + 1, plan.batches.len(), batch.len()));
    }
    output.push_str(&format!("Contact updates: {}\n", plan.valid_rows()));
    output
}

/// One-line outcome for scripts
pub fn format_report_line(report: &UploadReport) -> String {
    format!(
        "list_key={} enriched={} errors={} skipped={}",
        report.list_key, report.enriched, report.errors, report.skipped_rows
    )
}

/// Warning shown when some rows were not enriched
pub fn format_error_warning(report: &UploadReport) -> Option<String> {
    if report.is_clean() {
        return None;
    }
    Some(format!(
        "Warning: {} contact(s) were not updated. See the messages above.",
        report.errors
    ))
}
