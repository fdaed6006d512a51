//! Interactive wizard driven by scripted answers

mod common;

use std::io::Cursor;

use campaign_loader::api::{ApiReply, FallbackReason};
use campaign_loader::cli::CliError;
use campaign_loader::cli::commands::interactive::run_wizard;
use campaign_loader::cli::prompt::Prompter;
use campaign_loader::config::UploadSettings;
use campaign_loader::contacts::{ContactTable, CsvReader};
use campaign_loader::pipeline::CollectingSink;
use campaign_loader::FieldCatalog;
use common::*;
use serde_json::json;

fn prompter(answers: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
    Prompter::new(Cursor::new(answers.as_bytes().to_vec()), Vec::new())
}

fn table() -> ContactTable {
    CsvReader::new()
        .read_str(
            "Email,Work,Org,First Name\n\
             a@x.com,ann@work.com,Acme,Ann\n\
             b@x.com,bob@work.com,Beta,Bob\n",
        )
        .unwrap()
}

#[test]
fn test_create_list_with_detected_mapping() {
    let transport = MockTransport::new();
    transport.queue(
        CREATE_PATH,
        [ApiReply::json_ok(json!({"status": "success", "listkey": "new-key"}))],
    );
    let (mut pipeline, _) = pipeline(
        transport.clone(),
        FieldCatalog::fallback(FallbackReason::Offline),
        UploadSettings::without_delays(),
    );
    let mut p = prompter("\n1\nLeads\n\n\n\n");

    let report = run_wizard(
        &mut p,
        &mut pipeline,
        &table(),
        None,
        None,
        &mut CollectingSink::new(),
    )
    .unwrap();

    assert_eq!(report.list_key, "new-key");
    assert_eq!(report.enriched, 2);
    let create = &transport.sent_to(CREATE_PATH)[0];
    assert_eq!(create.form_value("listname"), Some("Leads"));
    assert_eq!(create.form_value("signupform"), Some("private"));
    assert_eq!(create.form_value("emailids"), Some("a@x.com,b@x.com"));
}

#[test]
fn test_pick_existing_list_by_number() {
    let transport = MockTransport::new();
    transport.queue(
        LISTS_PATH,
        [ApiReply::json_ok(json!({"list_of_details": [
            {"listname": "Alpha", "listkey": "alpha-key"},
            {"listname": "Beta", "listkey": "beta-key"}
        ]}))],
    );
    let (mut pipeline, _) = pipeline(
        transport.clone(),
        FieldCatalog::fallback(FallbackReason::Offline),
        UploadSettings::without_delays(),
    );
    let mut p = prompter("\n\n2\ny\n");

    let report = run_wizard(
        &mut p,
        &mut pipeline,
        &table(),
        None,
        None,
        &mut CollectingSink::new(),
    )
    .unwrap();

    assert_eq!(report.list_key, "beta-key");
    let shown = String::from_utf8(p.into_output()).unwrap();
    assert!(shown.contains("  2. Beta   (listkey=beta-key, unknown)"));
}

#[test]
fn test_edited_mapping_and_fixed_list() {
    let transport = MockTransport::new();
    let (mut pipeline, _) = pipeline(
        transport.clone(),
        FieldCatalog::fallback(FallbackReason::Offline),
        UploadSettings::without_delays(),
    );
    let dir = tempfile::tempdir().unwrap();
    let mapping_path = dir.path().join("mapping.toml");
    let mut p = prompter("n\nWork\n\n\n\nCompany=Org\n\n\n");

    let report = run_wizard(
        &mut p,
        &mut pipeline,
        &table(),
        Some("fixed-key"),
        Some(&mapping_path),
        &mut CollectingSink::new(),
    )
    .unwrap();

    assert_eq!(report.list_key, "fixed-key");
    assert_eq!(
        transport.upserts()[0],
        json!({"Contact Email": "ann@work.com", "First Name": "Ann", "Company": "Acme"})
    );

    let saved = campaign_loader::mapping::load_mapping(&mapping_path).unwrap();
    assert_eq!(saved.email.as_deref(), Some("Work"));
    assert_eq!(saved.extras.len(), 1);
}

#[test]
fn test_declining_the_upload_sends_nothing() {
    let transport = MockTransport::new();
    let (mut pipeline, _) = pipeline(
        transport.clone(),
        FieldCatalog::fallback(FallbackReason::Offline),
        UploadSettings::without_delays(),
    );
    let mut p = prompter("\nn\n");

    let result = run_wizard(
        &mut p,
        &mut pipeline,
        &table(),
        Some("fixed-key"),
        None,
        &mut CollectingSink::new(),
    );

    assert!(matches!(result, Err(CliError::Cancelled)));
    assert!(transport.sent().is_empty());
}
