//! Campaign Loader - upload CSV contact exports into Zoho Campaigns
//!
//! Provides:
//! - OAuth refresh-token authentication
//! - A blocking client for the Campaigns list, subscriber and template APIs
//! - CSV reading with encoding fallback
//! - Column-to-field mapping with auto-detection
//! - The upload-and-enrich pipeline shared by every front end

pub mod api;
pub mod auth;
pub mod config;
pub mod contacts;
pub mod mapping;
pub mod pipeline;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export commonly used types
pub use api::{
    ApiError, CampaignsClient, FieldCatalog, HttpTransport, MailingList, Transport, Visibility,
};
pub use auth::{AccessToken, TokenProvider, TokenSession};
pub use config::{ConfigError, Credentials, Endpoints, LoaderConfig, UploadSettings};
pub use contacts::{ContactRow, ContactTable, ContactsError, CsvReader};
pub use mapping::{ContactInfo, FieldMapping, MappingDraft, MappingError, detect_mapping};
pub use pipeline::{
    ListTarget, PipelineError, ProgressSink, UploadEvent, UploadPipeline, UploadPlan,
    UploadReport,
};
