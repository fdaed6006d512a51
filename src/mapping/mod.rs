//! Column mapping from CSV headers to provider contact fields
//!
//! A front end assembles a [`MappingDraft`] (from flags, a mapping file, the
//! interactive wizard, or [`detect_mapping`]) and validates it against the
//! file's headers. The resulting [`FieldMapping`] is immutable for the run
//! and turns each row into a [`ContactInfo`] payload.
//!
//! # Example
//!
//! ```rust,ignore
//! use campaign_loader::mapping::{MappingDraft, detect_mapping};
//!
//! let draft = detect_mapping(&table.headers, &catalog)
//!     .merge(MappingDraft::new().with_extra("Company", "Organisation"));
//! let mapping = draft.validate(&table.headers)?;
//!
//! for row in &table.rows {
//!     let info = mapping.contact_info(row, &catalog);
//! }
//! ```

mod detect;
mod error;
mod file;
mod types;

pub use detect::detect_mapping;
pub use error::{MappingError, MappingResult};
pub use file::{load_mapping, parse_mapping, save_mapping};
pub use types::{
    CONTACT_EMAIL, ContactInfo, ExtraFieldMapping, FIRST_NAME, FULL_NAME, FieldMapping,
    LAST_NAME, MappingDraft,
};
