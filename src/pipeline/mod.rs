//! Upload-and-enrich pipeline
//!
//! One run moves a contact table into a mailing list in three phases:
//!
//! 1. **Resolve list**: create a new list seeded with the first (up to 10)
//!    valid emails, or use an existing list key. A create that collides with
//!    an existing name resolves to that list.
//! 2. **Bulk add**: the remaining valid emails go out in contiguous batches of
//!    `batch_size`. A failed batch is reported and the run continues.
//! 3. **Enrich**: every row with a valid email is upserted with all of its
//!    mapped fields, one call per row.
//!
//! Any 401 during a run triggers one token refresh and one retry of the same
//! call. Calls are paced with fixed delays from [`UploadSettings`].
//!
//! # Example
//!
//! ```rust,ignore
//! use campaign_loader::pipeline::{ListTarget, LogSink, UploadPipeline};
//!
//! let mut pipeline = UploadPipeline::connect_http(&config)?;
//! let mapping = detect_mapping(&table.headers, pipeline.catalog()).validate(&table.headers)?;
//!
//! let report = pipeline.run(&table, &mapping, &ListTarget::create("Spring leads"), &mut LogSink)?;
//! report.print_summary();
//! ```
//!
//! # Dry Run
//!
//! [`UploadPlan::build`] computes the batches without touching the network:
//!
//! ```rust,ignore
//! let plan = UploadPlan::build(&table, &mapping, &target, 10)?;
//! println!("{} batches, {} rows skipped", plan.batches.len(), plan.skipped_rows);
//! ```
//!
//! [`UploadSettings`]: crate::config::UploadSettings

mod error;
mod events;
mod executor;
mod plan;

pub use error::{PipelineError, PipelineResult};
pub use events::{CollectingSink, LogSink, Phase, ProgressSink, UploadEvent};
pub use executor::{UploadPipeline, UploadReport};
pub use plan::{ListTarget, UploadPlan, partition};
