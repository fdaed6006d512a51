//! Upload executor: resolve list, bulk add, enrich

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use super::error::{PipelineError, PipelineResult};
use super::events::{Phase, ProgressSink, UploadEvent};
use super::plan::{ListTarget, UploadPlan};
use crate::api::{
    ApiResult, CampaignsClient, FieldCatalog, HttpTransport, Sleeper, ThreadSleeper, Transport,
};
use crate::auth::{AccessToken, TokenProvider, TokenSession};
use crate::config::{LoaderConfig, UploadSettings};
use crate::contacts::{ContactTable, is_valid_email};
use crate::mapping::FieldMapping;

/// Runs uploads against one provider account
///
/// Holds the only mutable shared state of a run: the current access token.
pub struct UploadPipeline {
    client: CampaignsClient,
    session: TokenSession,
    catalog: FieldCatalog,
    settings: UploadSettings,
    sleeper: Arc<dyn Sleeper>,
}

impl UploadPipeline {
    pub fn new(
        client: CampaignsClient,
        session: TokenSession,
        catalog: FieldCatalog,
        settings: UploadSettings,
    ) -> Self {
        Self {
            client,
            session,
            catalog,
            settings,
            sleeper: Arc::new(ThreadSleeper),
        }
    }

    /// Authenticate and fetch the field catalog
    ///
    /// The config is validated first. A failed token exchange is
    /// [`PipelineError::Auth`].
    pub fn connect(config: &LoaderConfig, transport: Arc<dyn Transport>) -> PipelineResult<Self> {
        config.validate()?;

        let provider = TokenProvider::new(
            transport.clone(),
            &config.endpoints,
            config.credentials.clone(),
        )
        .with_timeout(config.upload.read_timeout());
        let session = TokenSession::start(provider).map_err(PipelineError::Auth)?;

        let client = CampaignsClient::new(transport, &config.endpoints, &config.upload);
        let catalog = client
            .field_catalog(session.token())
            .map_err(PipelineError::Api)?;

        Ok(Self::new(client, session, catalog, config.upload.clone()))
    }

    /// Connect over HTTP
    pub fn connect_http(config: &LoaderConfig) -> PipelineResult<Self> {
        let transport =
            HttpTransport::new(config.endpoints.auth_scheme.clone()).map_err(PipelineError::Api)?;
        Self::connect(config, Arc::new(transport))
    }

    /// Replace the sleeper used for pacing and backoff
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.client = self.client.with_sleeper(sleeper.clone());
        self.sleeper = sleeper;
        self
    }

    pub fn client(&self) -> &CampaignsClient {
        &self.client
    }

    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    pub fn token(&self) -> &AccessToken {
        self.session.token()
    }

    pub fn settings(&self) -> &UploadSettings {
        &self.settings
    }

    /// Plan a run without sending anything
    pub fn plan(
        &self,
        table: &ContactTable,
        mapping: &FieldMapping,
        target: &ListTarget,
    ) -> PipelineResult<UploadPlan> {
        UploadPlan::build(table, mapping, target, self.settings.batch_size)
    }

    /// Run a call, refreshing the token and retrying once on a 401
    ///
    /// A failed refresh is returned as the call's error.
    fn call_with_refresh<T>(
        &mut self,
        phase: Phase,
        sink: &mut dyn ProgressSink,
        mut call: impl FnMut(&CampaignsClient, &AccessToken) -> ApiResult<T>,
    ) -> ApiResult<(T, bool)> {
        match call(&self.client, self.session.token()) {
            Err(e) if e.is_stale_token() => {
                warn!(phase = phase.name(), error = %e, "Access token rejected, refreshing");
                self.session.refresh()?;
                sink.on_event(&UploadEvent::TokenRefreshed { phase });
                call(&self.client, self.session.token()).map(|value| (value, true))
            }
            other => other.map(|value| (value, false)),
        }
    }

    fn pause(&self, delay: Duration) {
        self.sleeper.sleep(delay);
    }

    /// Upload and enrich every row of `table`
    ///
    /// Only validation, list resolution and configuration problems abort.
    /// Failed batches and rows are reported to `sink` and the run goes on.
    pub fn run(
        &mut self,
        table: &ContactTable,
        mapping: &FieldMapping,
        target: &ListTarget,
        sink: &mut dyn ProgressSink,
    ) -> PipelineResult<UploadReport> {
        self.settings.validate()?;
        let plan = self.plan(table, mapping, target)?;

        let run_id = Uuid::new_v4().to_string();
        let _span = info_span!("upload_run", run_id = %run_id).entered();
        let started_at = Utc::now();
        let start = Instant::now();
        let refreshes_before = self.session.refreshes();

        info!(
            rows = plan.total_rows,
            valid = plan.valid_rows(),
            skipped = plan.skipped_rows,
            batches = plan.batches.len(),
            create = target.is_create(),
            "Starting upload"
        );
        sink.on_event(&UploadEvent::Started {
            run_id: run_id.clone(),
            total_rows: plan.total_rows,
            valid_rows: plan.valid_rows(),
            batches: plan.batches.len(),
        });

        let list_key = self.resolve_list(target, &plan, sink)?;
        sink.on_event(&UploadEvent::ListResolved {
            list_key: list_key.clone(),
            created: target.is_create(),
        });

        self.bulk_phase(&list_key, &plan, sink);
        let (enriched, errors) = self.enrich_phase(&list_key, table, mapping, sink);
        sink.on_event(&UploadEvent::Finished { enriched, errors });

        let duration = start.elapsed();
        info!(
            list_key = %list_key,
            enriched,
            errors,
            duration_ms = duration.as_millis() as u64,
            "Upload completed"
        );

        Ok(UploadReport {
            run_id,
            list_key,
            list_created: target.is_create(),
            enriched,
            errors,
            skipped_rows: plan.skipped_rows,
            token_refreshes: self.session.refreshes() - refreshes_before,
            started_at,
            duration_ms: duration.as_millis() as u64,
        })
    }

    fn resolve_list(
        &mut self,
        target: &ListTarget,
        plan: &UploadPlan,
        sink: &mut dyn ProgressSink,
    ) -> PipelineResult<String> {
        match target {
            ListTarget::Existing { key } => Ok(key.trim().to_string()),
            ListTarget::CreateNew {
                name,
                description,
                visibility,
            } => {
                let _span = info_span!("create_list", list = %name).entered();
                let (key, _) = self
                    .call_with_refresh(Phase::CreateList, sink, |client, token| {
                        client.create_list_with_contacts(
                            token,
                            name,
                            description,
                            &plan.creation_batch,
                            *visibility,
                        )
                    })
                    .map_err(PipelineError::ListResolution)?;
                Ok(key)
            }
        }
    }

    fn bulk_phase(&mut self, list_key: &str, plan: &UploadPlan, sink: &mut dyn ProgressSink) {
        let total = plan.batches.len();
        let delay = self.settings.bulk_delay();

        for (i, batch) in plan.batches.iter().enumerate() {
            let index = i + 1;
            let _span = info_span!("bulk_batch", batch = index, size = batch.len()).entered();

            let result = self.call_with_refresh(Phase::Bulk, sink, |client, token| {
                client.add_batch(token, list_key, batch)
            });
            match result {
                Ok((response, after_refresh)) => {
                    debug!(summary = %response.summary(), after_refresh, "Batch accepted");
                    sink.on_event(&UploadEvent::BatchCompleted {
                        index,
                        total,
                        size: batch.len(),
                        summary: response.summary(),
                        after_refresh,
                    });
                }
                Err(e) => {
                    warn!(error = %e, "Batch failed, continuing");
                    sink.on_event(&UploadEvent::BatchFailed {
                        index,
                        total,
                        size: batch.len(),
                        error: e.to_string(),
                    });
                }
            }

            self.pause(delay);
        }
    }

    fn enrich_phase(
        &mut self,
        list_key: &str,
        table: &ContactTable,
        mapping: &FieldMapping,
        sink: &mut dyn ProgressSink,
    ) -> (usize, usize) {
        let delay = self.settings.row_delay();
        let mut enriched = 0;
        let mut errors = 0;

        for (row_index, row) in table.rows.iter().enumerate() {
            let email = mapping.email_of(row);
            if !is_valid_email(email) {
                sink.on_event(&UploadEvent::RowSkipped { row: row_index });
                continue;
            }

            let info = mapping.contact_info(row, &self.catalog);
            let result = self.call_with_refresh(Phase::Enrich, sink, |client, token| {
                client.upsert_contact(token, list_key, &info)
            });
            match result {
                Ok(_) => {
                    enriched += 1;
                    sink.on_event(&UploadEvent::RowEnriched {
                        row: row_index,
                        email: email.to_string(),
                    });
                }
                Err(e) => {
                    errors += 1;
                    warn!(row = row_index, email = %email, error = %e, "Contact update failed");
                    sink.on_event(&UploadEvent::RowFailed {
                        row: row_index,
                        email: email.to_string(),
                        error: e.to_string(),
                    });
                }
            }

            self.pause(delay);
        }

        (enriched, errors)
    }
}

/// Outcome of one run
#[derive(Debug, Clone)]
pub struct UploadReport {
    pub run_id: String,
    pub list_key: String,
    /// Whether the list was created by this run
    pub list_created: bool,
    /// Rows whose contact was updated
    pub enriched: usize,
    /// Rows whose update failed
    pub errors: usize,
    /// Rows without a usable email
    pub skipped_rows: usize,
    pub token_refreshes: u32,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl UploadReport {
    /// True when every attempted row was enriched
    pub fn is_clean(&self) -> bool {
        self.errors == 0
    }

    /// Get formatted duration
    pub fn duration_formatted(&self) -> String {
        let secs = self.duration_ms / 1000;
        let mins = secs / 60;
        let remaining_secs = secs % 60;

        if mins > 0 {
            format!("{}m {}s", mins, remaining_secs)
        } else {
            format!("{}s", secs)
        }
    }

    /// Print summary to stderr
    pub fn print_summary(&self) {
        eprintln!();
        eprintln!("Upload {} finished", self.run_id);
        eprintln!("List key: {}", self.list_key);
        eprintln!("Duration: {}", self.duration_formatted());
        eprintln!("Contacts enriched: {}", self.enriched);
        eprintln!("Errors: {}", self.errors);
        if self.skipped_rows > 0 {
            eprintln!("Rows skipped (no valid email): {}", self.skipped_rows);
        }
        if self.token_refreshes > 0 {
            eprintln!("Token refreshes: {}", self.token_refreshes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(duration_ms: u64, errors: usize) -> UploadReport {
        UploadReport {
            run_id: "run-1".to_string(),
            list_key: "k".to_string(),
            list_created: false,
            enriched: 3,
            errors,
            skipped_rows: 0,
            token_refreshes: 0,
            started_at: Utc::now(),
            duration_ms,
        }
    }

    #[test]
    fn test_report_duration() {
        assert_eq!(report(65_000, 0).duration_formatted(), "1m 5s");
        assert_eq!(report(4_200, 0).duration_formatted(), "4s");
    }

    #[test]
    fn test_report_clean() {
        assert!(report(0, 0).is_clean());
        assert!(!report(0, 1).is_clean());
    }
}
