//! One validation run: aggregate, ask, parse, reconcile.
//!
//! A run is a single model call. Nothing is retried; any failure ends the
//! run with one `error` event and is returned to the caller, who still owns
//! the untouched [`UploadSet`] and can try again.

use crate::models::openai::extract_json;
use crate::models::ReasoningModel;
use crate::prompt::build_request;
use cpcv_backend::{ContentExtractor, EvidenceAggregator};
use cpcv_core::{
    reconcile_with, CpcvError, ReconcileOptions, Reconciliation, Result, UploadSet,
    ValidationReport,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Parse the model's raw answer into a report.
///
/// A surrounding Markdown code fence is tolerated.
///
/// # Errors
///
/// Returns [`CpcvError::MalformedReport`] if the answer is not a report of
/// the agreed shape.
pub fn parse_report(raw: &str) -> Result<ValidationReport> {
    ValidationReport::from_json(extract_json(raw)).map_err(CpcvError::MalformedReport)
}

/// Drives a validation run end to end.
#[derive(Clone)]
pub struct Validator {
    aggregator: EvidenceAggregator,
    model: Arc<dyn ReasoningModel>,
    options: ReconcileOptions,
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("model", &self.model.name())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Validator {
    /// Create a validator that converts files with `extractor` and asks `model`.
    #[must_use = "creates a validator"]
    pub fn new(extractor: Arc<dyn ContentExtractor>, model: Arc<dyn ReasoningModel>) -> Self {
        Self {
            aggregator: EvidenceAggregator::new(extractor),
            model,
            options: ReconcileOptions::default(),
        }
    }

    /// Set the reconciliation options applied to every report.
    #[must_use = "returns the reconfigured validator"]
    pub fn with_options(mut self, options: ReconcileOptions) -> Self {
        self.options = options;
        self
    }

    /// Validate `files` and return the reconciled report.
    ///
    /// # Errors
    ///
    /// Returns [`CpcvError::Conversion`] if any file cannot be converted,
    /// [`CpcvError::ModelCall`] if the model cannot be reached or stays
    /// silent, and [`CpcvError::MalformedReport`] if its answer does not parse.
    pub async fn validate(&self, files: &UploadSet) -> Result<ValidationReport> {
        self.validate_detailed(files).await.map(|r| r.report)
    }

    /// Like [`Validator::validate`], also reporting what reconciliation changed.
    ///
    /// # Errors
    ///
    /// See [`Validator::validate`].
    pub async fn validate_detailed(&self, files: &UploadSet) -> Result<Reconciliation> {
        self.run(files)
            .await
            .inspect_err(|e| error!(error = %e, "Validation failed"))
    }

    async fn run(&self, files: &UploadSet) -> Result<Reconciliation> {
        let start = Instant::now();
        info!(
            files = files.len(),
            model = self.model.name(),
            "Starting validation"
        );

        let evidence = self.aggregator.aggregate(files).await?;
        let request = build_request(evidence.into_payload());
        let raw = self.model.complete(&request).await?;
        let report = parse_report(&raw)?;
        let reconciliation = reconcile_with(report, &self.options);

        info!(
            status = ?reconciliation.report.overall_status,
            corrected = reconciliation.corrected_comparisons,
            removed = reconciliation.removed_discrepancies,
            elapsed_ms = start.elapsed().as_millis(),
            "Validation complete"
        );
        Ok(reconciliation)
    }
}
