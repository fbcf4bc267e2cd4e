//! Evidence Aggregator: every uploaded file, converted concurrently and
//! reassembled into the category-ordered payload sent to the model.
//!
//! Conversions run on tokio's blocking pool (pdfium and `soffice` block).
//! Handles are awaited in upload order, so the output never depends on
//! which conversion finishes first. The first failure aborts the whole run.

use crate::extractor::ContentExtractor;
use cpcv_core::{Category, ContentFragment, CpcvError, Result, UploadSet};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Converted fragments grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evidence {
    sections: [Vec<ContentFragment>; 4],
}

impl Evidence {
    /// Fragments of one category, in upload then page order.
    #[must_use = "returns the category fragments"]
    pub fn fragments(&self, category: Category) -> &[ContentFragment] {
        &self.sections[category.section_number() - 1]
    }

    /// Total fragments across all categories, markers excluded.
    #[must_use = "returns the fragment count"]
    pub fn fragment_count(&self) -> usize {
        self.sections.iter().map(Vec::len).sum()
    }

    /// Flatten into the model payload: each category's marker followed by
    /// its fragments, categories in canonical order.
    ///
    /// Markers are emitted for empty categories too, so the model can tell
    /// "nothing supplied" apart from "not asked".
    #[must_use = "returns the flattened payload"]
    pub fn into_payload(self) -> Vec<ContentFragment> {
        let mut payload = Vec::with_capacity(self.fragment_count() + Category::ALL.len());
        for (category, fragments) in Category::ALL.into_iter().zip(self.sections) {
            payload.push(ContentFragment::marker(category.section_marker()));
            payload.extend(fragments);
        }
        payload
    }
}

/// Runs a [`ContentExtractor`] over an [`UploadSet`].
#[derive(Clone)]
pub struct EvidenceAggregator {
    extractor: Arc<dyn ContentExtractor>,
}

impl std::fmt::Debug for EvidenceAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvidenceAggregator").finish_non_exhaustive()
    }
}

impl EvidenceAggregator {
    /// Create an aggregator that converts each file with `extractor`.
    #[must_use = "creates an aggregator"]
    pub fn new(extractor: Arc<dyn ContentExtractor>) -> Self {
        Self { extractor }
    }

    /// Convert every file in `files` and group the results by category.
    ///
    /// # Errors
    ///
    /// Returns the first [`CpcvError::Conversion`] in upload order. A
    /// conversion that panics is reported as a conversion error for that file.
    pub async fn aggregate(&self, files: &UploadSet) -> Result<Evidence> {
        let start = Instant::now();

        let mut pending: Vec<(Category, String, JoinHandle<Result<Vec<ContentFragment>>>)> =
            Vec::with_capacity(files.len());
        for category in Category::ALL {
            for file in files.files_for(category) {
                let extractor = Arc::clone(&self.extractor);
                let file = file.clone();
                let name = file.name().to_string();
                let handle = tokio::task::spawn_blocking(move || extractor.extract(&file));
                pending.push((category, name, handle));
            }
        }
        debug!(files = pending.len(), "Spawned conversions");

        // Returning early drops the remaining handles. Blocking conversions
        // cannot be cancelled, so those already started run to completion
        // detached and their output is discarded.
        let mut evidence = Evidence::default();
        for (category, name, handle) in pending {
            let fragments = handle
                .await
                .map_err(|e| CpcvError::conversion(&name, format!("conversion task failed: {e}")))
                .and_then(|converted| converted)
                .inspect_err(|e| warn!(file = %name, error = %e, "Conversion failed"))?;
            evidence.sections[category.section_number() - 1].extend(fragments);
        }

        info!(
            files = files.len(),
            fragments = evidence.fragment_count(),
            elapsed_ms = start.elapsed().as_millis(),
            "Aggregated evidence"
        );
        Ok(evidence)
    }
}
