//! False-positive correction over the model's comparison output.
//!
//! Identification numbers, IBANs and similar codes are routinely written
//! with or without separating spaces, and the model sometimes flags those
//! as mismatches despite being told not to. Two values are *equivalent*
//! when they are identical after removing all whitespace and lower-casing.
//! Equivalent pairs are never reported as mismatches:
//!
//! 1. In each detailed comparison list, an entry with status `MISMATCH` and
//!    two non-empty equivalent values becomes `MATCH`.
//! 2. A discrepancy whose two non-empty values are equivalent is dropped.
//!
//! Only statuses and list membership change; compared values are left as
//! the model wrote them and surviving entries keep their order.
//!
//! ## Example
//!
//! ```
//! use cpcv_core::{reconcile, ValidationReport};
//!
//! let report = ValidationReport::from_json(r#"{
//!     "overallStatus": "INVALID",
//!     "entities": {
//!         "owners": { "status": "MATCH" },
//!         "buyers": { "status": "MISMATCH" },
//!         "property": { "status": "MATCH" }
//!     },
//!     "discrepancies": [
//!         { "severity": "CRITICAL", "field": "NIF",
//!           "sourceDocValue": "123 456 789", "cpcvValue": "123456789" }
//!     ],
//!     "detailedComparison": {
//!         "buyers": [
//!             { "field": "NIF", "sourceValue": "123 456 789",
//!               "cpcvValue": "123456789", "status": "MISMATCH" }
//!         ]
//!     }
//! }"#)?;
//!
//! let report = reconcile(report);
//! assert!(report.discrepancies.is_empty());
//! # Ok::<(), serde_json::Error>(())
//! ```

use crate::report::{
    ComparisonItem, ComparisonStatus, DetailedComparison, Discrepancy, EntityStatus,
    EntitySummary, ValidationReport,
};
use tracing::info;

/// Knobs for [`reconcile_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ReconcileOptions {
    /// Upgrade an entity summary from `MISMATCH` to `MATCH` when every entry
    /// of its corrected detailed list is `MATCH`.
    ///
    /// Off by default: the model's summary is kept verbatim.
    pub recompute_entity_status: bool,
}

/// A reconciled report plus what was changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// The corrected report
    pub report: ValidationReport,
    /// Detailed comparison entries turned from `MISMATCH` into `MATCH`
    pub corrected_comparisons: usize,
    /// Discrepancies removed as whitespace/case noise
    pub removed_discrepancies: usize,
    /// Entity summaries upgraded (only with `recompute_entity_status`)
    pub upgraded_entities: usize,
}

impl Reconciliation {
    /// True if anything in the report changed.
    #[must_use = "returns whether the report was modified"]
    pub const fn changed(&self) -> bool {
        self.corrected_comparisons + self.removed_discrepancies + self.upgraded_entities > 0
    }
}

/// Normalize a compared value: strip all whitespace, lower-case the rest.
///
/// The byte-order mark (U+FEFF) counts as whitespace. An absent value
/// normalizes to the empty string.
#[must_use = "returns the normalized value"]
pub fn normalize(value: Option<&str>) -> String {
    value
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{feff}')
        .flat_map(char::to_lowercase)
        .collect()
}

/// True when both values are present and non-empty, and identical after
/// normalization.
///
/// An absent or empty value is never equivalent to anything, including
/// another empty value. Whitespace-only values are non-empty, so two of
/// them are equivalent.
#[must_use = "returns whether the two values are equivalent"]
pub fn equivalent(a: Option<&str>, b: Option<&str>) -> bool {
    let present = |v: Option<&str>| v.is_some_and(|s| !s.is_empty());
    present(a) && present(b) && normalize(a) == normalize(b)
}

/// Correct whitespace/case false positives with default options.
#[must_use = "returns the corrected report"]
pub fn reconcile(report: ValidationReport) -> ValidationReport {
    reconcile_with(report, &ReconcileOptions::default()).report
}

/// Correct whitespace/case false positives and report what changed.
///
/// A report without a detailed comparison section is returned unchanged.
#[must_use = "returns the corrected report"]
pub fn reconcile_with(report: ValidationReport, options: &ReconcileOptions) -> Reconciliation {
    let ValidationReport {
        overall_status,
        summary,
        missing_documents_data,
        mut entities,
        discrepancies,
        detailed_comparison,
    } = report;

    let Some(detailed) = detailed_comparison else {
        return Reconciliation {
            report: ValidationReport {
                overall_status,
                summary,
                missing_documents_data,
                entities,
                discrepancies,
                detailed_comparison: None,
            },
            corrected_comparisons: 0,
            removed_discrepancies: 0,
            upgraded_entities: 0,
        };
    };

    let mut corrected_comparisons = 0;
    let detailed = DetailedComparison {
        owners: correct_items(detailed.owners, &mut corrected_comparisons),
        buyers: correct_items(detailed.buyers, &mut corrected_comparisons),
        property: correct_items(detailed.property, &mut corrected_comparisons),
    };

    let before = discrepancies.len();
    let discrepancies: Vec<Discrepancy> = discrepancies
        .into_iter()
        .filter(|d| {
            let noise = equivalent(d.source_doc_value.as_deref(), d.cpcv_value.as_deref());
            if noise {
                info!(
                    field = %d.field,
                    source = d.source_doc_value.as_deref().unwrap_or_default(),
                    cpcv = d.cpcv_value.as_deref().unwrap_or_default(),
                    "Removed false discrepancy"
                );
            }
            !noise
        })
        .collect();
    let removed_discrepancies = before - discrepancies.len();

    let mut upgraded_entities = 0;
    if options.recompute_entity_status {
        for (entity, items) in [
            (&mut entities.owners, &detailed.owners),
            (&mut entities.buyers, &detailed.buyers),
            (&mut entities.property, &detailed.property),
        ] {
            if upgrade_summary(entity, items) {
                upgraded_entities += 1;
            }
        }
    }

    Reconciliation {
        report: ValidationReport {
            overall_status,
            summary,
            missing_documents_data,
            entities,
            discrepancies,
            detailed_comparison: Some(detailed),
        },
        corrected_comparisons,
        removed_discrepancies,
        upgraded_entities,
    }
}

fn correct_items(items: Vec<ComparisonItem>, corrected: &mut usize) -> Vec<ComparisonItem> {
    items
        .into_iter()
        .map(|mut item| {
            if item.status == ComparisonStatus::Mismatch
                && equivalent(item.source_value.as_deref(), item.cpcv_value.as_deref())
            {
                info!(
                    field = %item.field,
                    source = item.source_value.as_deref().unwrap_or_default(),
                    cpcv = item.cpcv_value.as_deref().unwrap_or_default(),
                    "Fixed false mismatch"
                );
                item.status = ComparisonStatus::Match;
                *corrected += 1;
            }
            item
        })
        .collect()
}

fn upgrade_summary(summary: &mut EntitySummary, items: &[ComparisonItem]) -> bool {
    let all_match =
        !items.is_empty() && items.iter().all(|i| i.status == ComparisonStatus::Match);
    if summary.status == EntityStatus::Mismatch && all_match {
        summary.status = EntityStatus::Match;
        true
    } else {
        false
    }
}
