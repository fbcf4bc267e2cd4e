//! # cpcv-core
//!
//! Types shared by every stage of CPCV (promissory purchase-and-sale
//! contract) validation, and the reconciliation pass applied to the model's
//! answer.
//!
//! ## Overview
//!
//! A validation run:
//! 1. Collects uploaded files into an [`UploadSet`], each tagged with a [`Category`]
//! 2. Converts every file into [`ContentFragment`]s (see `cpcv-backend`)
//! 3. Sends the fragments to a multimodal model in one request (see `cpcv-verify`)
//! 4. Parses the answer into a [`ValidationReport`]
//! 5. Runs [`reconcile`] to drop whitespace/case false positives
//!
//! ## Modules
//!
//! - [`category`] - The four evidence groupings and their payload markers
//! - [`upload`] - Uploaded files and the per-run file collection
//! - [`content`] - Image/text fragments consumed by the model
//! - [`report`] - The structured validation report
//! - [`reconcile`] - Normalization-based false-positive correction
//! - [`error`] - Error type shared by all crates

pub mod category;
pub mod content;
pub mod error;
pub mod reconcile;
pub mod report;
pub mod upload;

pub use category::Category;
pub use content::ContentFragment;
pub use error::{CpcvError, Result};
pub use reconcile::{
    equivalent, normalize, reconcile, reconcile_with, ReconcileOptions, Reconciliation,
};
pub use report::{
    ComparisonItem, ComparisonStatus, DetailedComparison, Discrepancy, Entities, EntityStatus,
    EntitySummary, OverallStatus, Severity, ValidationReport,
};
pub use upload::{UploadSet, UploadedFile};
