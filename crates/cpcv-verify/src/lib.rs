//! # cpcv-verify
//!
//! Cross-checks a CPCV (Contrato-Promessa de Compra e Venda) against the
//! identity and property documents it cites, using a multimodal model, and
//! cleans up the model's whitespace/case false positives.
//!
//! ## Pipeline
//!
//! ```text
//! UploadSet ──► EvidenceAggregator ──► prompt ──► ReasoningModel ──► parse ──► reconcile
//!              (cpcv-backend)                     (OpenAI)                   (cpcv-core)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use cpcv_backend::DocumentExtractor;
//! use cpcv_core::{Category, UploadSet, UploadedFile};
//! use cpcv_verify::{Validator, ValidatorConfig};
//! use std::sync::Arc;
//!
//! # async fn run() -> cpcv_core::Result<()> {
//! let config = ValidatorConfig::from_env();
//! let validator = Validator::new(
//!     Arc::new(DocumentExtractor::new().with_options(config.render_options())),
//!     Arc::new(config.openai_client()?),
//! );
//!
//! let mut files = UploadSet::new();
//! files.add(UploadedFile::new(
//!     Category::Contract,
//!     "cpcv.docx",
//!     "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
//!     std::fs::read("cpcv.docx")?,
//! ));
//!
//! let report = validator.validate(&files).await?;
//! println!("{:?}: {}", report.overall_status, report.summary);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod models;
pub mod pipeline;
pub mod prompt;

pub use config::ValidatorConfig;
pub use models::openai::OpenAiClient;
pub use models::{ModelRequest, ReasoningModel};
pub use pipeline::{parse_report, Validator};
pub use prompt::build_request;
