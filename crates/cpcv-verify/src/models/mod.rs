//! Reasoning-model boundary.
//!
//! The pipeline talks to the model through [`ReasoningModel`]: one request
//! in, raw answer text out. Parsing the answer is the caller's job.
//!
//! ## Submodules
//!
//! - [`openai`] - `OpenAI` chat-completions client (GPT-4o vision)

pub mod openai;

use async_trait::async_trait;
use cpcv_core::{ContentFragment, Result};

/// One multimodal request: a system instruction plus an ordered list of
/// text and image parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRequest {
    /// Role and output rules for the model
    pub system_instruction: String,
    /// User content, in the order the model must read it
    pub parts: Vec<ContentFragment>,
}

impl ModelRequest {
    /// Number of image parts.
    #[must_use = "returns the number of image parts"]
    pub fn image_count(&self) -> usize {
        self.parts.iter().filter(|p| p.is_image()).count()
    }
}

/// A model able to read the request and answer with a JSON report.
#[async_trait]
pub trait ReasoningModel: Send + Sync {
    /// Short identifier used in logs (e.g. `gpt-4o`).
    fn name(&self) -> &str;

    /// Send `request` and return the raw answer text.
    ///
    /// # Errors
    ///
    /// Returns [`cpcv_core::CpcvError::ModelCall`] on transport or
    /// authentication failure, or when the answer has no content.
    async fn complete(&self, request: &ModelRequest) -> Result<String>;
}
