//! Run configuration.
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `OPENAI_API_KEY` | `api_key` | none, required for model calls |
//! | `CPCV_MODEL` | `model` | `gpt-4o` |
//! | `OPENAI_BASE_URL` | `endpoint` | `https://api.openai.com/v1` |
//!
//! Rendering and sampling settings have no environment variable; CLI flags
//! override any field.

use crate::models::openai::{OpenAiClient, DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use cpcv_backend::pdf::{DEFAULT_JPEG_QUALITY, DEFAULT_RENDER_SCALE};
use cpcv_backend::RenderOptions;
use cpcv_core::{CpcvError, Result};
use serde::{Deserialize, Serialize};

/// Everything a validation run needs besides the files.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Model API credential
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Model identifier
    pub model: String,
    /// API base URL
    pub endpoint: String,
    /// Sampling temperature
    pub temperature: f64,
    /// PDF page upscale factor
    pub render_scale: f32,
    /// JPEG quality for rendered pages (0-100)
    pub jpeg_quality: u8,
}

impl std::fmt::Debug for ValidatorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("temperature", &self.temperature)
            .field("render_scale", &self.render_scale)
            .field("jpeg_quality", &self.jpeg_quality)
            .finish()
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            render_scale: DEFAULT_RENDER_SCALE,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl ValidatorConfig {
    /// Defaults overlaid with the process environment.
    #[must_use = "returns the configuration"]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`; blank values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            api_key: get("OPENAI_API_KEY"),
            model: get("CPCV_MODEL").unwrap_or(defaults.model),
            endpoint: get("OPENAI_BASE_URL").unwrap_or(defaults.endpoint),
            ..defaults
        }
    }

    /// PDF rendering settings.
    #[must_use = "returns the render options"]
    pub const fn render_options(&self) -> RenderOptions {
        RenderOptions {
            scale: self.render_scale,
            jpeg_quality: self.jpeg_quality,
        }
    }

    /// Model client for this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CpcvError::ModelCall`] when no API key is configured.
    pub fn openai_client(&self) -> Result<OpenAiClient> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| CpcvError::ModelCall("OPENAI_API_KEY not set".to_string()))?;
        Ok(OpenAiClient::new(api_key)
            .with_model(&self.model)
            .with_endpoint(&self.endpoint)
            .with_temperature(self.temperature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ValidatorConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ValidatorConfig::default());
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.render_options(), RenderOptions::default());
        assert!(config.openai_client().unwrap_err().is_model_failure());
    }

    #[test]
    fn test_environment_overrides() {
        let config = ValidatorConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("CPCV_MODEL", "gpt-4o-mini"),
            ("OPENAI_BASE_URL", "   "),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert!(config.openai_client().is_ok());
    }

    #[test]
    fn test_api_key_is_never_printed() {
        let config = ValidatorConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-secret")]));
        assert!(!format!("{config:?}").contains("sk-secret"));
        assert!(!serde_json::to_string(&config).unwrap().contains("sk-secret"));
    }

    #[test]
    fn test_partial_json() {
        let config: ValidatorConfig = serde_json::from_str(r#"{"jpeg_quality": 70}"#).unwrap();
        assert_eq!(config.jpeg_quality, 70);
        assert_eq!(config.model, DEFAULT_MODEL);
    }
}
