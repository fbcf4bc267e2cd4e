//! `OpenAI` chat-completions client.
//!
//! Sends the whole evidence payload in a single user message: text parts as
//! `text`, image parts as `image_url` data URIs. JSON mode is requested so
//! the answer is a bare object, though fenced answers are still tolerated
//! downstream.
//!
//! ## Example
//!
//! ```no_run
//! use cpcv_verify::models::openai::OpenAiClient;
//! use cpcv_verify::models::{ModelRequest, ReasoningModel};
//!
//! # async fn example() -> cpcv_core::Result<()> {
//! let client = OpenAiClient::new(std::env::var("OPENAI_API_KEY").unwrap_or_default());
//! let request = ModelRequest {
//!     system_instruction: "Answer with a JSON object.".to_string(),
//!     parts: vec![],
//! };
//! let answer = client.complete(&request).await?;
//! println!("{answer}");
//! # Ok(())
//! # }
//! ```

// Clippy pedantic allows:
// - Latency fits in u64 milliseconds
#![allow(clippy::cast_possible_truncation)]

use super::{ModelRequest, ReasoningModel};
use async_trait::async_trait;
use cpcv_core::{ContentFragment, CpcvError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Default API base URL.
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

/// Default sampling temperature; low so repeated runs agree.
pub const DEFAULT_TEMPERATURE: f64 = 0.1;

/// `OpenAI` chat completion request.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    temperature: f64,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    r#type: &'static str,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Plain(String),
    Parts(Vec<Content>),
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Content {
    Text { r#type: &'static str, text: String },
    Image { r#type: &'static str, image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

/// `OpenAI` chat completion response.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// HTTP client for the `OpenAI` chat-completions API.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    temperature: f64,
}

impl OpenAiClient {
    /// Client for [`DEFAULT_MODEL`] at [`DEFAULT_ENDPOINT`].
    #[must_use = "creates OpenAI client with API key"]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Override the model identifier.
    #[must_use = "returns the reconfigured client"]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the base URL (OpenAI-compatible gateways, local proxies).
    #[must_use = "returns the reconfigured client"]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the sampling temperature.
    #[must_use = "returns the reconfigured client"]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    fn chat_request<'a>(&'a self, request: &ModelRequest) -> ChatRequest<'a> {
        let parts = request
            .parts
            .iter()
            .map(|part| match part {
                ContentFragment::Text { text, .. } => Content::Text {
                    r#type: "text",
                    text: text.clone(),
                },
                ContentFragment::Image { mime_type, data } => Content::Image {
                    r#type: "image_url",
                    image_url: ImageUrl {
                        url: format!("data:{mime_type};base64,{data}"),
                    },
                },
            })
            .collect();

        ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: MessageContent::Plain(request.system_instruction.clone()),
                },
                Message {
                    role: "user",
                    content: MessageContent::Parts(parts),
                },
            ],
            temperature: self.temperature,
            response_format: ResponseFormat {
                r#type: "json_object",
            },
        }
    }
}

#[async_trait]
impl ReasoningModel for OpenAiClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &ModelRequest) -> Result<String> {
        let start = Instant::now();
        let body = self.chat_request(request);
        debug!(
            model = %self.model,
            parts = request.parts.len(),
            images = request.image_count(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| CpcvError::ModelCall(format!("Failed to send request to OpenAI: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CpcvError::ModelCall(format!(
                "OpenAI API error ({status}): {error_text}"
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| CpcvError::ModelCall(format!("Failed to parse OpenAI response: {e}")))?;

        let latency_ms = start.elapsed().as_millis() as u64;
        if let Some(usage) = &chat_response.usage {
            info!(
                model = %self.model,
                input_tokens = usage.prompt_tokens,
                output_tokens = usage.completion_tokens,
                latency_ms,
                "Model answered"
            );
        }

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| CpcvError::ModelCall("No response from model".to_string()))
    }
}

/// Extract the JSON object from an answer, handling Markdown code fences.
#[must_use = "returns the JSON portion of the answer"]
pub fn extract_json(text: &str) -> &str {
    let text = text.trim();

    // ```json ... ```
    if text.starts_with("```") {
        if let Some(start) = text.find('\n') {
            let after_first_line = &text[start + 1..];
            if let Some(end) = after_first_line.rfind("```") {
                return after_first_line[..end].trim();
            }
        }
    }

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            return &text[start..=end];
        }
    }

    text
}
