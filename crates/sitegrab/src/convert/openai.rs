//! OpenAI Responses API converter

use crate::convert::Converter;
use crate::error::ConvertError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Default API root
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Request timeout; model calls on large pages are slow
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Instructions sent ahead of every page
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
Convert the given HTML to Markdown as accurately as possible, following these rules.

- Exclude menus, navigation and other auxiliary elements (<nav>, <menu>, <header>, <footer>, sidebars and the like); convert only the main content.
- Convert prose, lists, images and tables into the appropriate Markdown.
- Preserve the heading hierarchy as closely as possible.
- Render code blocks and quotations with proper Markdown syntax.
- Output only the Markdown text, without any commentary or explanation.
";

/// Conversion service configuration
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// Bearer token for the API
    pub api_key: Option<String>,
    /// Model name
    pub model: String,
    /// API root, without the `/responses` suffix
    pub api_base: String,
    /// System instructions
    pub system_prompt: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            temperature: 0.0,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ConverterConfig {
    /// Default configuration with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    temperature: f32,
    store: bool,
    input: [InputMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct InputMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResponsesBody {
    #[serde(default)]
    output: Vec<OutputItem>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Vec<OutputContent>,
}

#[derive(Debug, Deserialize)]
struct OutputContent {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl ResponsesBody {
    /// Text of the first `output_text` part of the first message
    fn into_text(self) -> Option<String> {
        self.output
            .into_iter()
            .filter(|item| item.kind == "message")
            .flat_map(|item| item.content)
            .find(|part| part.kind == "output_text")
            .and_then(|part| part.text)
    }
}

/// Converter backed by the OpenAI Responses API
#[derive(Debug, Clone)]
pub struct OpenAiConverter {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    config: ConverterConfig,
}

impl OpenAiConverter {
    /// Build a converter; fails without an API key
    pub fn new(config: ConverterConfig) -> Result<Self, ConvertError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConvertError::MissingApiKey)?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ConvertError::ClientBuildError)?;

        let endpoint = format!("{}/responses", config.api_base.trim_end_matches('/'));

        Ok(Self {
            client,
            api_key,
            endpoint,
            config,
        })
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }
}

#[async_trait]
impl Converter for OpenAiConverter {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn convert(&self, content: &str) -> Result<String, ConvertError> {
        let request = ResponsesRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            store: false,
            input: [
                InputMessage {
                    role: "system",
                    content: &self.config.system_prompt,
                },
                InputMessage {
                    role: "user",
                    content,
                },
            ],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ConvertError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(ConvertError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ResponsesBody = response
            .json()
            .await
            .map_err(|e| ConvertError::InvalidResponse(e.to_string()))?;

        if let Some(ref usage) = body.usage {
            debug!(
                model = %self.config.model,
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Conversion usage"
            );
        }

        body.into_text().ok_or(ConvertError::EmptyOutput)
    }
}
