//! Text conversion
//!
//! A [`Converter`] turns raw page content into Markdown. The bundled
//! [`OpenAiConverter`] delegates the work to a language model.

mod openai;

pub use openai::{ConverterConfig, OpenAiConverter, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT};

use crate::error::ConvertError;
use async_trait::async_trait;

/// Converts raw page content into Markdown
#[async_trait]
pub trait Converter: Send + Sync {
    /// Identifier for logging
    fn name(&self) -> &'static str;

    /// Convert `content`; failures are returned, never swallowed
    async fn convert(&self, content: &str) -> Result<String, ConvertError>;
}
