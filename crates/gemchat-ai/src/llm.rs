//! Streaming text generation seam.

use crate::error::Result;
use futures::Stream;
use gemchat_models::GenerationSettings;
use std::pin::Pin;

/// Stream of text fragments produced by a model.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Sampling parameters for one generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
        }
    }
}

impl From<GenerationSettings> for GenerationConfig {
    fn from(settings: GenerationSettings) -> Self {
        Self {
            temperature: settings.temperature,
            max_output_tokens: settings.max_output_tokens,
            ..Self::default()
        }
    }
}

/// A model that streams its answer to a single prompt.
pub trait TextGenerator: Send + Sync {
    /// Get provider name
    fn provider(&self) -> &str;

    /// Get model name
    fn model(&self) -> &str;

    /// Stream the completion of `prompt`.
    fn generate_stream(&self, prompt: String, config: GenerationConfig) -> TextStream;
}
