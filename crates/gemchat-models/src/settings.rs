//! Client-side chat settings.

use crate::request::GenerationSettings;
use serde::{Deserialize, Serialize};

pub const MIN_TEMPERATURE: f32 = 0.0;
pub const MAX_TEMPERATURE: f32 = 1.0;
pub const MIN_OUTPUT_TOKENS: u32 = 100;
pub const MAX_OUTPUT_TOKENS: u32 = 8192;

pub const DEFAULT_SYSTEM_MESSAGE: &str = "You are a knowledgeable and articulate AI assistant. \
Maintain a natural, conversational tone while providing accurate and thoughtful responses. \
Aim for clarity and precision in your explanations, using plain language that's easy to understand. \
Create some sort of opening sentence or two that sets the tone for the conversation. \
While you can occasionally use an emoji when truly appropriate, prefer clear writing over decorative elements. \
Structure your responses in a logical way, and feel free to use examples or analogies when they help illustrate complex concepts. \
Of course, you can be approachable and friendly, but do not try to sound too enthusiastic or casual. \
Always respond in English, unless the user asks you to respond in a different language.";

/// Settings applied to every request sent from the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatSettings {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub system_message: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 4096,
            system_message: DEFAULT_SYSTEM_MESSAGE.to_string(),
        }
    }
}

impl ChatSettings {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE);
        self
    }

    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = tokens.clamp(MIN_OUTPUT_TOKENS, MAX_OUTPUT_TOKENS);
        self
    }

    pub fn with_system_message(mut self, message: impl Into<String>) -> Self {
        self.system_message = message.into();
        self
    }

    /// Shift temperature by `delta`, staying within range. Rounded to two
    /// decimals to match the 0.01 slider step.
    pub fn adjust_temperature(&mut self, delta: f32) {
        let next = ((self.temperature + delta) * 100.0).round() / 100.0;
        self.temperature = next.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE);
    }

    pub fn adjust_max_output_tokens(&mut self, delta: i64) {
        let next = (self.max_output_tokens as i64 + delta)
            .clamp(MIN_OUTPUT_TOKENS as i64, MAX_OUTPUT_TOKENS as i64);
        self.max_output_tokens = next as u32;
    }

    pub fn generation(&self) -> GenerationSettings {
        GenerationSettings {
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        }
    }
}
