//! Scripted text generator for tests.

use std::sync::{Arc, Mutex};

use crate::error::AiError;
use crate::llm::{GenerationConfig, TextGenerator, TextStream};

/// One scripted step of a mock generation.
#[derive(Debug, Clone, PartialEq)]
pub enum MockStep {
    /// Emit a text fragment.
    Text(String),
    /// Fail the stream with an LLM error.
    Error(String),
}

impl MockStep {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }
}

/// Replays the same script for every prompt and records what it was asked.
#[derive(Debug, Clone, Default)]
pub struct MockGenerator {
    steps: Vec<MockStep>,
    calls: Arc<Mutex<Vec<(String, GenerationConfig)>>>,
}

impl MockGenerator {
    pub fn new(steps: Vec<MockStep>) -> Self {
        Self {
            steps,
            calls: Arc::default(),
        }
    }

    /// Generator that streams the given fragments and finishes.
    pub fn from_texts<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(fragments.into_iter().map(MockStep::text).collect())
    }

    /// Prompts received so far, with their sampling parameters.
    pub fn calls(&self) -> Vec<(String, GenerationConfig)> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

impl TextGenerator for MockGenerator {
    fn provider(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    fn generate_stream(&self, prompt: String, config: GenerationConfig) -> TextStream {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((prompt, config));
        }
        let steps = self.steps.clone();

        Box::pin(async_stream::stream! {
            for step in steps {
                match step {
                    MockStep::Text(text) => yield Ok(text),
                    MockStep::Error(message) => {
                        yield Err(AiError::Llm(message));
                        return;
                    }
                }
            }
        })
    }
}
