//! GemChat AI - Gemini streaming client and event-stream helpers
//!
//! The backend turns a [`gemchat_models::ChatRequest`] into a single prompt
//! with [`build_prompt`], streams it through a [`TextGenerator`] and
//! re-frames every fragment as a `data: ` event. Clients use
//! [`SseLineDecoder`] to read those events back.

pub mod error;
pub mod gemini;
mod http_client;
pub mod llm;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod prompt;
pub mod sse;

pub use error::{AiError, Result};
pub use gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL, GeminiClient};
pub use llm::{GenerationConfig, TextGenerator, TextStream};
#[cfg(any(test, feature = "test-utils"))]
pub use mock::{MockGenerator, MockStep};
pub use prompt::build_prompt;
pub use sse::{SseLineDecoder, data_field, parse_payload};
