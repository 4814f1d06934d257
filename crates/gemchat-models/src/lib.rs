//! GemChat Models - types shared by the client, the proxy and the backend.
//!
//! - [`Conversation`] / [`ChatMessage`] are what the client persists.
//! - [`ChatRequest`] is the JSON body posted through the proxy.
//! - [`StreamPayload`] is the JSON carried by each `data: ` line of the
//!   response stream.

pub mod conversation;
pub mod request;
pub mod settings;
pub mod stream;

pub use conversation::{
    ChatMessage, ChatRole, Conversation, ConversationMap, DEFAULT_TITLE, TITLE_MAX_CHARS,
    derive_title, most_recent, sorted_by_recency,
};
pub use request::{ChatRequest, GenerationSettings, PromptMessage, PromptRole};
pub use settings::{ChatSettings, DEFAULT_SYSTEM_MESSAGE};
pub use stream::{DATA_PREFIX, StreamPayload};
