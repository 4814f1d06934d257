//! Conversation models for client-side persistence.

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Title given to a conversation before its first message.
pub const DEFAULT_TITLE: &str = "New Chat";

/// Number of characters kept from the first message when deriving a title.
pub const TITLE_MAX_CHARS: usize = 30;

/// Persisted mapping from conversation id to conversation.
pub type ConversationMap = BTreeMap<String, Conversation>;

/// Role of a chat message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// Single message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A conversation as stored under its id in the [`ConversationMap`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// RFC 3339 UTC timestamp, millisecond precision.
    pub created_at: String,
}

impl Conversation {
    /// Create an empty conversation titled [`DEFAULT_TITLE`].
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Create an empty conversation already titled after `content`.
    pub fn titled_from(content: &str) -> Self {
        Self::new().with_title(derive_title(content))
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = created_at.into();
        self
    }

    /// Append a message. The first message fixes the title.
    pub fn add_message(&mut self, message: ChatMessage) {
        if self.messages.is_empty() {
            self.title = derive_title(&message.content);
        }
        self.messages.push(message);
    }

    /// Parsed creation time, `None` if the stored string is not RFC 3339.
    pub fn created_at_time(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.created_at).ok()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// Title derived from a first message: up to [`TITLE_MAX_CHARS`] characters,
/// followed by `...` when the content was longer.
pub fn derive_title(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(TITLE_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Conversation with the latest creation time.
///
/// Unparseable timestamps sort before every valid one; ties break on id so
/// the pick is stable.
pub fn most_recent(conversations: &ConversationMap) -> Option<&Conversation> {
    conversations
        .values()
        .max_by(|a, b| recency_key(a).cmp(&recency_key(b)))
}

/// All conversations, newest first.
pub fn sorted_by_recency(conversations: &ConversationMap) -> Vec<&Conversation> {
    let mut list: Vec<&Conversation> = conversations.values().collect();
    list.sort_by(|a, b| recency_key(b).cmp(&recency_key(a)));
    list
}

fn recency_key(conversation: &Conversation) -> (Option<DateTime<FixedOffset>>, &str) {
    (conversation.created_at_time(), conversation.id.as_str())
}
