//! Typed conversation store.
//!
//! The whole [`ConversationMap`] is kept as one JSON document under
//! [`CONVERSATIONS_KEY`]. Every mutation reads the mapping, changes one key
//! and writes the entire mapping back.

use anyhow::{Result, bail};
use gemchat_models::{Conversation, ConversationMap};
use gemchat_storage::KvStoreStorage;

/// Name of the entry holding the conversation mapping.
pub const CONVERSATIONS_KEY: &str = "chat-conversations";

#[derive(Debug, Clone)]
pub struct ConversationStore {
    inner: Option<KvStoreStorage>,
}

impl ConversationStore {
    pub fn new(inner: KvStoreStorage) -> Self {
        Self { inner: Some(inner) }
    }

    /// A store with no backing database. Reads see an empty mapping and
    /// writes fail.
    pub fn unavailable() -> Self {
        Self { inner: None }
    }

    pub fn is_available(&self) -> bool {
        self.inner.is_some()
    }

    /// Load the full mapping. Empty when nothing was saved yet or when the
    /// store has no backing database.
    pub fn load_all(&self) -> Result<ConversationMap> {
        let Some(inner) = &self.inner else {
            return Ok(ConversationMap::new());
        };

        match inner.get_text(CONVERSATIONS_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(ConversationMap::new()),
        }
    }

    /// Get a single conversation by ID.
    pub fn get(&self, id: &str) -> Result<Option<Conversation>> {
        Ok(self.load_all()?.remove(id))
    }

    /// Merge one conversation into the mapping and write the mapping back.
    pub fn save(&self, conversation: &Conversation) -> Result<()> {
        let mut conversations = self.load_all()?;
        conversations.insert(conversation.id.clone(), conversation.clone());
        self.write_all(&conversations)
    }

    /// Remove one conversation and write the mapping back. Returns true if
    /// the id was present.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let mut conversations = self.load_all()?;
        let existed = conversations.remove(id).is_some();
        self.write_all(&conversations)?;
        Ok(existed)
    }

    fn write_all(&self, conversations: &ConversationMap) -> Result<()> {
        let Some(inner) = &self.inner else {
            bail!("Conversation storage is not available");
        };
        let json = serde_json::to_string(conversations)?;
        inner.put_text(CONVERSATIONS_KEY, &json)
    }
}
