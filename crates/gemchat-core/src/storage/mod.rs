//! Storage layer with typed wrappers around gemchat-storage.

pub mod conversation;

use anyhow::Result;
use std::path::Path;

pub use conversation::{CONVERSATIONS_KEY, ConversationStore};

/// Typed access to the storage components.
pub struct Storage {
    pub conversations: ConversationStore,
}

impl Storage {
    /// Open (or create) the database at the given path.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let inner = gemchat_storage::Storage::new(path)?;
        Ok(Self {
            conversations: ConversationStore::new(inner.kv.clone()),
        })
    }

    /// Storage with no backing database.
    pub fn unavailable() -> Self {
        Self {
            conversations: ConversationStore::unavailable(),
        }
    }
}
