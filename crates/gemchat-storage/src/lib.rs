//! GemChat Storage - low-level storage layer
//!
//! Byte-level persistence on top of redb. Typed wrappers live in
//! `gemchat-core`, which owns the models and their serialization.
//!
//! # Tables
//!
//! - `kv_store` - named entries (the conversation mapping lives under
//!   `chat-conversations`)

pub mod kv_store;
mod simple_storage;

use anyhow::Result;
use redb::Database;
use std::path::Path;
use std::sync::Arc;

pub use kv_store::KvStoreStorage;
pub use simple_storage::SimpleStorage;

/// Central storage manager that initializes all storage subsystems
pub struct Storage {
    pub kv: KvStoreStorage,
}

impl Storage {
    /// Create a new storage instance at the given path.
    ///
    /// This will create the database file if it doesn't exist and initialize
    /// all required tables.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let db = Arc::new(Database::create(path)?);
        tracing::debug!(path = %path.display(), "Opened storage database");

        let kv = KvStoreStorage::new(db)?;

        Ok(Self { kv })
    }
}
