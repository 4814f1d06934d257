pub mod paths;
pub mod session;
pub mod state;
pub mod storage;

pub use gemchat_models as models;
pub use session::{ChatSession, Handled};
pub use state::{ChatEvent, ChatState, Effect};

use anyhow::Result;
use gemchat_models::ChatSettings;
use std::path::Path;
use std::sync::Arc;
use storage::Storage;
use tracing::{info, warn};

/// Core application state shared by the CLI commands and the TUI.
pub struct AppCore {
    pub storage: Arc<Storage>,
}

impl AppCore {
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();
        let storage = Arc::new(Storage::new(db_path)?);

        info!(path = %db_path.display(), "Initializing GemChat storage");

        Ok(Self { storage })
    }

    /// Open the database, or fall back to a store without one. Conversations
    /// then start empty and every save fails.
    pub fn new_or_unavailable(db_path: impl AsRef<Path>) -> Self {
        match Self::new(db_path) {
            Ok(core) => core,
            Err(err) => {
                warn!(error = %err, "Conversation storage unavailable");
                Self::unavailable()
            }
        }
    }

    pub fn unavailable() -> Self {
        Self {
            storage: Arc::new(Storage::unavailable()),
        }
    }

    pub fn open_session(&self, settings: ChatSettings) -> Result<ChatSession> {
        ChatSession::open(self.storage.conversations.clone(), settings)
    }
}
