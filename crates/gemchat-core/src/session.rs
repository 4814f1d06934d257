//! Chat session: the state machine wired to the conversation store.

use crate::state::{ChatEvent, ChatState, Effect};
use crate::storage::ConversationStore;
use anyhow::Result;
use gemchat_models::{ChatRequest, ChatSettings};
use tracing::{debug, warn};

/// Outcome of handling one event.
#[derive(Debug, Default)]
pub struct Handled {
    /// Request to send, when the event started one.
    pub request: Option<ChatRequest>,
    /// First persistence failure among the event's effects.
    pub storage_error: Option<anyhow::Error>,
}

impl Handled {
    /// Treat a persistence failure as fatal.
    pub fn into_result(self) -> Result<Option<ChatRequest>> {
        match self.storage_error {
            Some(err) => Err(err),
            None => Ok(self.request),
        }
    }
}

pub struct ChatSession {
    state: ChatState,
    store: ConversationStore,
}

impl ChatSession {
    /// Load every persisted conversation into a fresh state.
    pub fn open(store: ConversationStore, settings: ChatSettings) -> Result<Self> {
        let conversations = store.load_all()?;
        debug!(count = conversations.len(), "Loaded conversations");
        Ok(Self {
            state: ChatState::new(conversations, settings),
            store,
        })
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn storage_available(&self) -> bool {
        self.store.is_available()
    }

    /// Apply an event and carry out every one of its effects.
    ///
    /// A failed write does not stop the remaining effects, so a send still
    /// yields its request when the store is down. The first storage failure
    /// is reported alongside it.
    pub fn handle(&mut self, event: ChatEvent) -> Handled {
        let mut handled = Handled::default();

        for effect in self.state.apply(event) {
            let written = match effect {
                Effect::Persist(conversation) => self.store.save(&conversation),
                Effect::Remove(id) => self.store.delete(&id).map(|_| ()),
                Effect::Dispatch(pending) => {
                    handled.request = Some(pending);
                    Ok(())
                }
            };

            if let Err(err) = written {
                if handled.storage_error.is_some() {
                    warn!(error = %err, "Further storage failure");
                } else {
                    handled.storage_error = Some(err);
                }
            }
        }

        handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use tempfile::tempdir;

    fn setup() -> (ChatSession, ConversationStore, tempfile::TempDir) {
        let temp_dir = tempdir().unwrap();
        let storage = Storage::new(temp_dir.path().join("test.db")).unwrap();
        let store = storage.conversations.clone();
        let session = ChatSession::open(store.clone(), ChatSettings::default()).unwrap();
        (session, store, temp_dir)
    }

    #[test]
    fn test_send_and_finish_persists_both_messages() {
        let (mut session, store, _temp_dir) = setup();

        let request = session
            .handle(ChatEvent::Send("Hi".to_string()))
            .into_result()
            .unwrap();
        assert!(request.is_some());

        let id = session.state().current_id.clone().unwrap();
        assert_eq!(store.get(&id).unwrap().unwrap().messages.len(), 1);

        session
            .handle(ChatEvent::StreamText("Hel".to_string()))
            .into_result()
            .unwrap();
        session
            .handle(ChatEvent::StreamText("lo".to_string()))
            .into_result()
            .unwrap();
        // partial replies are not written
        assert_eq!(store.get(&id).unwrap().unwrap().messages.len(), 1);

        session.handle(ChatEvent::StreamFinished).into_result().unwrap();
        let saved = store.get(&id).unwrap().unwrap();
        assert_eq!(saved.messages.len(), 2);
        assert_eq!(saved.messages[1].content, "Hello");
    }

    #[test]
    fn test_reopen_restores_conversations() {
        let (mut session, store, _temp_dir) = setup();
        session.handle(ChatEvent::NewChat).into_result().unwrap();
        session
            .handle(ChatEvent::Send("Hi".to_string()))
            .into_result()
            .unwrap();
        session.handle(ChatEvent::StreamFinished).into_result().unwrap();

        let reopened = ChatSession::open(store, ChatSettings::default()).unwrap();
        assert_eq!(
            reopened.state().conversations,
            session.state().conversations
        );
        assert!(reopened.state().current_id.is_none());
    }

    #[test]
    fn test_delete_removes_from_store() {
        let (mut session, store, _temp_dir) = setup();
        session.handle(ChatEvent::NewChat).into_result().unwrap();
        let id = session.state().current_id.clone().unwrap();

        session.handle(ChatEvent::Delete(id.clone())).into_result().unwrap();

        assert!(store.get(&id).unwrap().is_none());
    }

    #[test]
    fn test_storage_failure_propagates() {
        let mut session =
            ChatSession::open(ConversationStore::unavailable(), ChatSettings::default()).unwrap();

        assert!(session.state().conversations.is_empty());
        assert!(session.handle(ChatEvent::NewChat).into_result().is_err());
    }

    #[test]
    fn test_send_without_storage_still_dispatches() {
        let mut session =
            ChatSession::open(ConversationStore::unavailable(), ChatSettings::default()).unwrap();

        let handled = session.handle(ChatEvent::Send("Hi".to_string()));
        assert!(handled.storage_error.is_some());
        let request = handled.request.unwrap();
        assert_eq!(request.prompt, "Hi");

        // The reply still completes in memory.
        session.handle(ChatEvent::StreamText("Hello".to_string()));
        let handled = session.handle(ChatEvent::StreamFinished);
        assert!(handled.storage_error.is_some());
        assert!(!session.state().is_loading);
        assert_eq!(session.state().current().unwrap().messages.len(), 2);
    }
}
