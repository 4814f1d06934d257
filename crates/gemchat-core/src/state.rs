//! Chat application state.
//!
//! All UI state transitions go through [`ChatState::apply`]. It mutates the
//! in-memory state and returns the [`Effect`]s the caller has to carry out
//! (persistence and the network request). Nothing here performs I/O.

use gemchat_models::{
    ChatMessage, ChatRequest, ChatSettings, Conversation, ConversationMap, most_recent,
    sorted_by_recency,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// Start an empty conversation and select it.
    NewChat,
    Select(String),
    Delete(String),
    UpdateSettings(ChatSettings),
    /// User submitted a message.
    Send(String),
    /// Text fragment received for the in-flight reply.
    StreamText(String),
    /// The reply stream ended normally.
    StreamFinished,
    /// The request or the stream failed.
    StreamFailed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Write this conversation to the store.
    Persist(Conversation),
    /// Remove this conversation id from the store.
    Remove(String),
    /// Send this request to the chat endpoint.
    Dispatch(ChatRequest),
}

#[derive(Debug, Clone)]
struct InFlight {
    conversation_id: String,
    /// Conversation as it was right after the user message was appended.
    base: Conversation,
    assistant: ChatMessage,
}

#[derive(Debug, Clone, Default)]
pub struct ChatState {
    pub conversations: ConversationMap,
    pub current_id: Option<String>,
    pub is_loading: bool,
    pub settings: ChatSettings,
    pub last_error: Option<String>,
    in_flight: Option<InFlight>,
}

impl ChatState {
    pub fn new(conversations: ConversationMap, settings: ChatSettings) -> Self {
        Self {
            conversations,
            settings,
            ..Self::default()
        }
    }

    /// Currently selected conversation, if the selection is still valid.
    pub fn current(&self) -> Option<&Conversation> {
        self.current_id
            .as_ref()
            .and_then(|id| self.conversations.get(id))
    }

    /// Conversations newest first, as shown in the sidebar.
    pub fn sidebar(&self) -> Vec<&Conversation> {
        sorted_by_recency(&self.conversations)
    }

    pub fn apply(&mut self, event: ChatEvent) -> Vec<Effect> {
        match event {
            ChatEvent::NewChat => self.new_chat(),
            ChatEvent::Select(id) => {
                if self.conversations.contains_key(&id) {
                    self.current_id = Some(id);
                }
                Vec::new()
            }
            ChatEvent::Delete(id) => self.delete(id),
            ChatEvent::UpdateSettings(settings) => {
                self.settings = settings;
                Vec::new()
            }
            ChatEvent::Send(content) => self.send(content),
            ChatEvent::StreamText(text) => {
                self.append_stream_text(&text);
                Vec::new()
            }
            ChatEvent::StreamFinished => self.finish_stream(),
            ChatEvent::StreamFailed(error) => {
                self.is_loading = false;
                self.in_flight = None;
                self.last_error = Some(error);
                Vec::new()
            }
        }
    }

    fn new_chat(&mut self) -> Vec<Effect> {
        let conversation = Conversation::new();
        self.current_id = Some(conversation.id.clone());
        self.conversations
            .insert(conversation.id.clone(), conversation.clone());
        vec![Effect::Persist(conversation)]
    }

    fn delete(&mut self, id: String) -> Vec<Effect> {
        self.conversations.remove(&id);

        if self
            .in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.conversation_id == id)
        {
            self.in_flight = None;
        }

        if self.current_id.as_deref() == Some(id.as_str()) {
            self.current_id = most_recent(&self.conversations).map(|c| c.id.clone());
        }

        vec![Effect::Remove(id)]
    }

    fn send(&mut self, content: String) -> Vec<Effect> {
        if content.trim().is_empty() || self.is_loading {
            return Vec::new();
        }

        let mut effects = Vec::new();

        let conversation = match self.current().cloned() {
            Some(conversation) => conversation,
            None => {
                let conversation = Conversation::titled_from(&content);
                self.current_id = Some(conversation.id.clone());
                self.conversations
                    .insert(conversation.id.clone(), conversation.clone());
                effects.push(Effect::Persist(conversation.clone()));
                conversation
            }
        };

        let mut updated = conversation;
        updated.add_message(ChatMessage::user(content.clone()));
        self.conversations
            .insert(updated.id.clone(), updated.clone());
        effects.push(Effect::Persist(updated.clone()));

        let request = ChatRequest::for_history(&updated.messages, &content, &self.settings);

        self.is_loading = true;
        self.last_error = None;
        self.in_flight = Some(InFlight {
            conversation_id: updated.id.clone(),
            base: updated,
            assistant: ChatMessage::assistant(""),
        });

        effects.push(Effect::Dispatch(request));
        effects
    }

    fn append_stream_text(&mut self, text: &str) {
        let Some(in_flight) = self.in_flight.as_mut() else {
            return;
        };

        in_flight.assistant.content.push_str(text);

        let mut realtime = in_flight.base.clone();
        realtime.messages.push(in_flight.assistant.clone());
        self.conversations
            .insert(in_flight.conversation_id.clone(), realtime);
    }

    fn finish_stream(&mut self) -> Vec<Effect> {
        self.is_loading = false;

        let Some(in_flight) = self.in_flight.take() else {
            return Vec::new();
        };

        let mut finished = in_flight.base;
        finished.messages.push(in_flight.assistant);
        self.conversations
            .insert(in_flight.conversation_id, finished.clone());

        vec![Effect::Persist(finished)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gemchat_models::{ChatRole, DEFAULT_TITLE, PromptRole};

    fn conversation_at(id: &str, created_at: &str) -> Conversation {
        let mut conversation = Conversation::new().with_created_at(created_at);
        conversation.id = id.to_string();
        conversation
    }

    fn state_with(conversations: &[(&str, &str)]) -> ChatState {
        let map = conversations
            .iter()
            .map(|(id, at)| (id.to_string(), conversation_at(id, at)))
            .collect();
        ChatState::new(map, ChatSettings::default())
    }

    fn dispatched(effects: &[Effect]) -> Option<&ChatRequest> {
        effects.iter().find_map(|effect| match effect {
            Effect::Dispatch(request) => Some(request),
            _ => None,
        })
    }

    #[test]
    fn test_new_chat_selects_and_persists() {
        let mut state = ChatState::default();

        let effects = state.apply(ChatEvent::NewChat);

        let current = state.current().unwrap();
        assert_eq!(current.title, DEFAULT_TITLE);
        assert_eq!(effects, vec![Effect::Persist(current.clone())]);
    }

    #[test]
    fn test_new_chat_then_send_hi_sets_title() {
        let mut state = ChatState::default();
        state.apply(ChatEvent::NewChat);

        let effects = state.apply(ChatEvent::Send("Hi".to_string()));

        let current = state.current().unwrap();
        assert_eq!(current.title, "Hi");
        assert_eq!(current.messages.len(), 1);
        assert_eq!(current.messages[0].role, ChatRole::User);
        assert!(state.is_loading);
        assert_eq!(effects.len(), 2);
    }

    #[test]
    fn test_send_without_selection_creates_titled_conversation() {
        let mut state = ChatState::default();
        let content = "abcdefghijklmnopqrstuvwxyz0123456789abcdefghijklmn";

        let effects = state.apply(ChatEvent::Send(content.to_string()));

        let current = state.current().unwrap();
        assert_eq!(current.title, "abcdefghijklmnopqrstuvwxyz0123...");
        assert_eq!(state.conversations.len(), 1);
        // created, then updated with the user message, then the request
        assert_eq!(effects.len(), 3);
        assert!(matches!(&effects[0], Effect::Persist(c) if c.messages.is_empty()));
        assert!(matches!(&effects[1], Effect::Persist(c) if c.messages.len() == 1));
    }

    #[test]
    fn test_send_builds_request_with_system_message_and_history() {
        let mut state = ChatState::default();
        state.settings = ChatSettings::default()
            .with_system_message("Be brief.")
            .with_temperature(0.2);

        let effects = state.apply(ChatEvent::Send("Hi".to_string()));

        let request = dispatched(&effects).unwrap();
        assert_eq!(request.prompt, "Hi");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, PromptRole::System);
        assert_eq!(request.messages[0].content, "Be brief.");
        assert_eq!(request.messages[1].role, PromptRole::User);
        assert!((request.settings.temperature - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_blank_or_concurrent_send_ignored() {
        let mut state = ChatState::default();
        assert!(state.apply(ChatEvent::Send("   \n".to_string())).is_empty());
        assert!(state.conversations.is_empty());

        state.apply(ChatEvent::Send("first".to_string()));
        assert!(state.apply(ChatEvent::Send("second".to_string())).is_empty());
        assert_eq!(state.current().unwrap().messages.len(), 1);
    }

    #[test]
    fn test_stream_fragments_accumulate() {
        let mut state = ChatState::default();
        state.apply(ChatEvent::Send("Hi".to_string()));

        state.apply(ChatEvent::StreamText("Hel".to_string()));
        let current = state.current().unwrap();
        assert_eq!(current.messages.len(), 2);
        assert_eq!(current.messages[1].content, "Hel");

        state.apply(ChatEvent::StreamText("lo".to_string()));
        let current = state.current().unwrap();
        assert_eq!(current.messages.len(), 2);
        assert_eq!(current.messages[1].role, ChatRole::Assistant);
        assert_eq!(current.messages[1].content, "Hello");
        assert!(state.is_loading);
    }

    #[test]
    fn test_stream_finished_persists_final_conversation() {
        let mut state = ChatState::default();
        state.apply(ChatEvent::Send("Hi".to_string()));
        state.apply(ChatEvent::StreamText("Hello".to_string()));

        let effects = state.apply(ChatEvent::StreamFinished);

        assert!(!state.is_loading);
        let current = state.current().unwrap().clone();
        assert_eq!(current.messages[1].content, "Hello");
        assert_eq!(current.title, "Hi");
        assert_eq!(effects, vec![Effect::Persist(current)]);

        // late fragments no longer touch the frozen message
        state.apply(ChatEvent::StreamText("!".to_string()));
        assert_eq!(state.current().unwrap().messages[1].content, "Hello");
    }

    #[test]
    fn test_finished_without_text_appends_empty_reply() {
        let mut state = ChatState::default();
        state.apply(ChatEvent::Send("Hi".to_string()));

        state.apply(ChatEvent::StreamFinished);

        let current = state.current().unwrap();
        assert_eq!(current.messages.len(), 2);
        assert_eq!(current.messages[1].content, "");
    }

    #[test]
    fn test_stream_failed_keeps_partial_in_memory_only() {
        let mut state = ChatState::default();
        state.apply(ChatEvent::Send("Hi".to_string()));
        state.apply(ChatEvent::StreamText("Hel".to_string()));

        let effects = state.apply(ChatEvent::StreamFailed("connection reset".to_string()));

        assert!(effects.is_empty());
        assert!(!state.is_loading);
        assert_eq!(state.last_error.as_deref(), Some("connection reset"));
        assert_eq!(state.current().unwrap().messages[1].content, "Hel");
    }

    #[test]
    fn test_title_not_recomputed_on_later_sends() {
        let mut state = ChatState::default();
        state.apply(ChatEvent::Send("Hi".to_string()));
        state.apply(ChatEvent::StreamFinished);

        state.apply(ChatEvent::Send("A second message that is much longer than thirty".to_string()));

        let current = state.current().unwrap();
        assert_eq!(current.title, "Hi");
        assert_eq!(current.messages.len(), 3);
    }

    #[test]
    fn test_delete_active_selects_latest_created() {
        let mut state = state_with(&[
            ("a", "2024-05-01T10:00:00.000Z"),
            ("b", "2024-05-03T10:00:00.000Z"),
            ("c", "2024-05-02T10:00:00.000Z"),
        ]);
        state.apply(ChatEvent::Select("b".to_string()));

        let effects = state.apply(ChatEvent::Delete("b".to_string()));

        assert_eq!(effects, vec![Effect::Remove("b".to_string())]);
        assert_eq!(state.current_id.as_deref(), Some("c"));
        assert!(!state.conversations.contains_key("b"));
    }

    #[test]
    fn test_delete_inactive_keeps_selection() {
        let mut state = state_with(&[
            ("a", "2024-05-01T10:00:00.000Z"),
            ("b", "2024-05-03T10:00:00.000Z"),
        ]);
        state.apply(ChatEvent::Select("a".to_string()));

        state.apply(ChatEvent::Delete("b".to_string()));

        assert_eq!(state.current_id.as_deref(), Some("a"));
    }

    #[test]
    fn test_delete_last_clears_selection() {
        let mut state = state_with(&[("a", "2024-05-01T10:00:00.000Z")]);
        state.apply(ChatEvent::Select("a".to_string()));

        state.apply(ChatEvent::Delete("a".to_string()));

        assert!(state.current_id.is_none());
        assert!(state.current().is_none());
    }

    #[test]
    fn test_delete_streaming_conversation_drops_reply() {
        let mut state = ChatState::default();
        state.apply(ChatEvent::Send("Hi".to_string()));
        let id = state.current_id.clone().unwrap();

        state.apply(ChatEvent::Delete(id.clone()));
        state.apply(ChatEvent::StreamText("late".to_string()));
        let effects = state.apply(ChatEvent::StreamFinished);

        assert!(effects.is_empty());
        assert!(!state.conversations.contains_key(&id));
        assert!(!state.is_loading);
    }

    #[test]
    fn test_select_unknown_id_ignored() {
        let mut state = state_with(&[("a", "2024-05-01T10:00:00.000Z")]);
        state.apply(ChatEvent::Select("zzz".to_string()));
        assert!(state.current_id.is_none());
    }

    #[test]
    fn test_sidebar_newest_first() {
        let state = state_with(&[
            ("a", "2024-05-01T10:00:00.000Z"),
            ("b", "2024-05-03T10:00:00.000Z"),
        ]);
        let ids: Vec<&str> = state.sidebar().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }
}
