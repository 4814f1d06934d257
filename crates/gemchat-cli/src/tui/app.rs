use crate::client::{ChatClient, StreamEvent};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use gemchat_core::{ChatEvent, ChatSession, ChatState};
use gemchat_models::{ChatRequest, ChatSettings};
use tokio::sync::mpsc;
use tracing::warn;
use unicode_width::UnicodeWidthChar;

const TEMPERATURE_STEP: f32 = 0.05;
const TOKENS_STEP: i64 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuiMode {
    Chat,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    Temperature,
    MaxOutputTokens,
}

pub struct ChatTui {
    session: ChatSession,
    client: ChatClient,
    events: Option<mpsc::UnboundedReceiver<StreamEvent>>,
    pub input: String,
    pub cursor_position: usize,
    pub mode: TuiMode,
    pub settings_draft: ChatSettings,
    pub settings_field: SettingsField,
    /// Transient notice shown in the status line.
    pub notice: Option<String>,
    pub should_quit: bool,
}

impl ChatTui {
    pub fn new(session: ChatSession, client: ChatClient) -> Self {
        let settings = session.state().settings.clone();
        let notice = (!session.storage_available())
            .then(|| "Storage unavailable: conversations will not be saved".to_string());
        Self {
            session,
            client,
            events: None,
            input: String::new(),
            cursor_position: 0,
            mode: TuiMode::Chat,
            settings_draft: settings,
            settings_field: SettingsField::Temperature,
            notice,
            should_quit: false,
        }
    }

    pub fn state(&self) -> &ChatState {
        self.session.state()
    }

    pub fn proxy_url(&self) -> &str {
        self.client.proxy_url()
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.mode {
            TuiMode::Chat => self.handle_chat_key(key, ctrl),
            TuiMode::Settings => self.handle_settings_key(key),
        }
    }

    fn handle_chat_key(&mut self, key: KeyEvent, ctrl: bool) {
        match key.code {
            KeyCode::Char('n') if ctrl => {
                self.dispatch(ChatEvent::NewChat);
            }
            KeyCode::Char('d') if ctrl => self.delete_current(),
            KeyCode::Char('s') if ctrl => self.open_settings(),
            KeyCode::Char('k') if ctrl => self.select_previous(),
            KeyCode::Char('j') if ctrl => self.select_next(),
            KeyCode::Up => self.select_previous(),
            KeyCode::Down => self.select_next(),
            KeyCode::Enter => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.enter_char('\n');
                } else {
                    self.submit();
                }
            }
            KeyCode::Backspace => self.delete_char(),
            KeyCode::Left => self.move_cursor_left(),
            KeyCode::Right => self.move_cursor_right(),
            KeyCode::Esc => self.notice = None,
            KeyCode::Char(c) if !ctrl => self.enter_char(c),
            _ => {}
        }
    }

    fn handle_settings_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.mode = TuiMode::Chat,
            KeyCode::Up | KeyCode::Down | KeyCode::Tab => {
                self.settings_field = match self.settings_field {
                    SettingsField::Temperature => SettingsField::MaxOutputTokens,
                    SettingsField::MaxOutputTokens => SettingsField::Temperature,
                };
            }
            KeyCode::Left => self.adjust_setting(-1),
            KeyCode::Right => self.adjust_setting(1),
            KeyCode::Enter => {
                let settings = self.settings_draft.clone();
                self.dispatch(ChatEvent::UpdateSettings(settings));
                self.mode = TuiMode::Chat;
                self.notice = Some("Settings updated".to_string());
            }
            _ => {}
        }
    }

    fn open_settings(&mut self) {
        self.settings_draft = self.state().settings.clone();
        self.settings_field = SettingsField::Temperature;
        self.mode = TuiMode::Settings;
    }

    fn adjust_setting(&mut self, direction: i8) {
        match self.settings_field {
            SettingsField::Temperature => self
                .settings_draft
                .adjust_temperature(TEMPERATURE_STEP * f32::from(direction)),
            SettingsField::MaxOutputTokens => self
                .settings_draft
                .adjust_max_output_tokens(TOKENS_STEP * i64::from(direction)),
        }
    }

    fn delete_current(&mut self) {
        if let Some(id) = self.state().current_id.clone() {
            self.dispatch(ChatEvent::Delete(id));
        }
    }

    fn select_next(&mut self) {
        self.select_offset(1);
    }

    fn select_previous(&mut self) {
        self.select_offset(-1);
    }

    fn select_offset(&mut self, offset: isize) {
        let ids: Vec<String> = self
            .state()
            .sidebar()
            .into_iter()
            .map(|conversation| conversation.id.clone())
            .collect();
        if ids.is_empty() {
            return;
        }

        let current = self
            .state()
            .current_id
            .as_ref()
            .and_then(|id| ids.iter().position(|candidate| candidate == id));
        let next = match current {
            Some(index) => (index as isize + offset).clamp(0, ids.len() as isize - 1) as usize,
            None if offset < 0 => ids.len() - 1,
            None => 0,
        };

        self.dispatch(ChatEvent::Select(ids[next].clone()));
    }

    /// Send the input box contents. Ignored while a reply is streaming.
    pub fn submit(&mut self) {
        if self.input.trim().is_empty() || self.state().is_loading {
            return;
        }

        let content = std::mem::take(&mut self.input);
        self.cursor_position = 0;
        self.notice = None;

        if let Some(request) = self.dispatch(ChatEvent::Send(content)) {
            self.start_request(request);
        }
    }

    fn start_request(&mut self, request: ChatRequest) {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = self.client.clone();
        tokio::spawn(async move { client.stream_chat(request, tx).await });
        self.events = Some(rx);
    }

    /// Feed every stream event received since the last tick into the state.
    pub fn poll_stream(&mut self) {
        let Some(mut rx) = self.events.take() else {
            return;
        };

        let mut done = false;
        loop {
            match rx.try_recv() {
                Ok(event) => {
                    if self.apply_stream_event(event) {
                        done = true;
                        break;
                    }
                }
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    self.dispatch(ChatEvent::StreamFailed(
                        "Request ended unexpectedly".to_string(),
                    ));
                    done = true;
                    break;
                }
            }
        }

        if !done {
            self.events = Some(rx);
        }
    }

    /// Returns true once the stream is over.
    fn apply_stream_event(&mut self, event: StreamEvent) -> bool {
        match event {
            StreamEvent::TextDelta(text) => {
                self.dispatch(ChatEvent::StreamText(text));
                false
            }
            StreamEvent::UpstreamError(message) => {
                self.notice = Some(format!("Upstream error: {}", message));
                false
            }
            StreamEvent::Finished => {
                self.dispatch(ChatEvent::StreamFinished);
                true
            }
            StreamEvent::Failed(message) => {
                self.dispatch(ChatEvent::StreamFailed(message));
                true
            }
        }
    }

    fn dispatch(&mut self, event: ChatEvent) -> Option<ChatRequest> {
        let handled = self.session.handle(event);
        // The state already changed; only persistence failed.
        if let Some(err) = handled.storage_error {
            warn!(error = %err, "Failed to save conversations");
            self.notice = Some(format!("Storage error: {}", err));
        }
        handled.request
    }

    pub fn status_text(&self) -> String {
        let state = self.state();
        if state.is_loading {
            "Generating...".to_string()
        } else if let Some(notice) = &self.notice {
            notice.clone()
        } else if let Some(error) = &state.last_error {
            format!("Error: {}", error)
        } else {
            "Ready".to_string()
        }
    }

    pub fn enter_char(&mut self, c: char) {
        let byte_idx = self.char_to_byte_idx(self.cursor_position);
        self.input.insert(byte_idx, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            let byte_idx = self.char_to_byte_idx(self.cursor_position);
            self.input.remove(byte_idx);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            self.cursor_position += 1;
        }
    }

    fn char_to_byte_idx(&self, char_idx: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_idx)
            .map(|(idx, _)| idx)
            .unwrap_or_else(|| self.input.len())
    }

    pub fn cursor_visual_position(&self, width: u16) -> (u16, u16) {
        let cursor_byte = self.char_to_byte_idx(self.cursor_position);
        visual_position(&self.input[..cursor_byte], width)
    }

    pub fn input_line_count(&self, width: u16) -> u16 {
        visual_position(&self.input, width).0.saturating_add(1)
    }

    pub fn scroll_offset(&self, visible_lines: u16, width: u16) -> u16 {
        if visible_lines == 0 || width == 0 {
            return 0;
        }

        let total_lines = self.input_line_count(width);
        let cursor_line = self.cursor_visual_position(width).0;
        let max_scroll = total_lines.saturating_sub(visible_lines);
        let desired = cursor_line.saturating_sub(visible_lines.saturating_sub(1));
        desired.min(max_scroll)
    }
}

/// Line and column after laying `text` out at `width` columns.
pub fn visual_position(text: &str, width: u16) -> (u16, u16) {
    let mut line = 0u16;
    let mut col = 0u16;
    if width == 0 {
        return (line, col);
    }

    for ch in text.chars() {
        if ch == '\n' {
            line = line.saturating_add(1);
            col = 0;
            continue;
        }

        let w = UnicodeWidthChar::width(ch).unwrap_or(0) as u16;
        if w == 0 {
            continue;
        }

        if col + w > width {
            line = line.saturating_add(1);
            col = w.min(width);
        } else {
            col += w;
        }

        if col == width {
            line = line.saturating_add(1);
            col = 0;
        }
    }

    (line, col)
}
