mod app;
mod theme;
mod ui;

use crate::client::ChatClient;
use anyhow::Result;
use app::ChatTui;
use crossterm::{
    event::{
        self, Event, KeyEventKind, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
        supports_keyboard_enhancement,
    },
};
use gemchat_core::ChatSession;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{io::Stdout, time::Duration};

type ChatTerminal = Terminal<CrosstermBackend<Stdout>>;

const TICK: Duration = Duration::from_millis(50);

/// Run the full-screen chat interface until the user quits.
pub async fn run(session: ChatSession, client: ChatClient) -> Result<()> {
    let mut app = ChatTui::new(session, client);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Shift+Enter is only distinguishable from Enter with enhanced key reporting.
    let enhanced_keys = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced_keys {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
    }

    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    let res = run_app(&mut terminal, &mut app).await;

    if enhanced_keys {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

async fn run_app(terminal: &mut ChatTerminal, app: &mut ChatTui) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(TICK)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key);
        }

        if app.should_quit {
            return Ok(());
        }

        app.poll_stream();
        // Let the request task make progress between frames.
        tokio::task::yield_now().await;
    }
}
