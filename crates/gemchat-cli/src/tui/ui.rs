use crate::tui::{
    app::{ChatTui, SettingsField, TuiMode, visual_position},
    theme,
};
use gemchat_models::{ChatMessage, ChatRole};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

const SIDEBAR_WIDTH: u16 = 32;
const MIN_INPUT_HEIGHT: u16 = 3;
const MAX_INPUT_HEIGHT: u16 = 9;

pub fn draw(f: &mut Frame, app: &ChatTui) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
        .split(f.area());

    draw_sidebar(f, columns[0], app);

    let input_height = input_height(app, columns[1].width.saturating_sub(2));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(input_height),
        ])
        .split(columns[1]);

    draw_header(f, chunks[0], app);
    draw_messages(f, chunks[1], app);
    draw_status(f, chunks[2], app);
    draw_input(f, chunks[3], app);

    if app.mode == TuiMode::Settings {
        draw_settings(f, app);
    }
}

fn draw_sidebar(f: &mut Frame, area: Rect, app: &ChatTui) {
    let state = app.state();
    let current = state.current_id.as_deref();

    let items: Vec<ListItem> = state
        .sidebar()
        .into_iter()
        .map(|conversation| {
            let style = if Some(conversation.id.as_str()) == current {
                theme::selected_style()
            } else {
                Style::default().fg(Color::Gray)
            };
            ListItem::new(Line::from(Span::styled(conversation.title.clone(), style)))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme::border_style())
            .title(" Chats (Ctrl+N new) "),
    );
    f.render_widget(list, area);
}

fn draw_header(f: &mut Frame, area: Rect, app: &ChatTui) {
    let title = app
        .state()
        .current()
        .map(|conversation| conversation.title.as_str())
        .unwrap_or("No chat selected");
    let header = format!(" GemChat | {} | {}", title, app.proxy_url());
    f.render_widget(Paragraph::new(header).style(theme::header_style()), area);
}

fn draw_messages(f: &mut Frame, area: Rect, app: &ChatTui) {
    let lines = match app.state().current() {
        Some(conversation) => conversation.messages.iter().flat_map(message_lines).collect(),
        None => vec![Line::from(Span::styled(
            "Type a message to start a new chat.",
            theme::status_style(),
        ))],
    };

    // Keep the newest text in view.
    let total = wrapped_height(&lines, area.width);
    let scroll = total.saturating_sub(area.height);

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    f.render_widget(widget, area);
}

fn message_lines(message: &ChatMessage) -> Vec<Line<'static>> {
    let (label, style) = match message.role {
        ChatRole::User => ("You", theme::user_style()),
        ChatRole::Assistant => ("Gemini", theme::assistant_style()),
    };

    let mut lines = vec![Line::from(Span::styled(label, style))];
    lines.extend(
        message
            .content
            .split('\n')
            .map(|line| Line::from(line.to_string())),
    );
    lines.push(Line::from(""));
    lines
}

fn wrapped_height(lines: &[Line], width: u16) -> u16 {
    lines
        .iter()
        .map(|line| {
            let text: String = line.spans.iter().map(|span| span.content.as_ref()).collect();
            let (rows, cols) = visual_position(&text, width);
            if cols == 0 && rows > 0 { rows } else { rows + 1 }
        })
        .fold(0u16, u16::saturating_add)
}

fn draw_status(f: &mut Frame, area: Rect, app: &ChatTui) {
    let state = app.state();
    let style = if state.last_error.is_some() && !state.is_loading {
        theme::error_style()
    } else {
        theme::status_style()
    };
    let status = format!(
        " {} | temp {:.2} | max {} | Ctrl+S: settings | Ctrl+D: delete | Ctrl+C: quit",
        app.status_text(),
        state.settings.temperature,
        state.settings.max_output_tokens
    );
    f.render_widget(Paragraph::new(status).style(style), area);
}

fn draw_input(f: &mut Frame, area: Rect, app: &ChatTui) {
    let title = if app.state().is_loading {
        " Input (waiting for reply) "
    } else {
        " Input "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::border_style())
        .title(title);

    let content_area = block.inner(area);
    f.render_widget(block, area);

    if content_area.height == 0 || content_area.width == 0 {
        return;
    }

    let scroll = app.scroll_offset(content_area.height, content_area.width);
    let input = Paragraph::new(app.input.as_str())
        .style(theme::input_style())
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    f.render_widget(input, content_area);

    if app.mode == TuiMode::Chat {
        let (cursor_line, cursor_col) = app.cursor_visual_position(content_area.width);
        let visible_line = cursor_line.saturating_sub(scroll);
        let clamped_line = visible_line.min(content_area.height.saturating_sub(1));
        let clamped_col = cursor_col.min(content_area.width.saturating_sub(1));
        f.set_cursor_position((content_area.x + clamped_col, content_area.y + clamped_line));
    }
}

fn draw_settings(f: &mut Frame, app: &ChatTui) {
    let area = centered_rect(50, 30, f.area());
    let draft = &app.settings_draft;

    let field = |name: &str, value: String, active: bool| {
        let style = if active {
            theme::selected_style()
        } else {
            Style::default()
        };
        Line::from(Span::styled(format!("  {:<18} ◀ {} ▶", name, value), style))
    };

    let lines = vec![
        field(
            "Temperature",
            format!("{:.2}", draft.temperature),
            app.settings_field == SettingsField::Temperature,
        ),
        field(
            "Max output tokens",
            draft.max_output_tokens.to_string(),
            app.settings_field == SettingsField::MaxOutputTokens,
        ),
        Line::from(""),
        Line::from(Span::styled(
            "  ↑↓ field, ←→ adjust, Enter apply, Esc cancel",
            theme::status_style(),
        )),
    ];

    let settings = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Settings ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, area);
    f.render_widget(settings, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn input_height(app: &ChatTui, width: u16) -> u16 {
    let lines = app.input_line_count(width.max(1)).max(1);
    lines.saturating_add(2).clamp(MIN_INPUT_HEIGHT, MAX_INPUT_HEIGHT)
}
