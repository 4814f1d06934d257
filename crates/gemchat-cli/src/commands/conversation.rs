use anyhow::{Result, bail};
use chrono::Local;
use colored::Colorize;
use comfy_table::{Cell, Table};
use gemchat_core::AppCore;
use gemchat_models::{Conversation, sorted_by_recency};
use std::sync::Arc;

use crate::cli::OutputFormat;

pub fn list(core: &Arc<AppCore>, format: OutputFormat) -> Result<()> {
    let conversations = core.storage.conversations.load_all()?;
    let sorted = sorted_by_recency(&conversations);

    if format.is_json() {
        println!("{}", serde_json::to_string_pretty(&sorted)?);
        return Ok(());
    }

    if sorted.is_empty() {
        println!("No conversations yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Messages", "Created"]);

    for conversation in sorted {
        table.add_row(vec![
            Cell::new(&conversation.id),
            Cell::new(&conversation.title),
            Cell::new(conversation.messages.len()),
            Cell::new(format_created(conversation)),
        ]);
    }

    println!("{table}");
    Ok(())
}

pub fn delete(core: &Arc<AppCore>, id: &str) -> Result<()> {
    if !core.storage.conversations.delete(id)? {
        bail!("Conversation not found: {}", id);
    }

    println!("{} {}", "Deleted conversation".green(), id);
    Ok(())
}

fn format_created(conversation: &Conversation) -> String {
    conversation
        .created_at_time()
        .map(|time| time.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}
