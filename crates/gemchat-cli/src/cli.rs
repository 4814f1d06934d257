use clap::{Parser, Subcommand, ValueEnum};

pub const DEFAULT_PROXY_URL: &str = "http://localhost:3000/api/chat";

/// Output format for CLI commands
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn is_json(self) -> bool {
        matches!(self, OutputFormat::Json)
    }
}

#[derive(Parser)]
#[command(name = "gemchat")]
#[command(version, about = "GemChat - streaming chat with Gemini")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Chat proxy endpoint (defaults to http://localhost:3000/api/chat)
    #[arg(long, global = true, env = "GEMCHAT_PROXY_URL")]
    pub proxy_url: Option<String>,

    /// Database path (defaults to ~/.gemchat/gemchat.db)
    #[arg(long, global = true)]
    pub db_path: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send one message in a new conversation and stream the reply
    Send {
        /// Message text
        message: String,
    },

    /// List saved conversations, newest first
    List {
        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// Delete a saved conversation
    Delete {
        /// Conversation ID
        id: String,
    },
}
