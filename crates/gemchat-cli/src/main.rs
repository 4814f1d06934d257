mod cli;
mod client;
mod commands;
mod config;
mod logging;
mod setup;
mod tui;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use client::ChatClient;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    // Before config loading so its warnings reach the log file
    let _guard = logging::init();
    let config = config::CliConfig::load();

    let client = ChatClient::new(setup::resolve_proxy_url(&cli, &config));
    let settings = config.chat_settings();

    match cli.command {
        Some(Commands::Send { ref message }) => {
            let core = setup::prepare_core(&cli, &config)?;
            commands::send::run(core, client, settings, message.clone()).await
        }
        Some(Commands::List { format }) => {
            let core = setup::prepare_core(&cli, &config)?;
            commands::conversation::list(&core, format)
        }
        Some(Commands::Delete { ref id }) => {
            let core = setup::prepare_core(&cli, &config)?;
            commands::conversation::delete(&core, id)
        }
        None => {
            let core = setup::prepare_core_lenient(&cli, &config);
            let session = core.open_session(settings)?;
            tui::run(session, client).await
        }
    }
}
