use anyhow::{Result, bail};
use colored::Colorize;
use gemchat_core::{AppCore, ChatEvent};
use gemchat_models::ChatSettings;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::client::{ChatClient, StreamEvent};

/// Send `message` in a new conversation, print the reply as it streams and
/// save it.
pub async fn run(
    core: Arc<AppCore>,
    client: ChatClient,
    settings: ChatSettings,
    message: String,
) -> Result<()> {
    let mut session = core.open_session(settings)?;
    let Some(request) = session.handle(ChatEvent::Send(message)).into_result()? else {
        bail!("Message is empty");
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let request_task = tokio::spawn(async move { client.stream_chat(request, tx).await });

    let mut stdout = std::io::stdout();
    let mut failure = None;
    while let Some(event) = rx.recv().await {
        match event {
            StreamEvent::TextDelta(text) => {
                print!("{}", text);
                stdout.flush()?;
                session.handle(ChatEvent::StreamText(text)).into_result()?;
            }
            StreamEvent::UpstreamError(message) => {
                eprintln!("\n{} {}", "Upstream error:".red(), message);
            }
            StreamEvent::Finished => {
                session.handle(ChatEvent::StreamFinished).into_result()?;
                break;
            }
            StreamEvent::Failed(message) => {
                session
                    .handle(ChatEvent::StreamFailed(message.clone()))
                    .into_result()?;
                failure = Some(message);
                break;
            }
        }
    }
    println!();
    request_task.await?;

    if let Some(message) = failure {
        bail!(message);
    }

    if let Some(conversation) = session.state().current() {
        eprintln!(
            "{} {}",
            "Saved conversation".dimmed(),
            conversation.id.as_str().dimmed()
        );
    }
    Ok(())
}
