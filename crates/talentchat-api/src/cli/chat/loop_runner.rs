//! Main chat loop orchestration.
//!
//! Intake form, welcome banner, greeting, then the question loop with a
//! spinner per round-trip. Pending transcript writes are flushed on exit.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use talentchat_core::chat::persister::{PersistOutcome, TranscriptPersister};
use talentchat_core::chat::widget::{ChatWidget, SendOutcome};
use talentchat_infra::inference::HttpInferenceClient;
use talentchat_types::error::ChatError;

use crate::state::AppState;

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::intake::collect_intake;
use super::renderer::ChatRenderer;

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Run the interactive terminal chat.
pub async fn run_chat_loop(
    state: &AppState,
    name: Option<String>,
    email: Option<String>,
) -> anyhow::Result<()> {
    let persister = TranscriptPersister::from_repo(state.transcripts.clone());
    let mut widget: ChatWidget<HttpInferenceClient> =
        ChatWidget::new(Arc::clone(&state.client), persister, state.config.locale);

    let store = match &state.transcripts {
        Some(repo) => repo.name().to_string(),
        None => "disabled".to_string(),
    };
    print_welcome_banner(
        state.config.locale,
        state.client.endpoint_url(),
        &store,
        &widget.id().to_string(),
    );

    collect_intake(&mut widget, name, email)?;
    let visitor = widget
        .visitor()
        .map(|v| v.name.clone())
        .unwrap_or_default();
    info!(session_id = %widget.id(), "Terminal chat unlocked");

    let renderer = ChatRenderer::new();
    if let Some(greeting) = widget.messages().first() {
        renderer.print_reply(&greeting.text);
    }

    let prompt = format!("  {} ", style(format!("{visitor} >")).green().bold());
    let (mut chat_input, _writer) =
        ChatInput::new(prompt).context("Failed to initialize input")?;

    loop {
        match chat_input.read_line().await {
            InputEvent::Eof => {
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
                continue;
            }
            InputEvent::Message(text) => {
                if let Some(cmd) = commands::parse(&text) {
                    match cmd {
                        ChatCommand::Help => commands::print_help(),
                        ChatCommand::Clear => chat_input.clear(),
                        ChatCommand::History => renderer.print_history(widget.messages(), &visitor),
                        ChatCommand::Exit => {
                            println!("\n  {}", style("Session ended.").dim());
                            break;
                        }
                        ChatCommand::Unknown(name) => println!(
                            "\n  {} Unknown command: {}. Type /help for available commands.\n",
                            style("?").yellow().bold(),
                            style(name).dim()
                        ),
                    }
                    continue;
                }

                let thinking = spinner("thinking...");
                let outcome = widget.send_message(&text).await;
                thinking.finish_and_clear();

                match outcome {
                    Ok(SendOutcome::Replied(reply)) => renderer.print_reply(&reply.text),
                    Ok(SendOutcome::Failed(reply)) => renderer.print_error_reply(&reply.text),
                    Ok(SendOutcome::Ignored) => {}
                    Err(ChatError::ReplyPending | ChatError::Locked) => {
                        println!("\n  {} Please wait for the current reply.\n", style("!").yellow().bold());
                    }
                }
            }
        }
    }

    chat_input.flush();

    if !widget.persistence_enabled() {
        println!();
        return Ok(());
    }

    let saving = spinner("saving transcript...");
    let outcomes = widget.flush_persistence().await;
    saving.finish_and_clear();

    if outcomes.iter().any(|o| matches!(o, PersistOutcome::Failed(_))) {
        println!(
            "  {} Some transcript writes failed; see logs for details.",
            style("!").yellow().bold()
        );
    }
    if let Some(handle) = widget.session_handle() {
        println!("  {} Transcript saved as {}", style("✓").green(), style(handle).cyan());
    }
    println!();

    Ok(())
}
