//! Slash commands for the chat loop.
//!
//! Commands start with `/`. Everything else is a question for the
//! candidate, sent verbatim.

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Clear the terminal screen.
    Clear,
    /// Print the conversation so far.
    History,
    /// End the chat.
    Exit,
    /// Unknown command.
    Unknown(String),
}

/// Parse visitor input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let cmd = trimmed
        .split_whitespace()
        .next()
        .unwrap_or(trimmed)
        .to_lowercase();

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/clear" | "/cls" => Some(ChatCommand::Clear),
        "/history" => Some(ChatCommand::History),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// Print the help text listing all available commands.
pub fn print_help() {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    println!("  {}     Show this help message", style("/help").cyan());
    println!("  {}    Clear the screen", style("/clear").cyan());
    println!("  {}  Show the conversation so far", style("/history").cyan());
    println!("  {}     End the chat", style("/quit").cyan());
    println!();
    println!("  {}", style("Ctrl+D to exit").dim());
    println!();
}
