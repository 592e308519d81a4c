//! CLI command definitions and dispatch for the `tchat` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod chat;
pub mod config;
pub mod transcripts;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Recruiter chat: answer questions about a candidate's experience.
#[derive(Parser)]
#[command(name = "tchat", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat in the terminal.
    Chat {
        /// Visitor name (prompted when omitted).
        #[arg(long)]
        name: Option<String>,

        /// Visitor email (prompted when omitted).
        #[arg(long)]
        email: Option<String>,
    },

    /// Start the REST API server.
    Serve {
        /// Port to listen on (defaults to `[server] port`).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to `[server] host`).
        #[arg(long)]
        host: Option<String>,
    },

    /// Browse transcripts in the local SQLite store.
    Transcripts {
        #[command(subcommand)]
        action: TranscriptsCommand,
    },

    /// Print the effective configuration (secrets redacted).
    Config,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum TranscriptsCommand {
    /// List stored transcripts, newest first.
    #[command(alias = "ls")]
    List {
        /// Maximum number of transcripts to show.
        #[arg(long, default_value = "20")]
        limit: u32,

        /// Number of transcripts to skip.
        #[arg(long, default_value = "0")]
        offset: u32,
    },

    /// Show one transcript in full.
    Show {
        /// Transcript id.
        id: String,
    },
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_chat_with_flags() {
        let cli = Cli::parse_from(["tchat", "-v", "chat", "--name", "Ana", "--email", "ana@example.com"]);
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Chat { name, email } => {
                assert_eq!(name.as_deref(), Some("Ana"));
                assert_eq!(email.as_deref(), Some("ana@example.com"));
            }
            _ => panic!("expected chat"),
        }
    }

    #[test]
    fn parse_transcripts_list_defaults() {
        let cli = Cli::parse_from(["tchat", "--json", "transcripts", "ls"]);
        assert!(cli.json);
        match cli.command {
            Commands::Transcripts {
                action: TranscriptsCommand::List { limit, offset },
            } => {
                assert_eq!(limit, 20);
                assert_eq!(offset, 0);
            }
            _ => panic!("expected transcripts list"),
        }
    }

    #[test]
    fn parse_serve_overrides() {
        let cli = Cli::parse_from(["tchat", "serve", "-p", "8080"]);
        match cli.command {
            Commands::Serve { port, host } => {
                assert_eq!(port, Some(8080));
                assert!(host.is_none());
            }
            _ => panic!("expected serve"),
        }
    }
}
