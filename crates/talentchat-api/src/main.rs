//! Talentchat CLI and REST API entry point.
//!
//! Binary name: `tchat`
//!
//! Parses CLI arguments, loads configuration and wires the inference client
//! and transcript store, then dispatches to the command handler or starts
//! the REST API server.

mod cli;
mod http;
mod state;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use clap_complete::generate;

use talentchat_observe::tracing_setup::{
    TracingOptions, filter_for_verbosity, init_tracing, shutdown_tracing,
};

use cli::{Cli, Commands, TranscriptsCommand};
use state::{AppState, ConcreteRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.quiet && cli.verbose == 0 {
        "error"
    } else {
        filter_for_verbosity(cli.verbose)
    };
    let options = TracingOptions::new(filter)
        .with_otel(cli.otel)
        .with_json(cli.json);
    init_tracing(&options).map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "tchat", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init().await?;
    let result = run(cli, state).await;

    shutdown_tracing();
    result
}

async fn run(cli: Cli, state: AppState) -> anyhow::Result<()> {
    match cli.command {
        Commands::Chat { name, email } => {
            cli::chat::loop_runner::run_chat_loop(&state, name, email).await?;
        }

        Commands::Serve { port, host } => {
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            tracing::info!(
                %addr,
                persistence = state.sessions.persistence_enabled(),
                "Talentchat API listening"
            );
            if !cli.quiet {
                println!(
                    "  {} Talentchat API listening on {}",
                    console::style("*").cyan().bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            let sessions = Arc::clone(&state.sessions);
            let idle = Duration::from_secs(state.config.server.session_idle_secs);
            let sweeper = spawn_idle_sweeper(Arc::clone(&sessions), idle);

            let router = http::router::build_router(state);
            let served = axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await;

            sweeper.abort();
            let drained = sessions.drain().await;
            tracing::info!(drained, "Server stopped, pending transcript writes flushed");
            served?;

            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }

        Commands::Transcripts { action } => match action {
            TranscriptsCommand::List { limit, offset } => {
                cli::transcripts::list_transcripts(&state, limit, offset, cli.json).await?;
            }
            TranscriptsCommand::Show { id } => {
                cli::transcripts::show_transcript(&state, &id, cli.json).await?;
            }
        },

        Commands::Config => {
            cli::config::show_config(&state, cli.json)?;
        }

        Commands::Completions { .. } => unreachable!("handled before state init"),
    }

    Ok(())
}

/// Periodically close sessions idle longer than `idle`, flushing their writes.
fn spawn_idle_sweeper(sessions: Arc<ConcreteRegistry>, idle: Duration) -> tokio::task::JoinHandle<()> {
    let period = Duration::from_secs(idle.as_secs().clamp(1, 60));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            sessions.sweep_idle(idle).await;
        }
    })
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
