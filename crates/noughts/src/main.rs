//! Noughts - unified CLI
//!
//! `serve` runs the responder, `play` runs an initiator.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use noughts::{
    ClientConfig, ClientError, ConsolePlayer, GameServer, Initiator, NoughtsConfig, Player,
    SearchPlayer, ServerConfig,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let (server, client) = NoughtsConfig::load_or_default(&cli.config)?.into_parts();

    match cli.command {
        Command::Serve { host, port } => run_server(server.with_overrides(host, port)).await,
        Command::Play {
            host,
            port,
            name,
            auto,
            games,
        } => run_client(client.with_overrides(host, port, name, games), auto).await,
    }
}

/// Run the responder until the process is stopped
async fn run_server(config: ServerConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,noughts=debug")),
        )
        .init();

    info!(?config, "Starting noughts responder");
    GameServer::new(config).run().await?;
    Ok(())
}

/// Run an initiator session against a responder
async fn run_client(config: ClientConfig, auto: bool) -> Result<()> {
    // Logs go to stderr so they do not interleave with prompts
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let mut player: Box<dyn Player> = if auto {
        let name = config.name().clone().unwrap_or_else(|| "noughts-bot".to_string());
        Box::new(SearchPlayer::new(name, *config.games()))
    } else {
        match config.name() {
            Some(name) => Box::new(ConsolePlayer::stdin(name.clone())),
            None => Box::new(
                ConsolePlayer::ask_name(tokio::io::BufReader::new(tokio::io::stdin())).await?,
            ),
        }
    };

    let outcome = match Initiator::dial(&config).await {
        Ok(mut initiator) => initiator.run(player.as_mut()).await,
        Err(err) => Err(err),
    };

    match outcome {
        Ok(games) => {
            println!("Played {games} game(s). Goodbye!");
            Ok(())
        }
        Err(err) => {
            error!(%err, "Session ended");
            eprintln!("{}", farewell(&err));
            Err(err.into())
        }
    }
}

fn farewell(err: &ClientError) -> &'static str {
    if err.is_connection_failure() {
        "The server stopped responding. Goodbye!"
    } else {
        match err {
            ClientError::Wire(_) => "Could not talk to the server. Goodbye!",
            ClientError::ProtocolViolation(_) => "The server broke the protocol. Goodbye!",
            ClientError::Player(_) => "No more input. Goodbye!",
        }
    }
}
