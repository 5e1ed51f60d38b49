//! Agent - Hex player for the game server
//!
//! A process that:
//! 1. Connects to the game server over TCP
//! 2. Plays the scripted opening on 11x11 boards
//! 3. Searches every later move within a fixed time budget and blends the
//!    visit statistics with position scores
//! 4. Exits when the server ends the game or closes the connection

use anyhow::{Context, Result};
use clap::Parser;
use mcts::{Canonical, CentreCandidates, ConstantScorer};
use tokio::net::TcpStream;
use tokio::signal;
use tracing::{error, info};

mod config;
mod decision;
mod opening;
mod protocol;

use crate::config::Config;
use crate::protocol::{Session, Settings};

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    Ok(())
}

async fn play(config: &Config) -> Result<()> {
    let address = config.address();
    let stream = TcpStream::connect(&address)
        .await
        .with_context(|| format!("connecting to {address}"))?;
    stream.set_nodelay(true)?;
    info!(%address, "Connected to game server");

    let settings = Settings {
        generator: Canonical(CentreCandidates),
        scorer: ConstantScorer::default(),
        mcts: config.mcts_config(),
        fusion: config.fusion_config(),
        opening_book: config.opening_book,
    };
    let session = Session::new(settings, config.rng());

    let (reader, writer) = stream.into_split();
    protocol::run(reader, writer, session).await
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse configuration
    let config = Config::parse();

    // Validate configuration
    config.validate()?;

    // Initialize tracing
    init_tracing(&config.log_level)?;
    info!(log_level = %config.log_level, "Tracing initialized");
    info!(
        time_budget_secs = config.time_budget_secs,
        exploration = config.exploration,
        candidate_limit = config.candidate_limit,
        opening_book = config.opening_book,
        seed = config.seed,
        "Search settings"
    );

    let run_result = tokio::select! {
        result = play(&config) => result,
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received, leaving the game");
            Ok(())
        }
    };

    match run_result {
        Ok(()) => {
            info!("Agent finished");
            Ok(())
        }
        Err(e) => {
            error!("Agent failed: {:#}", e);
            Err(e)
        }
    }
}
