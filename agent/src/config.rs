//! Configuration for the playing agent
//!
//! Configuration is loaded from config.toml with environment variable overrides.
//! CLI arguments take highest priority, followed by env vars, then config.toml.

use anyhow::{anyhow, Result};
use clap::{ArgAction, Parser};
use engine_config::{load_config, CentralConfig};
use mcts::{FusionConfig, MctsConfig};
use once_cell::sync::Lazy;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::level_filters::LevelFilter;

// Load central config once at startup
static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

fn env_or<T: std::str::FromStr>(key: &str, fallback: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(fallback)
}

// Default value functions that read from central config
fn default_host() -> String {
    std::env::var("AGENT_HOST").unwrap_or_else(|_| CENTRAL_CONFIG.agent.host.clone())
}

fn default_port() -> u16 {
    env_or("AGENT_PORT", CENTRAL_CONFIG.agent.port)
}

fn default_log_level() -> String {
    std::env::var("AGENT_LOG_LEVEL").unwrap_or_else(|_| CENTRAL_CONFIG.common.log_level.clone())
}

fn default_time_budget() -> f64 {
    env_or("AGENT_TIME_BUDGET_SECS", CENTRAL_CONFIG.mcts.time_budget_secs)
}

fn default_exploration() -> f64 {
    env_or("AGENT_EXPLORATION", CENTRAL_CONFIG.mcts.exploration)
}

fn default_candidate_limit() -> usize {
    env_or("AGENT_CANDIDATE_LIMIT", CENTRAL_CONFIG.mcts.candidate_limit)
}

fn default_c_min() -> f64 {
    env_or("AGENT_C_MIN", CENTRAL_CONFIG.fusion.c_min)
}

fn default_c_max() -> f64 {
    env_or("AGENT_C_MAX", CENTRAL_CONFIG.fusion.c_max)
}

fn default_turn_to_c_max() -> u32 {
    env_or("AGENT_TURN_TO_C_MAX", CENTRAL_CONFIG.fusion.turn_to_c_max)
}

fn default_seed() -> u64 {
    env_or("AGENT_SEED", CENTRAL_CONFIG.agent.seed)
}

fn default_opening_book() -> bool {
    env_or("AGENT_OPENING_BOOK", CENTRAL_CONFIG.agent.opening_book)
}

#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(name = "agent")]
#[command(about = "Hex agent - plays one game against a game server")]
#[command(
    long_about = "Connects to a Hex game server, plays the colour it is given and
answers every turn with a move chosen by the opening book or by tree search
blended with position scores.

Configuration is loaded from config.toml with environment variable overrides.
CLI arguments take highest priority."
)]
pub struct Config {
    /// Game server host
    #[arg(long, default_value_t = default_host())]
    pub host: String,

    /// Game server port
    #[arg(long, default_value_t = default_port())]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value_t = default_log_level())]
    pub log_level: String,

    /// Seconds of search per move
    #[arg(long, default_value_t = default_time_budget())]
    pub time_budget_secs: f64,

    /// UCT exploration constant
    #[arg(long, default_value_t = default_exploration())]
    pub exploration: f64,

    /// Candidates considered per expansion
    #[arg(long, default_value_t = default_candidate_limit())]
    pub candidate_limit: usize,

    /// Search weight on an empty board
    #[arg(long, default_value_t = default_c_min())]
    pub c_min: f64,

    /// Search weight once the board has filled up
    #[arg(long, default_value_t = default_c_max())]
    pub c_max: f64,

    /// Stone count at which the search weight reaches c_max
    #[arg(long, default_value_t = default_turn_to_c_max())]
    pub turn_to_c_max: u32,

    /// RNG seed (0 to seed from entropy)
    #[arg(long, default_value_t = default_seed())]
    pub seed: u64,

    /// Use the scripted opening on 11x11 boards
    #[arg(long, default_value_t = default_opening_book(), action = ArgAction::Set)]
    pub opening_book: bool,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(anyhow!("host cannot be empty"));
        }

        if self.port == 0 {
            return Err(anyhow!("port must be greater than 0"));
        }

        if !(self.time_budget_secs.is_finite() && self.time_budget_secs > 0.0) {
            return Err(anyhow!("time_budget_secs must be greater than 0"));
        }

        if !(self.exploration.is_finite() && self.exploration >= 0.0) {
            return Err(anyhow!("exploration must be non-negative"));
        }

        if self.candidate_limit == 0 {
            return Err(anyhow!("candidate_limit must be greater than 0"));
        }

        if !(0.0..=1.0).contains(&self.c_min) || !(0.0..=1.0).contains(&self.c_max) {
            return Err(anyhow!("c_min and c_max must lie in [0, 1]"));
        }

        if self.c_min > self.c_max {
            return Err(anyhow!(
                "c_min ({}) cannot exceed c_max ({})",
                self.c_min,
                self.c_max
            ));
        }

        if self.turn_to_c_max == 0 {
            return Err(anyhow!("turn_to_c_max must be greater than 0"));
        }

        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        Ok(())
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn time_budget(&self) -> Duration {
        Duration::from_secs_f64(self.time_budget_secs)
    }

    pub fn mcts_config(&self) -> MctsConfig {
        MctsConfig::default()
            .with_time_budget(self.time_budget())
            .with_exploration(self.exploration)
            .with_candidate_limit(self.candidate_limit)
    }

    pub fn fusion_config(&self) -> FusionConfig {
        FusionConfig {
            c_min: self.c_min,
            c_max: self.c_max,
            turn_to_c_max: self.turn_to_c_max,
        }
    }

    /// Session RNG; a zero seed draws from the OS.
    pub fn rng(&self) -> ChaCha20Rng {
        if self.seed == 0 {
            ChaCha20Rng::from_entropy()
        } else {
            ChaCha20Rng::seed_from_u64(self.seed)
        }
    }
}
