//! Default configuration values loaded from config.defaults.toml.
//!
//! The defaults file is embedded at compile time so the binary never
//! depends on it being present at runtime.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    mcts: MctsDefaults,
    fusion: FusionDefaults,
    agent: AgentDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct MctsDefaults {
    time_budget_secs: f64,
    exploration: f64,
    candidate_limit: usize,
}

#[derive(Debug, Deserialize)]
struct FusionDefaults {
    c_min: f64,
    c_max: f64,
    turn_to_c_max: u32,
}

#[derive(Debug, Deserialize)]
struct AgentDefaults {
    host: String,
    port: u16,
    seed: u64,
    opening_book: bool,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}

// MCTS
pub fn time_budget_secs() -> f64 {
    DEFAULTS.mcts.time_budget_secs
}
pub fn exploration() -> f64 {
    DEFAULTS.mcts.exploration
}
pub fn candidate_limit() -> usize {
    DEFAULTS.mcts.candidate_limit
}

// Fusion
pub fn c_min() -> f64 {
    DEFAULTS.fusion.c_min
}
pub fn c_max() -> f64 {
    DEFAULTS.fusion.c_max
}
pub fn turn_to_c_max() -> u32 {
    DEFAULTS.fusion.turn_to_c_max
}

// Agent
pub fn host() -> &'static str {
    &DEFAULTS.agent.host
}
pub fn port() -> u16 {
    DEFAULTS.agent.port
}
pub fn seed() -> u64 {
    DEFAULTS.agent.seed
}
pub fn opening_book() -> bool {
    DEFAULTS.agent.opening_book
}
