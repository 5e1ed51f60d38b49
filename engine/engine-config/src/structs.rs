//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::Deserialize;

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// These call the accessor functions from defaults module
// ============================================================================

fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_time_budget() -> f64 {
    defaults::time_budget_secs()
}
fn d_exploration() -> f64 {
    defaults::exploration()
}
fn d_candidate_limit() -> usize {
    defaults::candidate_limit()
}
fn d_c_min() -> f64 {
    defaults::c_min()
}
fn d_c_max() -> f64 {
    defaults::c_max()
}
fn d_turn_to_c_max() -> u32 {
    defaults::turn_to_c_max()
}
fn d_host() -> String {
    defaults::host().into()
}
fn d_port() -> u16 {
    defaults::port()
}
fn d_seed() -> u64 {
    defaults::seed()
}
fn d_opening_book() -> bool {
    defaults::opening_book()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub mcts: MctsConfig,
    #[serde(default)]
    pub fusion: FusionConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

/// Common configuration shared by all components
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    #[serde(default = "d_log_level")]
    pub log_level: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::log_level().into(),
        }
    }
}

/// Tree search configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MctsConfig {
    /// Seconds of wall-clock search per move
    #[serde(default = "d_time_budget")]
    pub time_budget_secs: f64,
    #[serde(default = "d_exploration")]
    pub exploration: f64,
    #[serde(default = "d_candidate_limit")]
    pub candidate_limit: usize,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            time_budget_secs: defaults::time_budget_secs(),
            exploration: defaults::exploration(),
            candidate_limit: defaults::candidate_limit(),
        }
    }
}

/// Blend of search statistics and position scores
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FusionConfig {
    #[serde(default = "d_c_min")]
    pub c_min: f64,
    #[serde(default = "d_c_max")]
    pub c_max: f64,
    #[serde(default = "d_turn_to_c_max")]
    pub turn_to_c_max: u32,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            c_min: defaults::c_min(),
            c_max: defaults::c_max(),
            turn_to_c_max: defaults::turn_to_c_max(),
        }
    }
}

/// Playing agent configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AgentConfig {
    #[serde(default = "d_host")]
    pub host: String,
    #[serde(default = "d_port")]
    pub port: u16,
    /// RNG seed for the search (0 = from entropy)
    #[serde(default = "d_seed")]
    pub seed: u64,
    #[serde(default = "d_opening_book")]
    pub opening_book: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            host: defaults::host().into(),
            port: defaults::port(),
            seed: defaults::seed(),
            opening_book: defaults::opening_book(),
        }
    }
}
