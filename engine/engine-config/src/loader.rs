//! Configuration loading logic.
//!
//! Handles loading config from files and applying environment variable overrides.

use crate::CentralConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Standard locations to search for config.toml
pub const CONFIG_SEARCH_PATHS: &[&str] = &[
    "config.toml",      // Current directory
    "../config.toml",   // Parent directory (when running from subdirectory)
    "/app/config.toml", // Docker container
];

/// Load the central configuration from config.toml.
///
/// Searches for config.toml in the following order:
/// 1. Path specified by HEX_CONFIG environment variable
/// 2. Current directory (config.toml)
/// 3. Parent directory (../config.toml)
/// 4. Docker container path (/app/config.toml)
///
/// After loading, environment variable overrides are applied.
pub fn load_config() -> CentralConfig {
    // Check for explicit config path
    if let Ok(path) = std::env::var("HEX_CONFIG") {
        let path = PathBuf::from(&path);
        if path.exists() {
            info!("Loading config from HEX_CONFIG: {}", path.display());
            return load_from_path(&path);
        }
        warn!("HEX_CONFIG={} not found, searching defaults", path.display());
    }

    // Search default locations
    for path_str in CONFIG_SEARCH_PATHS {
        let path = PathBuf::from(path_str);
        if path.exists() {
            info!("Loading config from {}", path.display());
            return load_from_path(&path);
        }
    }

    // Fall back to defaults
    debug!("No config.toml found, using built-in defaults");
    apply_env_overrides(CentralConfig::default())
}

/// Load configuration from a specific path.
///
/// A file that cannot be read or parsed is reported and replaced by the
/// built-in defaults.
pub fn load_from_path(path: &Path) -> CentralConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => apply_env_overrides(config),
            Err(e) => {
                warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                apply_env_overrides(CentralConfig::default())
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}, using defaults", path.display(), e);
            apply_env_overrides(CentralConfig::default())
        }
    }
}

/// Macro to reduce env override boilerplate
macro_rules! env_override {
    // String field
    ($config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v;
        }
    };
    // Parseable field (usize, u16, f64, bool, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        match std::env::var($key).map(|s| s.parse()) {
            Ok(Ok(v)) => $config.$section.$field = v,
            Ok(Err(_)) => warn!("Ignoring unparsable {}", $key),
            Err(_) => {}
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: HEX_<SECTION>_<KEY>
pub fn apply_env_overrides(mut config: CentralConfig) -> CentralConfig {
    // Common
    env_override!(config, common.log_level, "HEX_COMMON_LOG_LEVEL");

    // MCTS
    env_override!(
        config,
        mcts.time_budget_secs,
        "HEX_MCTS_TIME_BUDGET_SECS",
        parse
    );
    env_override!(config, mcts.exploration, "HEX_MCTS_EXPLORATION", parse);
    env_override!(
        config,
        mcts.candidate_limit,
        "HEX_MCTS_CANDIDATE_LIMIT",
        parse
    );

    // Fusion
    env_override!(config, fusion.c_min, "HEX_FUSION_C_MIN", parse);
    env_override!(config, fusion.c_max, "HEX_FUSION_C_MAX", parse);
    env_override!(
        config,
        fusion.turn_to_c_max,
        "HEX_FUSION_TURN_TO_C_MAX",
        parse
    );

    // Agent
    env_override!(config, agent.host, "HEX_AGENT_HOST");
    env_override!(config, agent.port, "HEX_AGENT_PORT", parse);
    env_override!(config, agent.seed, "HEX_AGENT_SEED", parse);
    env_override!(
        config,
        agent.opening_book,
        "HEX_AGENT_OPENING_BOOK",
        parse
    );

    config
}
