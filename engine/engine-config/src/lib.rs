//! Centralized configuration loading from config.toml.
//!
//! This crate provides the configuration structs and loading logic shared
//! by the engine crates and the playing agent.
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`HEX_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults (config.defaults.toml, embedded at compile time)
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! HEX_<SECTION>_<KEY>=value
//!
//! Examples:
//!     HEX_COMMON_LOG_LEVEL=debug
//!     HEX_MCTS_TIME_BUDGET_SECS=4.5
//!     HEX_FUSION_TURN_TO_C_MAX=30
//!     HEX_AGENT_PORT=1235
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{apply_env_overrides, load_config, load_from_path, CONFIG_SEARCH_PATHS};
pub use structs::*;
