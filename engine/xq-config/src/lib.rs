//! Centralized configuration loading from config.toml.
//!
//! This crate provides configuration structs and loading logic shared
//! across the engine components.
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`XIANGQI_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! XIANGQI_<SECTION>_<KEY>=value
//!
//! Examples:
//!     XIANGQI_COMMON_LOG_LEVEL=debug
//!     XIANGQI_SEARCH_DEPTH=6
//!     XIANGQI_MCTS_NUM_SIMULATIONS=800
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{apply_env_overrides, load_config, load_from_path, CONFIG_SEARCH_PATHS};
pub use structs::*;
