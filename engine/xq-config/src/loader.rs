//! Configuration loading logic.
//!
//! Handles loading config from files and applying environment variable overrides.

use crate::EngineConfig;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Standard locations to search for config.toml
pub const CONFIG_SEARCH_PATHS: &[&str] = &[
    "config.toml",      // Current directory
    "../config.toml",   // Parent directory (when running from subdirectory)
    "/app/config.toml", // Docker container
];

/// Load the engine configuration from config.toml.
///
/// Searches for config.toml in the following order:
/// 1. Path specified by XIANGQI_CONFIG environment variable
/// 2. Current directory (config.toml)
/// 3. Parent directory (../config.toml)
/// 4. Docker container path (/app/config.toml)
///
/// After loading, environment variable overrides are applied.
pub fn load_config() -> EngineConfig {
    // Check for explicit config path
    if let Ok(path) = std::env::var("XIANGQI_CONFIG") {
        let path = PathBuf::from(&path);
        if path.exists() {
            info!("Loading config from XIANGQI_CONFIG: {}", path.display());
            return load_from_path(&path);
        }
        warn!(
            "XIANGQI_CONFIG={} not found, searching defaults",
            path.display()
        );
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
    apply_env_overrides(EngineConfig::default())
}

/// Load configuration from a specific path.
pub fn load_from_path(path: &PathBuf) -> EngineConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => apply_env_overrides(config),
            Err(e) => {
                warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                apply_env_overrides(EngineConfig::default())
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}, using defaults", path.display(), e);
            apply_env_overrides(EngineConfig::default())
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
    // Parseable field (u32, u64, f64, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        if let Ok(v) =
            std::env::var($key).and_then(|s| s.parse().map_err(|_| std::env::VarError::NotPresent))
        {
            $config.$section.$field = v;
        }
    };
    // Optional parseable field (Option<u64>, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, optional_parse) => {
        if let Ok(v) =
            std::env::var($key).and_then(|s| s.parse().map_err(|_| std::env::VarError::NotPresent))
        {
            $config.$section.$field = Some(v);
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: XIANGQI_<SECTION>_<KEY>
pub fn apply_env_overrides(mut config: EngineConfig) -> EngineConfig {
    // Common
    env_override!(config, common.log_level, "XIANGQI_COMMON_LOG_LEVEL");
    env_override!(
        config,
        common.zobrist_seed,
        "XIANGQI_COMMON_ZOBRIST_SEED",
        parse
    );

    // Search
    env_override!(config, search.depth, "XIANGQI_SEARCH_DEPTH", parse);
    env_override!(
        config,
        search.use_quiescence,
        "XIANGQI_SEARCH_USE_QUIESCENCE",
        parse
    );
    env_override!(config, search.max_ply, "XIANGQI_SEARCH_MAX_PLY", parse);

    // MCTS
    env_override!(
        config,
        mcts.num_simulations,
        "XIANGQI_MCTS_NUM_SIMULATIONS",
        parse
    );
    env_override!(config, mcts.c_puct, "XIANGQI_MCTS_C_PUCT", parse);
    env_override!(
        config,
        mcts.dirichlet_alpha,
        "XIANGQI_MCTS_DIRICHLET_ALPHA",
        parse
    );
    env_override!(
        config,
        mcts.dirichlet_frac,
        "XIANGQI_MCTS_DIRICHLET_FRAC",
        parse
    );
    env_override!(
        config,
        mcts.temperature,
        "XIANGQI_MCTS_TEMPERATURE",
        parse
    );
    env_override!(
        config,
        mcts.time_limit_ms,
        "XIANGQI_MCTS_TIME_LIMIT_MS",
        optional_parse
    );

    config
}
