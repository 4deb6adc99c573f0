//! Default configuration values loaded from config.defaults.toml.
//!
//! This module loads defaults from the shared TOML file at compile time,
//! so every component starts from identical values.

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
    search: SearchDefaults,
    mcts: MctsDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    log_level: String,
    zobrist_seed: u64,
}

#[derive(Debug, Deserialize)]
struct SearchDefaults {
    depth: u32,
    use_quiescence: bool,
    max_ply: usize,
}

#[derive(Debug, Deserialize)]
struct MctsDefaults {
    num_simulations: u32,
    c_puct: f64,
    dirichlet_alpha: f64,
    dirichlet_frac: f64,
    temperature: f64,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}
pub fn zobrist_seed() -> u64 {
    DEFAULTS.common.zobrist_seed
}

// Search
pub fn depth() -> u32 {
    DEFAULTS.search.depth
}
pub fn use_quiescence() -> bool {
    DEFAULTS.search.use_quiescence
}
pub fn max_ply() -> usize {
    DEFAULTS.search.max_ply
}

// MCTS
pub fn num_simulations() -> u32 {
    DEFAULTS.mcts.num_simulations
}
pub fn c_puct() -> f64 {
    DEFAULTS.mcts.c_puct
}
pub fn dirichlet_alpha() -> f64 {
    DEFAULTS.mcts.dirichlet_alpha
}
pub fn dirichlet_frac() -> f64 {
    DEFAULTS.mcts.dirichlet_frac
}
pub fn temperature() -> f64 {
    DEFAULTS.mcts.temperature
}
