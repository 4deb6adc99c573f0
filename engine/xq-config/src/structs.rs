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
fn d_zobrist_seed() -> u64 {
    defaults::zobrist_seed()
}
fn d_depth() -> u32 {
    defaults::depth()
}
fn d_use_quiescence() -> bool {
    defaults::use_quiescence()
}
fn d_max_ply() -> usize {
    defaults::max_ply()
}
fn d_num_sims() -> u32 {
    defaults::num_simulations()
}
fn d_c_puct() -> f64 {
    defaults::c_puct()
}
fn d_dirichlet_alpha() -> f64 {
    defaults::dirichlet_alpha()
}
fn d_dirichlet_frac() -> f64 {
    defaults::dirichlet_frac()
}
fn d_temperature() -> f64 {
    defaults::temperature()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct EngineConfig {
    #[serde(default)]
    pub common: CommonSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub mcts: MctsSettings,
}

/// Common configuration shared by all components
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonSettings {
    #[serde(default = "d_log_level")]
    pub log_level: String,
    /// Seed for the Zobrist hash tables. Changing it invalidates any
    /// persisted hashes.
    #[serde(default = "d_zobrist_seed")]
    pub zobrist_seed: u64,
}

impl Default for CommonSettings {
    fn default() -> Self {
        Self {
            log_level: defaults::log_level().into(),
            zobrist_seed: defaults::zobrist_seed(),
        }
    }
}

/// Alpha-beta search configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchSettings {
    #[serde(default = "d_depth")]
    pub depth: u32,
    #[serde(default = "d_use_quiescence")]
    pub use_quiescence: bool,
    #[serde(default = "d_max_ply")]
    pub max_ply: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            depth: defaults::depth(),
            use_quiescence: defaults::use_quiescence(),
            max_ply: defaults::max_ply(),
        }
    }
}

/// MCTS (Monte Carlo Tree Search) configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MctsSettings {
    #[serde(default = "d_num_sims")]
    pub num_simulations: u32,
    #[serde(default = "d_c_puct")]
    pub c_puct: f64,
    #[serde(default = "d_dirichlet_alpha")]
    pub dirichlet_alpha: f64,
    #[serde(default = "d_dirichlet_frac")]
    pub dirichlet_frac: f64,
    #[serde(default = "d_temperature")]
    pub temperature: f64,
    /// Wall-clock budget per search in milliseconds (None = unlimited)
    #[serde(default)]
    pub time_limit_ms: Option<u64>,
}

impl Default for MctsSettings {
    fn default() -> Self {
        Self {
            num_simulations: defaults::num_simulations(),
            c_puct: defaults::c_puct(),
            dirichlet_alpha: defaults::dirichlet_alpha(),
            dirichlet_frac: defaults::dirichlet_frac(),
            temperature: defaults::temperature(),
            time_limit_ms: None,
        }
    }
}
