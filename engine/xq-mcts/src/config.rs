//! Search configuration.

use std::time::Duration;

use xq_config::MctsSettings;

/// Tunable parameters for one MCTS search.
#[derive(Debug, Clone)]
pub struct MctsConfig {
    /// Simulation budget per search.
    pub num_simulations: u32,
    /// Exploration constant in the PUCT formula.
    pub c_puct: f64,
    /// Dirichlet concentration for root noise; zero disables noise.
    pub dirichlet_alpha: f64,
    /// Fraction of root prior mass replaced by noise.
    pub dirichlet_frac: f64,
    /// Visit-count temperature for move selection.
    pub temperature: f64,
    /// Optional wall-clock budget, checked between simulations.
    pub time_limit: Option<Duration>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        MctsConfig {
            num_simulations: xq_config::num_simulations(),
            c_puct: xq_config::c_puct(),
            dirichlet_alpha: xq_config::dirichlet_alpha(),
            dirichlet_frac: xq_config::dirichlet_frac(),
            temperature: xq_config::temperature(),
            time_limit: None,
        }
    }
}

impl MctsConfig {
    /// Build from loaded settings (config.toml plus env overrides).
    pub fn from_settings(settings: &MctsSettings) -> MctsConfig {
        MctsConfig {
            num_simulations: settings.num_simulations,
            c_puct: settings.c_puct,
            dirichlet_alpha: settings.dirichlet_alpha,
            dirichlet_frac: settings.dirichlet_frac,
            temperature: settings.temperature,
            time_limit: settings.time_limit_ms.map(Duration::from_millis),
        }
    }

    /// Exploratory settings for self-play data generation: root noise
    /// on, sampling temperature 1.
    pub fn for_selfplay() -> MctsConfig {
        MctsConfig {
            temperature: 1.0,
            ..MctsConfig::default()
        }
    }

    /// Deterministic, noiseless settings for competitive play.
    pub fn for_evaluation() -> MctsConfig {
        MctsConfig {
            dirichlet_alpha: 0.0,
            temperature: 0.0,
            ..MctsConfig::default()
        }
    }

    /// Small, fast settings for unit tests.
    pub fn for_testing() -> MctsConfig {
        MctsConfig {
            num_simulations: 32,
            dirichlet_alpha: 0.0,
            temperature: 0.0,
            ..MctsConfig::default()
        }
    }

    pub fn with_simulations(mut self, num_simulations: u32) -> MctsConfig {
        self.num_simulations = num_simulations;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> MctsConfig {
        self.temperature = temperature;
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> MctsConfig {
        self.time_limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_config_crate() {
        let config = MctsConfig::default();
        assert_eq!(config.num_simulations, 200);
        assert!((config.c_puct - 1.5).abs() < f64::EPSILON);
        assert!(config.time_limit.is_none());
    }

    #[test]
    fn test_from_settings() {
        let mut settings = MctsSettings::default();
        settings.num_simulations = 64;
        settings.time_limit_ms = Some(50);
        let config = MctsConfig::from_settings(&settings);
        assert_eq!(config.num_simulations, 64);
        assert_eq!(config.time_limit, Some(Duration::from_millis(50)));
    }

    #[test]
    fn test_evaluation_profile_is_deterministic() {
        let config = MctsConfig::for_evaluation();
        assert_eq!(config.dirichlet_alpha, 0.0);
        assert_eq!(config.temperature, 0.0);
    }

    #[test]
    fn test_selfplay_profile_explores() {
        let config = MctsConfig::for_selfplay();
        assert!(config.dirichlet_alpha > 0.0);
        assert!((config.temperature - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_testing_profile_is_small() {
        let config = MctsConfig::for_testing();
        assert_eq!(config.num_simulations, 32);
        assert_eq!(config.dirichlet_alpha, 0.0);
    }

    #[test]
    fn test_builders() {
        let config = MctsConfig::default()
            .with_simulations(10)
            .with_temperature(0.5)
            .with_time_limit(Duration::from_millis(5));
        assert_eq!(config.num_simulations, 10);
        assert!((config.temperature - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.time_limit, Some(Duration::from_millis(5)));
    }
}
