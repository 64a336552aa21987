//! CLI configuration from environment.

use gplan_core::EvaluationConfig;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub sample_spacing_m: f64,
    pub altitude_m: f64,
}

impl Default for Config {
    fn default() -> Self {
        let defaults = EvaluationConfig::default();
        Self {
            sample_spacing_m: defaults.sample_spacing_m,
            altitude_m: defaults.default_altitude_m,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            sample_spacing_m: env::var("GPLAN_SAMPLE_SPACING_M")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.sample_spacing_m),
            altitude_m: env::var("GPLAN_ALTITUDE_M")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.altitude_m),
        }
    }

    pub fn evaluation(&self) -> EvaluationConfig {
        EvaluationConfig {
            sample_spacing_m: self.sample_spacing_m,
            default_altitude_m: self.altitude_m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_core_config() {
        let core = EvaluationConfig::default();
        let config = Config::default();
        assert_eq!(config.sample_spacing_m, core.sample_spacing_m);
        assert_eq!(config.altitude_m, core.default_altitude_m);
    }

    #[test]
    fn evaluation_carries_overrides() {
        let config = Config {
            sample_spacing_m: 10.0,
            altitude_m: 120.0,
        };
        let evaluation = config.evaluation();
        assert_eq!(evaluation.sample_spacing_m, 10.0);
        assert_eq!(evaluation.default_altitude_m, 120.0);
    }
}
