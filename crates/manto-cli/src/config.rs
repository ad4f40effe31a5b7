use mantoqsar::engine::regression::ensemble::EnsembleConfig;
use serde::Deserialize;

/// Ensemble run configuration, loaded from a TOML file next to the project
/// settings. Every field is optional and defaults to the library defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub members: usize,
    pub model_size: usize,
    pub select_fraction: f64,
    pub predict_fraction: f64,
    pub min_model_r_square: f64,
    pub min_predictive_r_square: f64,
    pub log_scale: bool,
    pub normalize: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        let defaults = EnsembleConfig::default();
        Self {
            members: defaults.members,
            model_size: defaults.model_size,
            select_fraction: defaults.select_fraction,
            predict_fraction: defaults.predict_fraction,
            min_model_r_square: defaults.min_model_r_square,
            min_predictive_r_square: defaults.min_predictive_r_square,
            log_scale: defaults.log_scale,
            normalize: defaults.normalize,
        }
    }
}

impl RunConfig {
    pub fn to_ensemble_config(&self) -> EnsembleConfig {
        EnsembleConfig {
            members: self.members,
            model_size: self.model_size,
            select_fraction: self.select_fraction,
            predict_fraction: self.predict_fraction,
            min_model_r_square: self.min_model_r_square,
            min_predictive_r_square: self.min_predictive_r_square,
            log_scale: self.log_scale,
            normalize: self.normalize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: RunConfig = toml::from_str("members = 10\nlog_scale = false").unwrap();
        assert_eq!(config.members, 10);
        assert!(!config.log_scale);
        assert_eq!(config.predict_fraction, 0.15);
        assert_eq!(config.model_size, 7);
    }
}
