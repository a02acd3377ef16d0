use bws_core::errors::{BwsError, ErrorInfo};
use serde::{Deserialize, Serialize};

/// Elo replay constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EloConfig {
    /// Starting rating shared by every item.
    #[serde(default = "EloConfig::default_baseline")]
    pub baseline: f64,
    /// Step size applied to each game's surprise.
    #[serde(default = "EloConfig::default_k_factor")]
    pub k_factor: f64,
    /// Rating difference at which the expected score is 10:1.
    #[serde(default = "EloConfig::default_scale")]
    pub scale: f64,
}

impl EloConfig {
    const fn default_baseline() -> f64 {
        1500.0
    }

    const fn default_k_factor() -> f64 {
        32.0
    }

    const fn default_scale() -> f64 {
        400.0
    }
}

impl Default for EloConfig {
    fn default() -> Self {
        Self {
            baseline: Self::default_baseline(),
            k_factor: Self::default_k_factor(),
            scale: Self::default_scale(),
        }
    }
}

/// Rescorla-Wagner constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RescorlaWagnerConfig {
    /// Fraction of the prediction error applied per trial.
    #[serde(default = "RescorlaWagnerConfig::default_learning_rate")]
    pub learning_rate: f64,
}

impl RescorlaWagnerConfig {
    const fn default_learning_rate() -> f64 {
        0.1
    }
}

impl Default for RescorlaWagnerConfig {
    fn default() -> Self {
        Self {
            learning_rate: Self::default_learning_rate(),
        }
    }
}

/// Log-odds transform constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogitConfig {
    /// Proportions are clamped to `[epsilon, 1 - epsilon]` before the transform.
    #[serde(default = "LogitConfig::default_epsilon")]
    pub epsilon: f64,
}

impl LogitConfig {
    const fn default_epsilon() -> f64 {
        0.001
    }
}

impl Default for LogitConfig {
    fn default() -> Self {
        Self {
            epsilon: Self::default_epsilon(),
        }
    }
}

/// Methodological constants used by the scoring methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ScoringConfig {
    /// Elo replay settings.
    #[serde(default)]
    pub elo: EloConfig,
    /// Rescorla-Wagner settings.
    #[serde(default)]
    pub rescorla_wagner: RescorlaWagnerConfig,
    /// Logit clamp settings.
    #[serde(default)]
    pub logit: LogitConfig,
}

impl ScoringConfig {
    /// Parses a YAML document; missing keys take their defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self, BwsError> {
        let config: ScoringConfig = serde_yaml::from_str(text).map_err(|err| {
            BwsError::Serde(ErrorInfo::new("scoring-config", "invalid scoring configuration").with_hint(err.to_string()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects constants that would make scores meaningless.
    pub fn validate(&self) -> Result<(), BwsError> {
        let bad = |key: &str, value: f64| {
            Err(BwsError::Serde(
                ErrorInfo::new("scoring-config-range", "scoring constant out of range")
                    .with_context("key", key)
                    .with_context("value", value.to_string()),
            ))
        };
        if !(self.elo.k_factor.is_finite() && self.elo.k_factor > 0.0) {
            return bad("elo.k_factor", self.elo.k_factor);
        }
        if !(self.elo.scale.is_finite() && self.elo.scale > 0.0) {
            return bad("elo.scale", self.elo.scale);
        }
        if !self.elo.baseline.is_finite() {
            return bad("elo.baseline", self.elo.baseline);
        }
        let rate = self.rescorla_wagner.learning_rate;
        if !(rate > 0.0 && rate <= 1.0) {
            return bad("rescorla_wagner.learning_rate", rate);
        }
        let epsilon = self.logit.epsilon;
        if !(epsilon > 0.0 && epsilon < 0.5) {
            return bad("logit.epsilon", epsilon);
        }
        Ok(())
    }
}
