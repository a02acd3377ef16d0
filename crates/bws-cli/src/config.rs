use std::fs;
use std::path::Path;

use bws_core::errors::{BwsError, ErrorInfo};
use bws_design::DesignConfig;
use bws_exp::SimulationConfig;
use bws_score::{ColumnSpec, ScoringConfig};
use serde::{Deserialize, Serialize};

/// Contents of the `--config` YAML file; every section is optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BwsConfig {
    #[serde(default)]
    pub design: DesignConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub columns: ColumnSpec,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl BwsConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, BwsError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: BwsConfig = serde_yaml::from_str(text).map_err(|err| {
            BwsError::Serde(ErrorInfo::new("config-parse", "invalid configuration file").with_hint(err.to_string()))
        })?;
        config.scoring.validate()?;
        Ok(config)
    }

    pub fn load(path: Option<&Path>) -> Result<Self, BwsError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path).map_err(|err| BwsError::io("config-read", path.display(), err))?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bws_design::Strategy;

    #[test]
    fn sections_default_independently() {
        let config = BwsConfig::from_yaml_str(
            "design:\n  strategy: even\n  k: 3\nscoring:\n  elo:\n    k_factor: 24\n",
        )
        .expect("config");
        assert_eq!(config.design.strategy, Strategy::Even);
        assert_eq!(config.design.k, 3);
        assert_eq!(config.design.trials_per_item, 8);
        assert_eq!(config.scoring.elo.k_factor, 24.0);
        assert_eq!(config.columns, ColumnSpec::default());
        assert_eq!(config.simulation.participants, 20);
    }

    #[test]
    fn empty_files_mean_defaults() {
        assert_eq!(BwsConfig::from_yaml_str("\n").expect("config"), BwsConfig::default());
    }

    #[test]
    fn scoring_ranges_are_checked() {
        let err = BwsConfig::from_yaml_str("scoring:\n  elo:\n    scale: -1\n").unwrap_err();
        assert_eq!(err.info().code, "scoring-config-range");
    }
}
