use std::fmt;
use std::str::FromStr;

use bws_core::errors::{BwsError, ErrorInfo};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::generator::Shape;

/// Balance policy used to assemble trials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Independent uniform samples of `K` items per trial.
    Random,
    /// Presentation counts balanced to within one across items.
    Even,
    /// Random sampling that avoids repeating item pairs.
    Norepeat,
    /// Balanced presentation counts and pair novelty together.
    #[default]
    NorepeatEven,
}

impl Strategy {
    /// Every strategy, in the order they are offered to users.
    pub const ALL: [Strategy; 4] = [
        Strategy::NorepeatEven,
        Strategy::Even,
        Strategy::Random,
        Strategy::Norepeat,
    ];

    /// Lowercase selector accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Random => "random",
            Strategy::Even => "even",
            Strategy::Norepeat => "norepeat",
            Strategy::NorepeatEven => "norepeateven",
        }
    }

    /// Whether the strategy keeps presentation counts within one of each other.
    pub fn balances_presentations(&self) -> bool {
        matches!(self, Strategy::Even | Strategy::NorepeatEven)
    }

    /// Whether the strategy tries to avoid repeated item pairs.
    pub fn avoids_repeats(&self) -> bool {
        matches!(self, Strategy::Norepeat | Strategy::NorepeatEven)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a strategy selector is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown strategy `{0}` (expected one of: norepeateven, even, random, norepeat)")]
pub struct UnknownStrategy(pub String);

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == needle)
            .ok_or_else(|| UnknownStrategy(s.to_string()))
    }
}

/// File-configurable design defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignConfig {
    /// Strategy used when none is given on the command line.
    #[serde(default)]
    pub strategy: Strategy,
    /// Items per trial.
    #[serde(default = "DesignConfig::default_k")]
    pub k: usize,
    /// Default trial count is `pool size × trials_per_item`.
    #[serde(default = "DesignConfig::default_trials_per_item")]
    pub trials_per_item: usize,
    /// Search nodes spent per pass by `norepeateven` before relaxing novelty.
    #[serde(default = "DesignConfig::default_search_budget")]
    pub search_budget: usize,
    /// Random restarts spent before relaxing novelty: per trial by `norepeat`,
    /// per design by `norepeateven`.
    #[serde(default = "DesignConfig::default_retry_budget")]
    pub retry_budget: usize,
}

impl DesignConfig {
    const fn default_k() -> usize {
        4
    }

    const fn default_trials_per_item() -> usize {
        8
    }

    const fn default_search_budget() -> usize {
        20_000
    }

    const fn default_retry_budget() -> usize {
        64
    }
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            k: Self::default_k(),
            trials_per_item: Self::default_trials_per_item(),
            search_budget: Self::default_search_budget(),
            retry_budget: Self::default_retry_budget(),
        }
    }
}

/// Parameters of a single generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignParams {
    /// Number of trials `N`.
    pub trials: usize,
    /// Items per trial `K`.
    pub k: usize,
    /// Balance policy.
    pub strategy: Strategy,
    /// See [`DesignConfig::search_budget`].
    pub search_budget: usize,
    /// See [`DesignConfig::retry_budget`].
    pub retry_budget: usize,
    /// Fail with [`BwsError::InfeasibleConstraint`] instead of relaxing pair novelty.
    #[serde(default)]
    pub strict_novelty: bool,
}

impl DesignParams {
    /// Parameters with default search budgets.
    pub fn new(trials: usize, k: usize, strategy: Strategy) -> Self {
        let defaults = DesignConfig::default();
        Self {
            trials,
            k,
            strategy,
            search_budget: defaults.search_budget,
            retry_budget: defaults.retry_budget,
            strict_novelty: false,
        }
    }

    /// Resolves parameters from configuration, defaulting `N` to `pool_size × trials_per_item`.
    pub fn from_config(config: &DesignConfig, pool_size: usize, trials: Option<usize>) -> Self {
        Self {
            trials: trials.unwrap_or(pool_size * config.trials_per_item),
            k: config.k,
            strategy: config.strategy,
            search_budget: config.search_budget,
            retry_budget: config.retry_budget,
            strict_novelty: false,
        }
    }

    /// Checks `K >= 2`, `N >= 1` and that the pool holds at least `K` items.
    pub fn validate(&self, pool_size: usize) -> Result<(), BwsError> {
        let info = |code: &str, message: &str| {
            ErrorInfo::new(code, message)
                .with_context("trials", self.trials.to_string())
                .with_context("k", self.k.to_string())
                .with_context("pool_size", pool_size.to_string())
        };
        if self.k < 2 {
            return Err(BwsError::InvalidDesignParameters(info(
                "k-too-small",
                "items per trial must be at least 2",
            )));
        }
        if self.trials == 0 {
            return Err(BwsError::InvalidDesignParameters(info(
                "no-trials",
                "at least one trial must be requested",
            )));
        }
        if pool_size < self.k {
            return Err(BwsError::InvalidDesignParameters(
                info("pool-too-small", "pool holds fewer items than one trial needs")
                    .with_hint("supply more items or lower K"),
            ));
        }
        Ok(())
    }

    /// Upper bound on the number of trials whose pairs can all be novel.
    pub fn novel_trial_capacity(&self, pool_size: usize) -> usize {
        Shape {
            pool_size,
            trials: self.trials,
            k: self.k,
        }
        .novel_trial_capacity()
    }
}

/// Suggestion emitted when a balanced design cannot give every item the same count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceAdvice {
    /// `N × K`, the total number of presentations requested.
    pub presentations: usize,
    /// Pool size the presentations are spread over.
    pub pool_size: usize,
    /// Trial counts that divide evenly.
    pub suggested_trials: Vec<usize>,
}

/// Returns advice when a balancing strategy is asked for `N·K` not divisible by the pool size.
pub fn balance_advice(params: &DesignParams, pool_size: usize) -> Option<BalanceAdvice> {
    if !params.strategy.balances_presentations() || pool_size == 0 {
        return None;
    }
    let presentations = params.trials * params.k;
    if presentations % pool_size == 0 {
        return None;
    }
    Some(BalanceAdvice {
        presentations,
        pool_size,
        suggested_trials: [4, 6, 8, 10, 12, 16]
            .into_iter()
            .map(|factor| pool_size * factor)
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_selectors_parse() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.as_str().parse::<Strategy>(), Ok(strategy));
        }
        assert_eq!("NoRepeatEven".parse::<Strategy>(), Ok(Strategy::NorepeatEven));
        assert!("balanced".parse::<Strategy>().is_err());
    }

    #[test]
    fn validate_rejects_bad_shapes() {
        let err = DesignParams::new(10, 1, Strategy::Random).validate(5).unwrap_err();
        assert_eq!(err.info().code, "k-too-small");
        let err = DesignParams::new(0, 2, Strategy::Random).validate(5).unwrap_err();
        assert_eq!(err.info().code, "no-trials");
        let err = DesignParams::new(3, 6, Strategy::Even).validate(5).unwrap_err();
        assert_eq!(err.info().code, "pool-too-small");
        assert!(err.info().hint.is_some());
        assert!(DesignParams::new(3, 5, Strategy::Even).validate(5).is_ok());
    }

    #[test]
    fn default_trials_follow_pool_size() {
        let params = DesignParams::from_config(&DesignConfig::default(), 12, None);
        assert_eq!(params.trials, 96);
        assert_eq!(params.k, 4);
        assert_eq!(params.strategy, Strategy::NorepeatEven);
    }

    #[test]
    fn advice_only_for_uneven_balanced_designs() {
        let even = DesignParams::new(7, 4, Strategy::Even);
        let advice = balance_advice(&even, 10).expect("28 is not a multiple of 10");
        assert_eq!(advice.suggested_trials, vec![40, 60, 80, 100, 120, 160]);
        assert!(balance_advice(&DesignParams::new(5, 4, Strategy::Even), 10).is_none());
        assert!(balance_advice(&DesignParams::new(7, 4, Strategy::Random), 10).is_none());
    }

    #[test]
    fn capacity_counts_disjoint_pair_budget() {
        let params = DesignParams::new(1, 3, Strategy::NorepeatEven);
        assert_eq!(params.novel_trial_capacity(9), 12);
    }
}
