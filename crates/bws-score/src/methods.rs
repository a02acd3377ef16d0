//! Scoring method table.
//!
//! Every method is a named pure function over an [`Aggregate`]. Count-based
//! methods look at one item's [`ItemStats`]; comparison-based methods see the
//! whole aggregate. Items without qualifying observations score `NaN`.

use std::borrow::Borrow;
use std::fmt;

use bws_core::errors::{BwsError, ErrorInfo};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;
use crate::stats::{Aggregate, ItemStats};

/// Name of a scoring method, as it appears in output headers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MethodName(String);

impl MethodName {
    /// Wraps a method name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MethodName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for MethodName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MethodName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Names of the built-in methods.
pub mod names {
    /// Tournament win share.
    pub const VALUE: &str = "Value";
    /// Elo replay.
    pub const ELO: &str = "Elo";
    /// Rescorla-Wagner learning.
    pub const RW: &str = "RW";
    /// Best count.
    pub const BEST: &str = "Best";
    /// Worst count.
    pub const WORST: &str = "Worst";
    /// Neither-best-nor-worst count.
    pub const UNCHOSEN: &str = "Unchosen";
    /// Best minus worst.
    pub const BEST_WORST: &str = "BestWorst";
    /// Best minus worst over presentations.
    pub const ABW: &str = "ABW";
    /// David's score.
    pub const DAVID: &str = "David";
    /// Log-odds of Value.
    pub const VALUE_LOGIT: &str = "ValueLogit";
    /// Log-odds of RW.
    pub const RW_LOGIT: &str = "RWLogit";
    /// Log-odds of ABW.
    pub const BEST_WORST_LOGIT: &str = "BestWorstLogit";
}

/// Function shape of a registered method.
#[derive(Clone, Copy)]
pub enum MethodFn {
    /// Depends only on the item's own statistics.
    PerItem(fn(&ItemStats, &ScoringConfig) -> f64),
    /// Depends on every item, returning one score per item in aggregate order.
    Population(fn(&Aggregate, &ScoringConfig) -> Vec<f64>),
}

impl fmt::Debug for MethodFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodFn::PerItem(_) => f.write_str("PerItem"),
            MethodFn::Population(_) => f.write_str("Population"),
        }
    }
}

/// A registered method.
#[derive(Debug, Clone)]
pub struct MethodEntry {
    /// Header name.
    pub name: MethodName,
    /// One-line description.
    pub description: &'static str,
    /// Implementation.
    pub function: MethodFn,
}

impl MethodEntry {
    /// Applies the method, returning one score per item in aggregate order.
    ///
    /// Fails with `method-length` when a population method returns a column
    /// whose length differs from the number of items.
    pub fn apply(&self, aggregate: &Aggregate, config: &ScoringConfig) -> Result<Vec<f64>, BwsError> {
        let column: Vec<f64> = match self.function {
            MethodFn::PerItem(function) => aggregate
                .all_stats()
                .map(|stats| function(stats, config))
                .collect(),
            MethodFn::Population(function) => function(aggregate, config),
        };
        if column.len() != aggregate.len() {
            return Err(BwsError::MethodFailed(
                ErrorInfo::new("method-length", "method returned the wrong number of scores")
                    .with_context("method", self.name.as_str())
                    .with_context("expected", aggregate.len().to_string())
                    .with_context("actual", column.len().to_string()),
            ));
        }
        Ok(column)
    }
}

/// Name-to-function table, passed explicitly to each scoring run.
#[derive(Debug, Clone, Default)]
pub struct MethodRegistry {
    entries: IndexMap<MethodName, MethodEntry>,
}

impl MethodRegistry {
    /// Empty registry.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry holding the twelve built-in methods.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        let builtins: [(&str, &'static str, MethodFn); 12] = [
            (names::VALUE, "share of pairwise encounters won", MethodFn::PerItem(value)),
            (names::ELO, "Elo rating after replaying every implied game", MethodFn::Population(elo)),
            (names::RW, "Rescorla-Wagner associative strength", MethodFn::Population(rescorla_wagner)),
            (names::BEST, "times chosen best", MethodFn::PerItem(best)),
            (names::WORST, "times chosen worst", MethodFn::PerItem(worst)),
            (names::UNCHOSEN, "times shown but chosen neither best nor worst", MethodFn::PerItem(unchosen)),
            (names::BEST_WORST, "best count minus worst count", MethodFn::PerItem(best_worst)),
            (names::ABW, "best minus worst, divided by presentations", MethodFn::PerItem(adjusted_best_worst)),
            (names::DAVID, "David's score over pairwise win proportions", MethodFn::Population(david)),
            (names::VALUE_LOGIT, "log-odds of Value", MethodFn::PerItem(value_logit)),
            (names::RW_LOGIT, "log-odds of rescaled RW strength", MethodFn::Population(rescorla_wagner_logit)),
            (names::BEST_WORST_LOGIT, "log-odds of rescaled ABW", MethodFn::PerItem(best_worst_logit)),
        ];
        for (name, description, function) in builtins {
            registry.register(name, description, function);
        }
        registry
    }

    /// Adds or replaces a method.
    pub fn register(&mut self, name: &str, description: &'static str, function: MethodFn) {
        let name = MethodName::new(name);
        self.entries.insert(
            name.clone(),
            MethodEntry {
                name,
                description,
                function,
            },
        );
    }

    /// Looks a method up by exact name, then case-insensitively.
    pub fn get(&self, name: &str) -> Option<&MethodEntry> {
        self.entries.get(name).or_else(|| {
            self.entries
                .values()
                .find(|entry| entry.name.as_str().eq_ignore_ascii_case(name))
        })
    }

    /// Registered methods in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &MethodEntry> + '_ {
        self.entries.values()
    }

    /// Resolves requested names, dropping repeats and keeping first-request order.
    pub fn resolve<S: AsRef<str>>(&self, requested: &[S]) -> Result<Vec<&MethodEntry>, BwsError> {
        let mut resolved: Vec<&MethodEntry> = Vec::with_capacity(requested.len());
        for name in requested {
            let name = name.as_ref();
            let entry = self.get(name).ok_or_else(|| {
                let known: Vec<&str> = self.entries.keys().map(MethodName::as_str).collect();
                BwsError::UnknownMethod(
                    ErrorInfo::new("unknown-method", "scoring method is not registered")
                        .with_context("method", name)
                        .with_hint(format!("available: {}", known.join(", "))),
                )
            })?;
            if !resolved.iter().any(|seen| seen.name == entry.name) {
                resolved.push(entry);
            }
        }
        Ok(resolved)
    }
}

fn counted(stats: &ItemStats, value: f64) -> f64 {
    if stats.presentations == 0 {
        f64::NAN
    } else {
        value
    }
}

/// Log-odds of `p` after clamping to `[epsilon, 1 - epsilon]`; `NaN` stays `NaN`.
pub fn logit(p: f64, epsilon: f64) -> f64 {
    let p = p.clamp(epsilon, 1.0 - epsilon);
    (p / (1.0 - p)).ln()
}

fn best(stats: &ItemStats, _: &ScoringConfig) -> f64 {
    counted(stats, f64::from(stats.best))
}

fn worst(stats: &ItemStats, _: &ScoringConfig) -> f64 {
    counted(stats, f64::from(stats.worst))
}

fn unchosen(stats: &ItemStats, _: &ScoringConfig) -> f64 {
    counted(stats, f64::from(stats.unchosen()))
}

fn best_worst(stats: &ItemStats, _: &ScoringConfig) -> f64 {
    counted(stats, f64::from(stats.best) - f64::from(stats.worst))
}

fn adjusted_best_worst(stats: &ItemStats, config: &ScoringConfig) -> f64 {
    best_worst(stats, config) / f64::from(stats.presentations)
}

fn best_worst_logit(stats: &ItemStats, config: &ScoringConfig) -> f64 {
    let share = (adjusted_best_worst(stats, config) + 1.0) / 2.0;
    logit(share, config.logit.epsilon)
}

fn value(stats: &ItemStats, _: &ScoringConfig) -> f64 {
    match stats.encounters() {
        0 => f64::NAN,
        n => f64::from(stats.wins()) / f64::from(n),
    }
}

fn value_logit(stats: &ItemStats, config: &ScoringConfig) -> f64 {
    logit(value(stats, config), config.logit.epsilon)
}

/// David's score: `w + w2 - l - l2` over per-opponent win proportions.
///
/// `w` sums the item's win proportion against each opponent it met, `w2`
/// weights those proportions by the opponents' own `w`; `l` and `l2` mirror
/// them for losses. Each opponent contributes at most one unit to `w`, so
/// beating many opponents counts more than beating one opponent many times.
fn david(aggregate: &Aggregate, _: &ScoringConfig) -> Vec<f64> {
    let proportions: Vec<Vec<(usize, f64)>> = aggregate
        .all_stats()
        .map(|stats| {
            stats
                .ledger
                .iter()
                .filter_map(|(&opponent, record)| record.win_rate().map(|p| (opponent, p)))
                .collect()
        })
        .collect();
    let w: Vec<f64> = proportions
        .iter()
        .map(|row| row.iter().map(|(_, p)| p).sum())
        .collect();
    let l: Vec<f64> = proportions
        .iter()
        .map(|row| row.iter().map(|(_, p)| 1.0 - p).sum())
        .collect();
    proportions
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            if row.is_empty() {
                return f64::NAN;
            }
            let w2: f64 = row.iter().map(|&(j, p)| p * w[j]).sum();
            let l2: f64 = row.iter().map(|&(j, p)| (1.0 - p) * l[j]).sum();
            w[idx] + w2 - l[idx] - l2
        })
        .collect()
}

/// Replays every implied game in trial order with the logistic Elo update.
fn elo(aggregate: &Aggregate, config: &ScoringConfig) -> Vec<f64> {
    let crate::config::EloConfig {
        baseline,
        k_factor,
        scale,
    } = config.elo;
    let mut ratings = vec![baseline; aggregate.len()];
    for game in aggregate.games() {
        let gap = ratings[game.loser] - ratings[game.winner];
        let expected = 1.0 / (1.0 + 10f64.powf(gap / scale));
        let delta = k_factor * (1.0 - expected);
        ratings[game.winner] += delta;
        ratings[game.loser] -= delta;
    }
    aggregate
        .all_stats()
        .zip(ratings)
        .map(|(stats, rating)| if stats.encounters() == 0 { f64::NAN } else { rating })
        .collect()
}

/// Incremental associative strengths, processed in trial order.
///
/// Strengths start at zero. In each trial an item's prediction is its
/// strength relative to the mean strength of the options shown; the best
/// item moves toward `+1` and the worst toward `-1` by `learning_rate` times
/// the prediction error. Both errors use the strengths from before the trial.
fn rescorla_wagner(aggregate: &Aggregate, config: &ScoringConfig) -> Vec<f64> {
    let rate = config.rescorla_wagner.learning_rate;
    let mut strength = vec![0.0f64; aggregate.len()];
    for trial in aggregate.trials() {
        let mean = trial.options.iter().map(|&idx| strength[idx]).sum::<f64>()
            / trial.options.len() as f64;
        let best_error = 1.0 - (strength[trial.best] - mean);
        let worst_error = -1.0 - (strength[trial.worst] - mean);
        strength[trial.best] += rate * best_error;
        strength[trial.worst] += rate * worst_error;
    }
    aggregate
        .all_stats()
        .zip(strength)
        .map(|(stats, value)| counted(stats, value))
        .collect()
}

/// RW strength rescaled from `[-1, 1]` to `[0, 1]`, then log-odds.
fn rescorla_wagner_logit(aggregate: &Aggregate, config: &ScoringConfig) -> Vec<f64> {
    rescorla_wagner(aggregate, config)
        .into_iter()
        .map(|strength| logit((strength + 1.0) / 2.0, config.logit.epsilon))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logit_is_symmetric_and_clamped() {
        assert_eq!(logit(0.5, 0.001), 0.0);
        assert!((logit(0.8, 0.001) + logit(0.2, 0.001)).abs() < 1e-12);
        assert!(logit(1.0, 0.001).is_finite());
        assert!(logit(0.0, 0.001) < 0.0);
        assert!(logit(f64::NAN, 0.001).is_nan());
    }

    #[test]
    fn zero_presentations_score_nan() {
        let stats = ItemStats::default();
        let config = ScoringConfig::default();
        let functions: [fn(&ItemStats, &ScoringConfig) -> f64; 7] =
            [best, worst, unchosen, best_worst, adjusted_best_worst, value, value_logit];
        for function in functions {
            assert!(function(&stats, &config).is_nan());
        }
    }

    #[test]
    fn resolve_dedupes_and_ignores_case() {
        let registry = MethodRegistry::standard();
        let resolved = registry
            .resolve(&["Value", "best", "Value", "Best"])
            .expect("known methods");
        let names: Vec<&str> = resolved.iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, vec!["Value", "Best"]);
    }

    #[test]
    fn unknown_methods_list_alternatives() {
        let err = MethodRegistry::standard().resolve(&["Borda"]).unwrap_err();
        assert!(matches!(err, BwsError::UnknownMethod(_)));
        assert!(err.info().hint.as_deref().unwrap_or("").contains("BestWorstLogit"));
    }
}
