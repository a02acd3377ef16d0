//! Best-worst response parsing and latent score estimation.
//!
//! Responses flow through three stages:
//!
//! 1. [`parse_rows`] / [`parse_files`] turn raw rows into
//!    [`ResponseTrial`]s, dropping and counting malformed rows.
//! 2. [`Aggregate::build`] scans the trials once into per-item counts, a
//!    pairwise win/loss ledger and an ordered game log.
//! 3. [`Scorer::score`] applies each requested method from a
//!    [`MethodRegistry`] exactly once and collects a [`ScoreTable`].
//!
//! ```
//! use bws_core::{Item, ResponseTrial};
//!
//! let trial = ResponseTrial::new(
//!     vec![Item::from("A"), Item::from("B")],
//!     Item::from("A"),
//!     Item::from("B"),
//! )
//! .unwrap();
//! let table = bws_score::score(&vec![trial; 4], &["Best", "BestWorst"]).unwrap();
//! assert_eq!(table.get("A", "BestWorst"), Some(4.0));
//! assert_eq!(table.get("B", "BestWorst"), Some(-4.0));
//! ```
//!
//! [`ResponseTrial`]: bws_core::ResponseTrial

mod config;
mod methods;
mod parse;
mod stats;
mod table;

use bws_core::errors::{BwsError, ErrorInfo};
use bws_core::ResponseTrial;

pub use config::{EloConfig, LogitConfig, RescorlaWagnerConfig, ScoringConfig};
pub use methods::{logit, names, MethodEntry, MethodFn, MethodName, MethodRegistry};
pub use parse::{
    parse_file, parse_files, parse_row, parse_rows, read_rows, ColumnSpec, ParseReport, RawRow,
    RejectedRow,
};
pub use stats::{Aggregate, Game, IndexedTrial, ItemStats, PairRecord};
pub use table::{ScoreTable, UNDEFINED_CELL};

/// Methods selected when the caller names none.
pub const DEFAULT_METHODS: [&str; 4] = [names::VALUE, names::BEST, names::WORST, names::BEST_WORST];

/// A registry paired with the constants its methods read.
///
/// A scorer holds no run state; concurrent runs may share one.
#[derive(Debug, Clone)]
pub struct Scorer {
    registry: MethodRegistry,
    config: ScoringConfig,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(MethodRegistry::standard(), ScoringConfig::default())
    }
}

impl Scorer {
    /// Scorer over an explicit registry and configuration.
    pub fn new(registry: MethodRegistry, config: ScoringConfig) -> Self {
        Self { registry, config }
    }

    /// Registry consulted for method names.
    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    /// Constants passed to every method.
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Scores `trials` under each requested method.
    ///
    /// Names are resolved before any work is done, so an unknown method fails
    /// the whole call. Repeated names are computed once.
    pub fn score<S: AsRef<str>>(
        &self,
        trials: &[ResponseTrial],
        methods: &[S],
    ) -> Result<ScoreTable, BwsError> {
        if methods.is_empty() {
            return Err(BwsError::UnknownMethod(
                ErrorInfo::new("no-methods", "no scoring methods requested")
                    .with_hint(format!("try {}", DEFAULT_METHODS.join(", "))),
            ));
        }
        let entries = self.registry.resolve(methods)?;
        let aggregate = Aggregate::build(trials)?;
        self.score_aggregate(&aggregate, &entries)
    }

    /// Applies already-resolved methods to a built aggregate.
    pub fn score_aggregate(
        &self,
        aggregate: &Aggregate,
        entries: &[&MethodEntry],
    ) -> Result<ScoreTable, BwsError> {
        let columns = entries
            .iter()
            .map(|entry| {
                let column = entry.apply(aggregate, &self.config)?;
                tracing::debug!(
                    method = entry.name.as_str(),
                    undefined = column.iter().filter(|value| value.is_nan()).count(),
                    "method applied"
                );
                Ok(column)
            })
            .collect::<Result<Vec<Vec<f64>>, BwsError>>()?;
        Ok(ScoreTable::from_columns(
            aggregate.iter().map(|(item, _)| item.clone()).collect(),
            entries.iter().map(|entry| entry.name.clone()).collect(),
            columns,
        ))
    }
}

/// Scores with the standard registry and default constants.
pub fn score<S: AsRef<str>>(trials: &[ResponseTrial], methods: &[S]) -> Result<ScoreTable, BwsError> {
    Scorer::default().score(trials, methods)
}
