use bws_core::errors::{BwsError, ErrorInfo};
use bws_core::{Item, ItemPool, RngHandle, Trial};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::generator::{Relaxation, Shape};
use crate::ledger::PairLedger;
use crate::params::{DesignParams, Strategy};

/// A generated design plus its balance diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Design {
    /// Strategy that produced the design.
    pub strategy: Strategy,
    /// Items per trial.
    pub k: usize,
    trials: Vec<Trial>,
    relaxations: Vec<Relaxation>,
    presentations: IndexMap<Item, usize>,
    repeated_pairs: usize,
}

impl Design {
    /// Trials in generation order.
    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    /// Rows produced after relaxing pair novelty.
    pub fn relaxations(&self) -> &[Relaxation] {
        &self.relaxations
    }

    /// Whether the given row was produced under relaxation.
    pub fn is_relaxed(&self, row: usize) -> bool {
        self.relaxations.iter().any(|relaxation| relaxation.row == row)
    }

    /// Presentation count per pool item, in pool order (unused items count zero).
    pub fn presentations(&self) -> &IndexMap<Item, usize> {
        &self.presentations
    }

    /// Difference between the most and least presented items.
    pub fn presentation_spread(&self) -> usize {
        let max = self.presentations.values().copied().max().unwrap_or(0);
        let min = self.presentations.values().copied().min().unwrap_or(0);
        max - min
    }

    /// Pair co-occurrences beyond the first, summed over all pairs.
    pub fn repeated_pairs(&self) -> usize {
        self.repeated_pairs
    }
}

/// Generates a design of `params.trials` trials over `pool`.
///
/// Fails fast with [`BwsError::InvalidDesignParameters`] before drawing any
/// randomness. Rows whose pair novelty had to be relaxed are reported in
/// [`Design::relaxations`]; with `strict_novelty` set they turn into
/// [`BwsError::InfeasibleConstraint`] instead.
pub fn generate(
    pool: &ItemPool,
    params: &DesignParams,
    rng: &mut RngHandle,
) -> Result<Design, BwsError> {
    params.validate(pool.len())?;
    let shape = Shape {
        pool_size: pool.len(),
        trials: params.trials,
        k: params.k,
    };
    if params.strategy.avoids_repeats() && params.trials > params.novel_trial_capacity(pool.len())
    {
        tracing::warn!(
            trials = params.trials,
            capacity = params.novel_trial_capacity(pool.len()),
            "more trials than unique pairs allow; repeated pairs will be minimised, not avoided"
        );
    }

    let generator = params.strategy.generator(params);
    let draft = generator.draw(shape, rng);

    if params.strict_novelty && !draft.relaxations.is_empty() {
        let rows: Vec<String> = draft
            .relaxations
            .iter()
            .map(|relaxation| relaxation.row.to_string())
            .collect();
        return Err(BwsError::InfeasibleConstraint(
            ErrorInfo::new("pair-novelty", "could not avoid repeated pairs in every trial")
                .with_context("strategy", params.strategy.as_str())
                .with_context("rows", rows.join(";"))
                .with_hint("lower N, lower K or add items"),
        ));
    }

    let mut ledger = PairLedger::new();
    let mut presentations: IndexMap<Item, usize> = pool.iter().map(|item| (item.clone(), 0)).collect();
    let mut trials = Vec::with_capacity(draft.rows.len());
    for row in &draft.rows {
        ledger.record(row);
        let mut options = Vec::with_capacity(row.len());
        for &idx in row {
            let item = pool.get(idx).ok_or_else(|| {
                BwsError::InvalidDesignParameters(
                    ErrorInfo::new("index-out-of-pool", "generator produced an unknown item")
                        .with_context("index", idx.to_string()),
                )
            })?;
            if let Some(count) = presentations.get_mut(item) {
                *count += 1;
            }
            options.push(item.clone());
        }
        trials.push(Trial::new(options)?);
    }

    tracing::debug!(
        strategy = %params.strategy,
        trials = trials.len(),
        relaxed = draft.relaxations.len(),
        repeated_pairs = ledger.surplus(),
        "design generated"
    );

    Ok(Design {
        strategy: generator.strategy(),
        k: params.k,
        trials,
        relaxations: draft.relaxations,
        presentations,
        repeated_pairs: ledger.surplus(),
    })
}
