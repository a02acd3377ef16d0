use bws_core::RngHandle;
use serde::{Deserialize, Serialize};

use crate::even::EvenGenerator;
use crate::norepeat::NorepeatGenerator;
use crate::norepeat_even::NorepeatEvenGenerator;
use crate::params::{DesignParams, Strategy};
use crate::random::RandomGenerator;

/// Dimensions of a design, in pool indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    /// Pool size `M`.
    pub pool_size: usize,
    /// Trial count `N`.
    pub trials: usize,
    /// Items per trial `K`.
    pub k: usize,
}

impl Shape {
    /// Trials that fit before some pair must repeat: ⌊C(M,2) / C(K,2)⌋.
    pub fn novel_trial_capacity(&self) -> usize {
        let pairs_per_trial = self.k * self.k.saturating_sub(1) / 2;
        let available = self.pool_size * self.pool_size.saturating_sub(1) / 2;
        available / pairs_per_trial.max(1)
    }
}

/// A row emitted after the pair-novelty constraint was relaxed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relaxation {
    /// Zero-based trial index.
    pub row: usize,
    /// Pairs in the row that already appeared in an earlier row.
    pub repeated_pairs: usize,
}

/// Raw generator output: rows of pool indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    /// Generated trials in generation order.
    pub rows: Vec<Vec<usize>>,
    /// Rows produced under relaxation.
    pub relaxations: Vec<Relaxation>,
}

/// Contract shared by every design strategy.
pub trait TrialGenerator: Send + Sync {
    /// Strategy implemented by this generator.
    fn strategy(&self) -> Strategy;

    /// Draws `shape.trials` rows of `shape.k` distinct indices below `shape.pool_size`.
    ///
    /// Callers validate the shape first.
    fn draw(&self, shape: Shape, rng: &mut RngHandle) -> Draft;
}

impl Strategy {
    /// Builds the generator for this strategy.
    pub fn generator(&self, params: &DesignParams) -> Box<dyn TrialGenerator> {
        match self {
            Strategy::Random => Box::new(RandomGenerator),
            Strategy::Even => Box::new(EvenGenerator),
            Strategy::Norepeat => Box::new(NorepeatGenerator {
                retry_budget: params.retry_budget,
            }),
            Strategy::NorepeatEven => Box::new(NorepeatEvenGenerator {
                search_budget: params.search_budget,
                restarts: params.retry_budget,
            }),
        }
    }
}
