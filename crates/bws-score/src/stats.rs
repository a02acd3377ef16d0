//! Per-item aggregation of response trials.

use bws_core::errors::{BwsError, ErrorInfo};
use bws_core::{Item, ResponseTrial};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Head-to-head record against one opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PairRecord {
    /// Times this item was preferred over the opponent.
    pub wins: u32,
    /// Times the opponent was preferred over this item.
    pub losses: u32,
}

impl PairRecord {
    /// Wins plus losses.
    pub fn encounters(&self) -> u32 {
        self.wins + self.losses
    }

    /// Share of encounters won, or `None` when the pair never met.
    pub fn win_rate(&self) -> Option<f64> {
        match self.encounters() {
            0 => None,
            n => Some(f64::from(self.wins) / f64::from(n)),
        }
    }
}

/// Counts and pairwise ledger for one item.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemStats {
    /// Trials the item appeared in.
    pub presentations: u32,
    /// Trials in which it was chosen best.
    pub best: u32,
    /// Trials in which it was chosen worst.
    pub worst: u32,
    /// Record against each opponent, keyed by the opponent's index in [`Aggregate`].
    pub ledger: IndexMap<usize, PairRecord>,
}

impl ItemStats {
    /// Presentations in which the item was neither best nor worst.
    pub fn unchosen(&self) -> u32 {
        self.presentations - self.best - self.worst
    }

    /// Total pairwise wins.
    pub fn wins(&self) -> u32 {
        self.ledger.values().map(|record| record.wins).sum()
    }

    /// Total pairwise losses.
    pub fn losses(&self) -> u32 {
        self.ledger.values().map(|record| record.losses).sum()
    }

    /// Total pairwise encounters.
    pub fn encounters(&self) -> u32 {
        self.ledger.values().map(PairRecord::encounters).sum()
    }
}

/// A single implied pairwise outcome, by item index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    /// Index of the preferred item.
    pub winner: usize,
    /// Index of the other item.
    pub loser: usize,
}

/// A response trial re-expressed with item indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedTrial {
    /// Option indices in display order.
    pub options: Vec<usize>,
    /// Index of the best pick.
    pub best: usize,
    /// Index of the worst pick.
    pub worst: usize,
}

/// Statistics for every item observed in a batch of trials.
///
/// Items are indexed in first-seen order. Built fresh for each scoring run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Aggregate {
    items: IndexMap<Item, ItemStats>,
    trials: Vec<IndexedTrial>,
    games: Vec<Game>,
}

impl Aggregate {
    /// Scans the trials once, filling counts, the pairwise ledger and the game log.
    ///
    /// Within a trial the best item beats every other option and every
    /// option other than the best beats the worst item. Two options that were
    /// neither best nor worst are not compared.
    pub fn build(trials: &[ResponseTrial]) -> Result<Self, BwsError> {
        if trials.is_empty() {
            return Err(BwsError::NoValidTrials(
                ErrorInfo::new("no-trials", "no usable trials to score")
                    .with_hint("check the best/worst column names and option columns"),
            ));
        }
        let mut aggregate = Aggregate::default();
        for trial in trials {
            let options: Vec<usize> = trial
                .options()
                .iter()
                .map(|item| aggregate.intern(item))
                .collect();
            let best = aggregate.intern(trial.best());
            let worst = aggregate.intern(trial.worst());
            for &idx in &options {
                aggregate.items[idx].presentations += 1;
            }
            aggregate.items[best].best += 1;
            aggregate.items[worst].worst += 1;

            for &other in options.iter().filter(|&&o| o != best) {
                aggregate.record(best, other);
            }
            for &other in options.iter().filter(|&&o| o != best && o != worst) {
                aggregate.record(other, worst);
            }
            aggregate.trials.push(IndexedTrial {
                options,
                best,
                worst,
            });
        }
        tracing::debug!(
            items = aggregate.items.len(),
            trials = aggregate.trials.len(),
            games = aggregate.games.len(),
            "responses aggregated"
        );
        Ok(aggregate)
    }

    fn intern(&mut self, item: &Item) -> usize {
        match self.items.get_index_of(item) {
            Some(idx) => idx,
            None => self.items.insert_full(item.clone(), ItemStats::default()).0,
        }
    }

    fn record(&mut self, winner: usize, loser: usize) {
        self.items[winner].ledger.entry(loser).or_default().wins += 1;
        self.items[loser].ledger.entry(winner).or_default().losses += 1;
        self.games.push(Game { winner, loser });
    }

    /// Number of distinct items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when no items were observed.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item at `idx`.
    pub fn item(&self, idx: usize) -> Option<&Item> {
        self.items.get_index(idx).map(|(item, _)| item)
    }

    /// Statistics for `item`.
    pub fn stats(&self, item: &str) -> Option<&ItemStats> {
        self.items.get(item)
    }

    /// Items and statistics in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&Item, &ItemStats)> + '_ {
        self.items.iter()
    }

    /// Statistics in first-seen order.
    pub fn all_stats(&self) -> impl Iterator<Item = &ItemStats> + '_ {
        self.items.values()
    }

    /// Trials in input order.
    pub fn trials(&self) -> &[IndexedTrial] {
        &self.trials
    }

    /// Implied pairwise outcomes in replay order.
    pub fn games(&self) -> &[Game] {
        &self.games
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trial(options: &[&str], best: &str, worst: &str) -> ResponseTrial {
        ResponseTrial::new(
            options.iter().map(|label| Item::from(*label)).collect(),
            best.into(),
            worst.into(),
        )
        .expect("valid trial")
    }

    #[test]
    fn unchosen_options_are_not_compared() {
        let aggregate = Aggregate::build(&[trial(&["a", "b", "c", "d"], "a", "d")]).expect("aggregate");
        let b = aggregate.stats("b").expect("b");
        let c_idx = 2;
        assert!(b.ledger.get(&c_idx).is_none());
        assert_eq!(b.wins(), 1);
        assert_eq!(b.losses(), 1);
        assert_eq!(b.unchosen(), 1);
        // 3 wins for the best item plus 2 further losses for the worst.
        assert_eq!(aggregate.games().len(), 5);
    }

    #[test]
    fn best_beats_worst_once() {
        let aggregate = Aggregate::build(&[trial(&["x", "y"], "x", "y")]).expect("aggregate");
        let x = aggregate.stats("x").expect("x");
        assert_eq!(x.ledger.get(&1), Some(&PairRecord { wins: 1, losses: 0 }));
        assert_eq!(aggregate.games(), &[Game { winner: 0, loser: 1 }]);
    }

    #[test]
    fn empty_batches_fail() {
        let err = Aggregate::build(&[]).unwrap_err();
        assert!(matches!(err, BwsError::NoValidTrials(_)));
    }
}
