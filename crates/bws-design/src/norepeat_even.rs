use bws_core::RngHandle;

use crate::even::Deck;
use crate::generator::{Draft, Relaxation, Shape, TrialGenerator};
use crate::ledger::PairLedger;
use crate::params::Strategy;
use crate::select::Selection;

/// Presentation-balanced trials that also avoid repeated pairs.
///
/// Balance is never relaxed. Trials are cut from consecutive shuffled passes
/// over the pool, as [`crate::EvenGenerator`] does, so presentation counts stay
/// within one of each other at every row. Items a pass cannot fill a whole
/// trial with are carried into the first trial of the next pass.
///
/// Each pass is split by a backtracking search over the whole pass: every
/// trial must be pairwise novel, and so must the items carried over. When the
/// search runs out of nodes the pass is dealt greedily trial by trial, taking
/// the fewest repeated pairs, and those rows are recorded as [`Relaxation`]s.
/// A relaxed design is redrawn up to `restarts` times while the trial count
/// is within [`Shape::novel_trial_capacity`]; the draw with the fewest repeated
/// pairs is kept.
#[derive(Debug, Clone, Copy)]
pub struct NorepeatEvenGenerator {
    /// Search nodes spent per pass before falling back.
    pub search_budget: usize,
    /// Whole-design redraws attempted while novelty is still reachable.
    pub restarts: usize,
}

impl NorepeatEvenGenerator {
    fn attempt(&self, shape: Shape, rng: &mut RngHandle) -> Draft {
        let mut deck = Deck::new(shape.pool_size);
        let mut ledger = PairLedger::new();
        let mut draft = Draft::default();
        let mut carry = Vec::new();
        while draft.rows.len() < shape.trials {
            let pass = deck.next_pass(rng);
            let outstanding = shape.trials - draft.rows.len();
            let rows = ((carry.len() + pass.len()) / shape.k).min(outstanding);
            let split = PassSplit::new(
                &mut ledger,
                shape.k,
                &pass,
                &carry,
                rows,
                rows < outstanding,
                self.search_budget,
            )
            .run();
            let (dealt, spare) = match split {
                Some(split) => split,
                None => self.deal_greedily(
                    &mut ledger,
                    Pass {
                        k: shape.k,
                        items: &pass,
                        carry: &carry,
                        rows,
                    },
                    &mut draft,
                ),
            };
            draft.rows.extend(dealt);
            carry = spare;
        }
        tracing::trace!(
            passes = deck.passes(),
            relaxed = draft.relaxations.len(),
            "norepeateven attempt dealt"
        );
        draft
    }

    /// Trial-by-trial fallback: a novel pick when one exists, else the least repeating.
    fn deal_greedily(
        &self,
        ledger: &mut PairLedger,
        pass: Pass<'_>,
        draft: &mut Draft,
    ) -> (Vec<Vec<usize>>, Vec<usize>) {
        let mut free = pass.items.to_vec();
        let mut dealt = Vec::with_capacity(pass.rows);
        let mut row = pass.carry.to_vec();
        while dealt.len() < pass.rows {
            let candidates: Vec<usize> = free
                .iter()
                .copied()
                .filter(|item| !row.contains(item))
                .collect();
            let selection = Selection {
                ledger: &*ledger,
                fixed: &row,
                candidates: &candidates,
                need: pass.k - row.len(),
            };
            let chosen = selection
                .search(self.search_budget)
                .unwrap_or_else(|| selection.least_repeating());
            free.retain(|item| !chosen.contains(item));
            row.extend(chosen);
            let repeated_pairs = ledger.repeats_in(&row);
            if repeated_pairs > 0 {
                draft.relaxations.push(Relaxation {
                    row: draft.rows.len() + dealt.len(),
                    repeated_pairs,
                });
            }
            ledger.record(&row);
            dealt.push(std::mem::take(&mut row));
        }
        (dealt, free)
    }
}

fn total_repeats(draft: &Draft) -> usize {
    draft
        .relaxations
        .iter()
        .map(|relaxation| relaxation.repeated_pairs)
        .sum()
}

impl TrialGenerator for NorepeatEvenGenerator {
    fn strategy(&self) -> Strategy {
        Strategy::NorepeatEven
    }

    fn draw(&self, shape: Shape, rng: &mut RngHandle) -> Draft {
        let attempts = if shape.trials <= shape.novel_trial_capacity() {
            self.restarts + 1
        } else {
            1
        };
        let mut best: Option<Draft> = None;
        for attempt in 0..attempts {
            let draft = self.attempt(shape, rng);
            if draft.relaxations.is_empty() {
                tracing::debug!(attempt, "norepeateven design dealt");
                return draft;
            }
            if best
                .as_ref()
                .map_or(true, |kept| total_repeats(&draft) < total_repeats(kept))
            {
                best = Some(draft);
            }
        }
        let draft = best.unwrap_or_default();
        tracing::debug!(
            attempts,
            relaxed = draft.relaxations.len(),
            "norepeateven design dealt with relaxed novelty"
        );
        draft
    }
}

/// One pass worth of dealing.
#[derive(Clone, Copy)]
struct Pass<'a> {
    k: usize,
    /// Shuffled pass, in deal order.
    items: &'a [usize],
    /// Items opening the first trial, left over from the previous pass.
    carry: &'a [usize],
    /// Trials to complete from this pass.
    rows: usize,
}

/// Backtracking split of a pass into pairwise-novel trials.
///
/// Rows are recorded in the ledger as they close and forgotten on backtrack,
/// so a failed search leaves the ledger untouched. Fresh rows open on the
/// earliest free item; items skipped over become spares, which is where the
/// carry for the next pass comes from.
struct PassSplit<'a> {
    ledger: &'a mut PairLedger,
    k: usize,
    order: &'a [usize],
    taken: Vec<bool>,
    rows_wanted: usize,
    rows: Vec<Vec<usize>>,
    open: Vec<usize>,
    spared: Vec<usize>,
    spares_left: usize,
    /// Spares carry into the next pass and must not share a seen pair.
    novel_spares: bool,
    visited: usize,
    budget: usize,
}

impl<'a> PassSplit<'a> {
    fn new(
        ledger: &'a mut PairLedger,
        k: usize,
        order: &'a [usize],
        carry: &[usize],
        rows_wanted: usize,
        novel_spares: bool,
        budget: usize,
    ) -> Self {
        Self {
            ledger,
            k,
            order,
            taken: vec![false; order.len()],
            rows_wanted,
            rows: Vec::with_capacity(rows_wanted),
            open: carry.to_vec(),
            spared: Vec::new(),
            spares_left: (carry.len() + order.len()).saturating_sub(rows_wanted * k),
            novel_spares,
            visited: 0,
            budget,
        }
    }

    /// Returns the dealt rows and the unplaced pass items, in pass order.
    fn run(mut self) -> Option<(Vec<Vec<usize>>, Vec<usize>)> {
        let found = if self.open.is_empty() {
            self.open_row()
        } else {
            self.fill(0)
        };
        if !found {
            return None;
        }
        let spare = self
            .order
            .iter()
            .enumerate()
            .filter(|&(idx, item)| !self.taken[idx] || self.spared.contains(item))
            .map(|(_, &item)| item)
            .collect();
        Some((self.rows, spare))
    }

    fn tick(&mut self) -> bool {
        self.visited += 1;
        self.visited <= self.budget
    }

    /// Extends the open row with free items at or after `start`.
    fn fill(&mut self, start: usize) -> bool {
        if self.open.len() == self.k {
            let row = std::mem::take(&mut self.open);
            self.ledger.record(&row);
            self.rows.push(row);
            if self.open_row() {
                return true;
            }
            if let Some(row) = self.rows.pop() {
                self.ledger.forget(&row);
                self.open = row;
            }
            return false;
        }
        for idx in start..self.order.len() {
            let item = self.order[idx];
            if self.taken[idx] || self.open.contains(&item) {
                continue;
            }
            if !self.tick() {
                return false;
            }
            if self.ledger.conflicts(item, &self.open) > 0 {
                continue;
            }
            self.taken[idx] = true;
            self.open.push(item);
            if self.fill(idx + 1) {
                return true;
            }
            self.open.pop();
            self.taken[idx] = false;
        }
        false
    }

    /// Starts the next row, or checks the spares once every row is dealt.
    fn open_row(&mut self) -> bool {
        if self.rows.len() == self.rows_wanted {
            return !self.novel_spares || self.spares_are_novel();
        }
        let free: Vec<usize> = (0..self.order.len())
            .filter(|&idx| !self.taken[idx])
            .collect();
        let mut marked = 0;
        let mut found = false;
        for (skip, &idx) in free.iter().enumerate() {
            if skip > 0 {
                let passed = free[skip - 1];
                let item = self.order[passed];
                if self.spares_left == 0
                    || (self.novel_spares && self.ledger.conflicts(item, &self.spared) > 0)
                {
                    break;
                }
                self.spared.push(item);
                self.taken[passed] = true;
                self.spares_left -= 1;
                marked += 1;
            }
            if !self.tick() {
                break;
            }
            self.taken[idx] = true;
            self.open.push(self.order[idx]);
            if self.fill(idx + 1) {
                found = true;
                break;
            }
            self.open.clear();
            self.taken[idx] = false;
        }
        if !found {
            for &idx in &free[..marked] {
                self.taken[idx] = false;
            }
            self.spared.truncate(self.spared.len() - marked);
            self.spares_left += marked;
        }
        found
    }

    fn spares_are_novel(&self) -> bool {
        let rest: Vec<usize> = self
            .order
            .iter()
            .enumerate()
            .filter(|&(idx, _)| !self.taken[idx])
            .map(|(_, &item)| item)
            .chain(self.spared.iter().copied())
            .collect();
        rest.iter()
            .enumerate()
            .all(|(idx, &item)| self.ledger.conflicts(item, &rest[idx + 1..]) == 0)
    }
}
