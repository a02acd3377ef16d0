use bws_core::RngHandle;
use rand::seq::SliceRandom;

use crate::generator::{Draft, Relaxation, Shape, TrialGenerator};
use crate::ledger::PairLedger;
use crate::params::Strategy;
use crate::select::Selection;

/// Random trials that avoid pairs seen in earlier trials.
///
/// Each trial gets `retry_budget` shuffled first-fit attempts. When none
/// yields a fully novel group the trial is built greedily to minimise
/// repeated pairs and recorded as relaxed.
#[derive(Debug, Clone, Copy)]
pub struct NorepeatGenerator {
    /// Shuffled attempts per trial before relaxing.
    pub retry_budget: usize,
}

impl TrialGenerator for NorepeatGenerator {
    fn strategy(&self) -> Strategy {
        Strategy::Norepeat
    }

    fn draw(&self, shape: Shape, rng: &mut RngHandle) -> Draft {
        let mut ledger = PairLedger::new();
        let mut order: Vec<usize> = (0..shape.pool_size).collect();
        let mut draft = Draft::default();
        for row_idx in 0..shape.trials {
            let mut row = None;
            for _ in 0..self.retry_budget.max(1) {
                order.shuffle(rng);
                row = Selection {
                    ledger: &ledger,
                    fixed: &[],
                    candidates: &order,
                    need: shape.k,
                }
                .first_fit();
                if row.is_some() {
                    break;
                }
            }
            let row = match row {
                Some(row) => row,
                None => {
                    order.shuffle(rng);
                    let row = Selection {
                        ledger: &ledger,
                        fixed: &[],
                        candidates: &order,
                        need: shape.k,
                    }
                    .least_repeating();
                    draft.relaxations.push(Relaxation {
                        row: row_idx,
                        repeated_pairs: ledger.repeats_in(&row),
                    });
                    row
                }
            };
            ledger.record(&row);
            draft.rows.push(row);
        }
        draft
    }
}
