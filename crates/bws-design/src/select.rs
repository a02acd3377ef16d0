//! Subset selection under the pair-novelty constraint.

use crate::ledger::PairLedger;

/// Request to extend `fixed` with `need` members of `candidates`.
#[derive(Clone, Copy)]
pub(crate) struct Selection<'a> {
    pub ledger: &'a PairLedger,
    /// Items already committed to the trial.
    pub fixed: &'a [usize],
    /// Eligible items, in preference order.
    pub candidates: &'a [usize],
    pub need: usize,
}

impl Selection<'_> {
    /// Depth-first search for a fully novel pick, visiting at most `budget` nodes.
    pub fn search(&self, budget: usize) -> Option<Vec<usize>> {
        let mut chosen = Vec::with_capacity(self.need);
        let mut visited = 0usize;
        if self.descend(0, &mut chosen, &mut visited, budget) {
            Some(chosen)
        } else {
            None
        }
    }

    fn descend(
        &self,
        start: usize,
        chosen: &mut Vec<usize>,
        visited: &mut usize,
        budget: usize,
    ) -> bool {
        if chosen.len() == self.need {
            return true;
        }
        for idx in start..self.candidates.len() {
            if *visited >= budget || self.candidates.len() - idx < self.need - chosen.len() {
                return false;
            }
            *visited += 1;
            let candidate = self.candidates[idx];
            if self.ledger.conflicts(candidate, self.fixed) > 0
                || self.ledger.conflicts(candidate, chosen) > 0
            {
                continue;
            }
            chosen.push(candidate);
            if self.descend(idx + 1, chosen, visited, budget) {
                return true;
            }
            chosen.pop();
        }
        false
    }

    /// Single greedy pass that skips any candidate forming a repeated pair.
    pub fn first_fit(&self) -> Option<Vec<usize>> {
        let mut chosen = Vec::with_capacity(self.need);
        for &candidate in self.candidates {
            if chosen.len() == self.need {
                break;
            }
            if self.ledger.conflicts(candidate, self.fixed) == 0
                && self.ledger.conflicts(candidate, &chosen) == 0
            {
                chosen.push(candidate);
            }
        }
        (chosen.len() == self.need).then_some(chosen)
    }

    /// Greedy pick minimising repeated pairs, then past co-occurrences.
    ///
    /// Ties go to the earlier candidate. Always succeeds when there are at
    /// least `need` candidates.
    pub fn least_repeating(&self) -> Vec<usize> {
        let mut chosen: Vec<usize> = Vec::with_capacity(self.need);
        let mut placed: Vec<usize> = self.fixed.to_vec();
        while chosen.len() < self.need {
            let next = self
                .candidates
                .iter()
                .copied()
                .filter(|candidate| !chosen.contains(candidate))
                .min_by_key(|&candidate| {
                    (
                        self.ledger.conflicts(candidate, &placed),
                        self.ledger.pressure(candidate, &placed),
                    )
                });
            match next {
                Some(candidate) => {
                    chosen.push(candidate);
                    placed.push(candidate);
                }
                None => break,
            }
        }
        chosen
    }
}
