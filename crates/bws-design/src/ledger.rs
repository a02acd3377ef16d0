use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Co-occurrence counts for unordered pairs of pool indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairLedger {
    counts: HashMap<(usize, usize), u32>,
}

fn key(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

impl PairLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of trials in which `a` and `b` appeared together.
    pub fn count(&self, a: usize, b: usize) -> u32 {
        self.counts.get(&key(a, b)).copied().unwrap_or(0)
    }

    /// Whether `a` and `b` have already appeared together.
    pub fn seen(&self, a: usize, b: usize) -> bool {
        self.count(a, b) > 0
    }

    /// Records every pair in `row`.
    pub fn record(&mut self, row: &[usize]) {
        for (idx, &a) in row.iter().enumerate() {
            for &b in &row[idx + 1..] {
                *self.counts.entry(key(a, b)).or_insert(0) += 1;
            }
        }
    }

    /// Undoes one [`PairLedger::record`] of `row`.
    pub fn forget(&mut self, row: &[usize]) {
        for (idx, &a) in row.iter().enumerate() {
            for &b in &row[idx + 1..] {
                if let Entry::Occupied(mut entry) = self.counts.entry(key(a, b)) {
                    *entry.get_mut() -= 1;
                    if *entry.get() == 0 {
                        entry.remove();
                    }
                }
            }
        }
    }

    /// Number of pairs in `row` that have appeared before.
    pub fn repeats_in(&self, row: &[usize]) -> usize {
        let mut repeats = 0;
        for (idx, &a) in row.iter().enumerate() {
            repeats += row[idx + 1..].iter().filter(|&&b| self.seen(a, b)).count();
        }
        repeats
    }

    /// Number of members of `others` that `candidate` has already met.
    pub fn conflicts(&self, candidate: usize, others: &[usize]) -> usize {
        others.iter().filter(|&&o| self.seen(candidate, o)).count()
    }

    /// Total past co-occurrences between `candidate` and `others`.
    pub fn pressure(&self, candidate: usize, others: &[usize]) -> u32 {
        others.iter().map(|&o| self.count(candidate, o)).sum()
    }

    /// Number of distinct pairs seen so far.
    pub fn distinct_pairs(&self) -> usize {
        self.counts.len()
    }

    /// Co-occurrences beyond the first, summed over all pairs.
    pub fn surplus(&self) -> usize {
        self.counts.values().map(|&count| count as usize - 1).sum()
    }
}
