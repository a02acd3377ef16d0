use std::collections::VecDeque;

use bws_core::RngHandle;
use rand::seq::SliceRandom;

use crate::generator::{Draft, Shape, TrialGenerator};
use crate::params::Strategy;

/// Shuffled passes over the pool.
///
/// A new pass is appended only once the previous one is fully dealt, so at
/// any point every item has been dealt either `p` or `p + 1` times.
#[derive(Debug, Clone)]
pub(crate) struct Deck {
    pool_size: usize,
    queue: VecDeque<usize>,
    passes: usize,
}

impl Deck {
    pub fn new(pool_size: usize) -> Self {
        Self {
            pool_size,
            queue: VecDeque::with_capacity(pool_size),
            passes: 0,
        }
    }

    /// Shuffles a fresh pass over the whole pool.
    pub fn next_pass(&mut self, rng: &mut RngHandle) -> Vec<usize> {
        let mut pass: Vec<usize> = (0..self.pool_size).collect();
        pass.shuffle(rng);
        self.passes += 1;
        pass
    }

    fn refill(&mut self, rng: &mut RngHandle) {
        let pass = self.next_pass(rng);
        self.queue.extend(pass);
    }

    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Deals `k` items front first, skipping items already in the row.
    pub fn deal_front(&mut self, k: usize, rng: &mut RngHandle) -> Vec<usize> {
        let mut row = Vec::with_capacity(k);
        while row.len() < k {
            if self.queue.is_empty() {
                self.refill(rng);
            }
            match self.queue.iter().position(|item| !row.contains(item)) {
                Some(pos) => {
                    if let Some(item) = self.queue.remove(pos) {
                        row.push(item);
                    }
                }
                None => self.refill(rng),
            }
        }
        row
    }
}

/// Presentation-balanced design built from consecutive shuffled passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvenGenerator;

impl TrialGenerator for EvenGenerator {
    fn strategy(&self) -> Strategy {
        Strategy::Even
    }

    fn draw(&self, shape: Shape, rng: &mut RngHandle) -> Draft {
        let mut deck = Deck::new(shape.pool_size);
        let rows = (0..shape.trials)
            .map(|_| deck.deal_front(shape.k, rng))
            .collect();
        tracing::debug!(passes = deck.passes(), "even design dealt");
        Draft {
            rows,
            relaxations: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deck_straddles_passes_without_duplicates() {
        let mut rng = RngHandle::from_seed(9);
        let mut deck = Deck::new(5);
        let mut counts = [0usize; 5];
        for _ in 0..7 {
            let row = deck.deal_front(3, &mut rng);
            let mut sorted = row.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), 3);
            for item in row {
                counts[item] += 1;
            }
        }
        // 21 presentations over 5 items: four items dealt 4 times, one 5 times.
        assert_eq!(counts.iter().sum::<usize>(), 21);
        assert!(counts.iter().all(|&c| c == 4 || c == 5));
        assert_eq!(deck.passes(), 5);
    }
}
