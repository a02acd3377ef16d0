use bws_core::RngHandle;
use rand::seq::index;

use crate::generator::{Draft, Shape, TrialGenerator};
use crate::params::Strategy;

/// Independent uniform samples without replacement.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomGenerator;

impl TrialGenerator for RandomGenerator {
    fn strategy(&self) -> Strategy {
        Strategy::Random
    }

    fn draw(&self, shape: Shape, rng: &mut RngHandle) -> Draft {
        let rows = (0..shape.trials)
            .map(|_| index::sample(rng, shape.pool_size, shape.k).into_vec())
            .collect();
        Draft {
            rows,
            relaxations: Vec::new(),
        }
    }
}
