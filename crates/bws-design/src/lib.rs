//! Balanced best-worst trial design generation.
//!
//! A design is `N` trials of `K` distinct items drawn from an [`ItemPool`].
//! Four strategies share the [`TrialGenerator`] contract:
//!
//! - [`Strategy::Random`]: independent uniform samples.
//! - [`Strategy::Even`]: presentation counts within one across items.
//! - [`Strategy::Norepeat`]: random trials avoiding repeated pairs.
//! - [`Strategy::NorepeatEven`]: both balance and pair novelty (the default).
//!
//! ```
//! use bws_core::{ItemPool, RngHandle};
//! use bws_design::{generate, DesignParams, Strategy};
//!
//! let pool = ItemPool::new(["A", "B", "C", "D"]);
//! let params = DesignParams::new(8, 2, Strategy::Even);
//! let design = generate(&pool, &params, &mut RngHandle::from_seed(1)).unwrap();
//! assert!(design.presentations().values().all(|&count| count == 4));
//! ```
//!
//! [`ItemPool`]: bws_core::ItemPool

mod design;
mod even;
mod generator;
mod io;
mod ledger;
mod norepeat;
mod norepeat_even;
mod params;
mod random;
mod select;

pub use design::{generate, Design};
pub use even::EvenGenerator;
pub use generator::{Draft, Relaxation, Shape, TrialGenerator};
pub use io::{design_to_csv_string, load_item_pool, write_design_csv};
pub use ledger::PairLedger;
pub use norepeat::NorepeatGenerator;
pub use norepeat_even::NorepeatEvenGenerator;
pub use params::{balance_advice, BalanceAdvice, DesignConfig, DesignParams, Strategy, UnknownStrategy};
pub use random::RandomGenerator;
