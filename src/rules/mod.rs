//! The rule engine.
//!
//! Drivers use five operations, available as free functions over a
//! `&Catalog` or through the `RulesEngine` trait on `Rules`:
//! - `new_game`: deterministic setup from a seed
//! - `legal_actions` / `check` / `is_legal`: what the active player may do
//! - `apply`: pure transition returning the next state and its events
//! - `score`: final breakdown once the game is over
//!
//! The phase controller, raid resolution and invariant checks are internal
//! to `apply`.

pub mod engine;
mod invariants;
mod legality;
mod phase;
mod raid;
mod scoring;
mod setup;
mod transition;

pub use engine::{Rules, RulesEngine, Transition};
pub use legality::{check, is_legal, legal_actions};
pub use phase::EndReason;
pub use raid::{base_strength, raid_cost, RaidOutcome};
pub use scoring::{score, FinalScore, GameResult, ScoreSheet};
pub use setup::new_game;
pub use transition::apply;

pub(crate) use invariants::{check_seated, check_standalone};
