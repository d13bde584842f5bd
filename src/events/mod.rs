//! Observability: the events every transition emits.
//!
//! - `GameEvent`: kind, player, subject id and numeric deltas
//! - `EventLog`: a whole game's events with per-player aggregation

mod event;
mod log;

pub use event::{Delta, EventKind, GameEvent, Stat};
pub use log::EventLog;
