//! Core engine types: players, workers, resources, RNG, configuration,
//! actions, state and errors.
//!
//! Everything here is plain data. The rules that act on it live in
//! `crate::rules`.

pub mod player;
pub mod worker;
pub mod resources;
pub mod rng;
pub mod config;
pub mod action;
pub mod state;
pub mod error;

pub use player::{PlayerId, PlayerMap};
pub use worker::{WorkerColor, WorkerId, WorkerToken};
pub use resources::{Resource, ResourceBag, ResourceOverflow, Shortfall};
pub use rng::{shuffle, DieFaces, GameRng, GameRngState, RandomSource, ScriptedRng};
pub use config::{Conversion, EndConditions, PlunderDepletion, RulesConfig};
pub use action::{Action, ActionKind, ActionRecord};
pub use state::{BoardState, GameState, Phase, PlayerState, SubLocationState, TurnTracker};
pub use error::{
    CatalogError, EngineError, ErrorSeverity, Fault, IllegalActionError, InvariantViolationError,
    NotTerminalError, SetupError, SnapshotError, Violation,
};
