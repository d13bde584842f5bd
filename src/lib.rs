//! # raiders-engine
//!
//! A deterministic rule engine for a worker-placement and raiding board
//! game, built for scripted agents, UIs and reinforcement-learning wrappers.
//!
//! ## Design Principles
//!
//! 1. **Data-Driven**: cards, buildings, raid locations, offerings and every
//!    rule constant come from a `Catalog`. Rule variants are catalog edits.
//!
//! 2. **Pure Transitions**: `apply` borrows a state and returns a new one.
//!    The input is never touched, even on error.
//!
//! 3. **Injected Randomness**: dice and reshuffles draw from a
//!    `RandomSource` the caller passes in, so games replay bit for bit.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: O(1) state clones via `im`, so a
//!   transition can work on a copy and legality can simulate cheaply.
//!
//! - **Closed Effect Variants**: abilities are tagged enums evaluated by one
//!   resolver, never strings looked up at runtime.
//!
//! ## Modules
//!
//! - `core`: players, workers, resources, RNG, rules config, actions, state, errors
//! - `catalog`: static game data and the bundled standard catalog
//! - `effects`: effect variants, conditions and the resolver
//! - `events`: what each transition reports
//! - `rules`: setup, legality, transitions, raids, phases, scoring
//! - `session`: single-game driver with history and replay
//! - `snapshot`: bincode and JSON checkpoints

pub mod core;
pub mod catalog;
pub mod effects;
pub mod events;
pub mod rules;
pub mod session;
pub mod snapshot;

// Re-export commonly used types
pub use crate::core::{
    Action, ActionKind, ActionRecord, EngineError, GameRng, GameRngState, GameState, Phase, PlayerId, PlayerMap,
    RandomSource, Resource, ResourceBag, RulesConfig, ScriptedRng, WorkerColor,
};

pub use crate::catalog::{Catalog, CatalogSource};

pub use crate::effects::{CardEffect, Effect, EffectResolver};

pub use crate::events::{EventKind, EventLog, GameEvent, Stat};

pub use crate::rules::{
    apply, check, is_legal, legal_actions, new_game, score, FinalScore, GameResult, Rules, RulesEngine,
    ScoreSheet, Transition,
};

pub use crate::session::Session;
pub use crate::snapshot::{Snapshot, SNAPSHOT_VERSION};
