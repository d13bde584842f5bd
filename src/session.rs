//! Convenience driver.
//!
//! `Session` owns one game: its state, the RNG that resolves raids and
//! reshuffles, the history of accepted actions and the events they caused.
//! Every game is reproducible from `(catalog, player_count, seed, history)`.

use tracing::debug;

use crate::catalog::Catalog;
use crate::core::{Action, ActionRecord, EngineError, GameRng, GameState, NotTerminalError, SetupError, SnapshotError};
use crate::events::{EventLog, GameEvent};
use crate::rules::{self, ScoreSheet};
use crate::snapshot::Snapshot;

/// A game in progress.
///
/// ## Example
///
/// ```
/// use raiders_engine::catalog::Catalog;
/// use raiders_engine::session::Session;
///
/// let catalog = Catalog::standard().unwrap();
/// let mut session = Session::new(&catalog, 2, 42).unwrap();
///
/// let action = session.legal_actions()[0].clone();
/// let events = session.step(action).unwrap().len();
/// assert!(events > 0);
/// assert_eq!(session.history().len(), 1);
///
/// let again = Session::replay(&catalog, 2, 42, session.actions()).unwrap();
/// assert_eq!(again.state(), session.state());
/// ```
#[derive(Clone, Debug)]
pub struct Session<'c> {
    catalog: &'c Catalog,
    state: GameState,
    rng: GameRng,
    history: Vec<ActionRecord>,
    log: EventLog,
}

impl<'c> Session<'c> {
    /// Start a new game.
    pub fn new(catalog: &'c Catalog, player_count: usize, seed: u64) -> Result<Self, SetupError> {
        let state = rules::new_game(catalog, player_count, seed)?;
        Ok(Self {
            catalog,
            state,
            rng: GameRng::new(seed).for_context("play"),
            history: Vec::new(),
            log: EventLog::new(),
        })
    }

    /// Resume from a snapshot. History and event log start empty.
    ///
    /// The state must pass the invariant checks against `catalog`.
    pub fn from_snapshot(catalog: &'c Catalog, snapshot: Snapshot) -> Result<Self, SnapshotError> {
        rules::check_standalone(catalog, &snapshot.state)?;
        Ok(Self {
            catalog,
            state: snapshot.state,
            rng: GameRng::from_state(&snapshot.rng),
            history: Vec::new(),
            log: EventLog::new(),
        })
    }

    /// Replay a recorded game from the start.
    pub fn replay(
        catalog: &'c Catalog,
        player_count: usize,
        seed: u64,
        actions: impl IntoIterator<Item = Action>,
    ) -> Result<Self, EngineError> {
        let mut session = Self::new(catalog, player_count, seed)?;
        for action in actions {
            session.step(action)?;
        }
        Ok(session)
    }

    /// Apply an action for the active player.
    ///
    /// On error nothing changes, the RNG included, so a rejected action
    /// never shifts later rolls.
    pub fn step(&mut self, action: Action) -> Result<&[GameEvent], EngineError> {
        let mut rng = self.rng.clone();
        let transition = rules::apply(self.catalog, &self.state, &action, &mut rng)?;

        let record = ActionRecord::new(self.state.active, action, self.state.round, self.history.len() as u32);
        debug!(sequence = record.sequence, events = transition.events.len(), "action recorded");

        let start = self.log.len();
        self.history.push(record);
        self.log.extend(transition.events);
        self.state = transition.state;
        self.rng = rng;
        Ok(&self.log.as_slice()[start..])
    }

    #[must_use]
    pub fn legal_actions(&self) -> Vec<Action> {
        rules::legal_actions(self.catalog, &self.state)
    }

    #[must_use]
    pub fn is_legal(&self, action: &Action) -> bool {
        rules::is_legal(self.catalog, &self.state, action)
    }

    pub fn score(&self) -> Result<ScoreSheet, NotTerminalError> {
        rules::score(self.catalog, &self.state)
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.state.is_terminal()
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.state.clone(), self.rng.state())
    }

    #[must_use]
    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn history(&self) -> &[ActionRecord] {
        &self.history
    }

    /// The accepted actions in order, ready for `replay`.
    pub fn actions(&self) -> impl Iterator<Item = Action> + '_ {
        self.history.iter().map(|record| record.action.clone())
    }

    #[must_use]
    pub fn log(&self) -> &EventLog {
        &self.log
    }
}
