//! The driver-facing rules interface.
//!
//! `RulesEngine` bundles the five driver operations behind one trait so a
//! UI, a scripted agent or a learning-environment wrapper can hold a single
//! object. `Rules` implements it over a borrowed `Catalog`; the free
//! functions in `crate::rules` do the work.

use crate::catalog::Catalog;
use crate::core::{Action, EngineError, GameState, IllegalActionError, NotTerminalError, RandomSource, SetupError};
use crate::events::GameEvent;

use super::scoring::ScoreSheet;

/// Result of a successful `apply`: the next state and what happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub state: GameState,
    /// Events in the order they happened.
    pub events: Vec<GameEvent>,
}

/// Rules engine trait.
///
/// ## Implementation Notes
///
/// - `legal_actions` is the set of actions `check` accepts, in a fixed
///   order; drivers may rely on the two agreeing
/// - `apply` never mutates its input; on error the caller still holds the
///   untouched state
/// - Randomness comes only from the `rng` argument
pub trait RulesEngine {
    /// The static data this engine plays with.
    fn catalog(&self) -> &Catalog;

    /// Set up a fresh game.
    fn new_game(&self, player_count: usize, seed: u64) -> Result<GameState, SetupError>;

    /// Every legal action for the active player, in catalog order.
    fn legal_actions(&self, state: &GameState) -> Vec<Action>;

    /// Check `action` against the current state.
    fn check(&self, state: &GameState, action: &Action) -> Result<(), IllegalActionError>;

    /// Apply an action, returning the next state and its events.
    fn apply(&self, state: &GameState, action: &Action, rng: &mut dyn RandomSource) -> Result<Transition, EngineError>;

    /// Final scores. Only defined once the game is over.
    fn score(&self, state: &GameState) -> Result<ScoreSheet, NotTerminalError>;

    // === Convenience Methods ===

    fn is_legal(&self, state: &GameState, action: &Action) -> bool {
        self.check(state, action).is_ok()
    }
}

/// `RulesEngine` over a borrowed catalog.
///
/// ## Example
///
/// ```
/// use raiders_engine::catalog::Catalog;
/// use raiders_engine::core::{Action, GameRng};
/// use raiders_engine::rules::{Rules, RulesEngine};
///
/// let catalog = Catalog::standard().unwrap();
/// let rules = Rules::new(&catalog);
/// let state = rules.new_game(2, 7).unwrap();
///
/// let action = rules.legal_actions(&state)[0].clone();
/// assert!(rules.is_legal(&state, &action));
///
/// let mut rng = GameRng::new(7);
/// let next = rules.apply(&state, &action, &mut rng).unwrap();
/// assert_ne!(next.state, state);
/// assert!(!rules.is_legal(&state, &Action::HireCrew { card: "no_such_card".into() }));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Rules<'c> {
    catalog: &'c Catalog,
}

impl<'c> Rules<'c> {
    #[must_use]
    pub fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }
}

impl RulesEngine for Rules<'_> {
    fn catalog(&self) -> &Catalog {
        self.catalog
    }

    fn new_game(&self, player_count: usize, seed: u64) -> Result<GameState, SetupError> {
        super::new_game(self.catalog, player_count, seed)
    }

    fn legal_actions(&self, state: &GameState) -> Vec<Action> {
        super::legal_actions(self.catalog, state)
    }

    fn check(&self, state: &GameState, action: &Action) -> Result<(), IllegalActionError> {
        super::check(self.catalog, state, action)
    }

    fn apply(&self, state: &GameState, action: &Action, rng: &mut dyn RandomSource) -> Result<Transition, EngineError> {
        super::apply(self.catalog, state, action, rng)
    }

    fn score(&self, state: &GameState) -> Result<ScoreSheet, NotTerminalError> {
        super::score(self.catalog, state)
    }
}
