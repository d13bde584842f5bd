//! Game state.
//!
//! ## GameState
//!
//! One game in progress:
//! - Per-seat `PlayerState` (resources, hand, crew, armour, track, VP,
//!   the held worker and per-turn bookkeeping)
//! - `BoardState` (building occupancy, raid spots, card piles, offerings)
//! - Active player, first player, phase and round
//!
//! All collections are `im` persistent structures, so cloning a state is
//! O(1) and a transition can work on a clone while the caller keeps the
//! original untouched.

use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::action::ActionKind;
use super::player::{PlayerId, PlayerMap};
use super::resources::ResourceBag;
use super::worker::{WorkerColor, WorkerToken};
use crate::catalog::{BuildingId, CardId, LocationId, OfferingId, SubLocationId};

/// Phase of a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Players place and pick up workers in seating order.
    Work,
    /// Players send their held worker raiding.
    Raid,
    /// Bookkeeping between rounds. Never observed by a driver: the
    /// controller passes through it within a single transition.
    RoundEnd,
    /// Terminal.
    GameEnd,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Work => "work",
            Phase::Raid => "raid",
            Phase::RoundEnd => "round end",
            Phase::GameEnd => "game end",
        };
        f.write_str(name)
    }
}

/// What the active player has done during the current turn.
/// Cleared whenever the turn passes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnTracker {
    /// Building the player placed at this turn.
    pub placed_at: Option<BuildingId>,
    /// Colour of the token placed this turn; gates hiring.
    pub placed_color: Option<WorkerColor>,
    /// Free actions already taken this turn.
    pub used: BTreeSet<ActionKind>,
}

impl TurnTracker {
    #[must_use]
    pub fn has_placed(&self) -> bool {
        self.placed_at.is_some()
    }

    #[must_use]
    pub fn has_used(&self, kind: ActionKind) -> bool {
        self.used.contains(&kind)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Per-player state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: PlayerId,
    pub resources: ResourceBag,
    /// Cards in hand, in the order they were drawn.
    pub hand: Vector<CardId>,
    /// Hired crew in hire order. Never holds the same card twice.
    pub crew: Vector<CardId>,
    pub offerings: Vector<OfferingId>,
    pub armour: u32,
    /// Valkyrie track position.
    pub track: u32,
    /// Victory points accumulated so far.
    pub vp: u32,
    /// Token held in hand, if any.
    pub worker: Option<WorkerToken>,
    pub turn: TurnTracker,
    /// Finished the current phase.
    pub phase_done: bool,
    /// Work turns completed this round.
    pub work_turns: u32,
}

impl PlayerState {
    /// A player with nothing.
    #[must_use]
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            resources: ResourceBag::new(),
            hand: Vector::new(),
            crew: Vector::new(),
            offerings: Vector::new(),
            armour: 0,
            track: 0,
            vp: 0,
            worker: None,
            turn: TurnTracker::default(),
            phase_done: false,
            work_turns: 0,
        }
    }

    #[must_use]
    pub fn has_in_hand(&self, card: &CardId) -> bool {
        self.hand.contains(card)
    }

    #[must_use]
    pub fn has_in_crew(&self, card: &CardId) -> bool {
        self.crew.contains(card)
    }

    /// Remove one copy of `card` from the hand. Returns false if absent.
    pub fn remove_from_hand(&mut self, card: &CardId) -> bool {
        match self.hand.index_of(card) {
            Some(index) => {
                self.hand.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Occupancy and remaining plunder of one raid sub-location.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubLocationState {
    pub occupant: Option<WorkerToken>,
    pub plunder: ResourceBag,
}

/// Shared board.
///
/// Piles are stored bottom to top: draws and reveals take from the back.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    /// Tokens on each building, oldest first.
    pub buildings: OrdMap<BuildingId, Vector<WorkerToken>>,
    pub sub_locations: OrdMap<LocationId, OrdMap<SubLocationId, SubLocationState>>,
    pub draw_pile: Vector<CardId>,
    pub discard_pile: Vector<CardId>,
    /// Face-down offering tiles.
    pub offering_stack: Vector<OfferingId>,
    /// Face-up offering tiles that may be claimed.
    pub offering_row: Vector<OfferingId>,
}

impl BoardState {
    /// Tokens on a building, oldest first. Empty for unknown buildings.
    #[must_use]
    pub fn tokens_at(&self, building: &BuildingId) -> Vector<WorkerToken> {
        self.buildings.get(building).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn sub_location(&self, location: &LocationId, sub_location: &SubLocationId) -> Option<&SubLocationState> {
        self.sub_locations.get(location)?.get(sub_location)
    }

    pub fn sub_location_mut(
        &mut self,
        location: &LocationId,
        sub_location: &SubLocationId,
    ) -> Option<&mut SubLocationState> {
        self.sub_locations.get_mut(location)?.get_mut(sub_location)
    }

    /// Every sub-location with its ids, in id order.
    pub fn iter_sub_locations(&self) -> impl Iterator<Item = (&LocationId, &SubLocationId, &SubLocationState)> {
        self.sub_locations
            .iter()
            .flat_map(|(location, subs)| subs.iter().map(move |(sub, spot)| (location, sub, spot)))
    }

    /// Take the top card of the draw pile.
    pub fn draw(&mut self) -> Option<CardId> {
        self.draw_pile.pop_back()
    }
}

/// Complete game state.
///
/// ## Example
///
/// ```
/// use raiders_engine::catalog::Catalog;
/// use raiders_engine::core::Phase;
/// use raiders_engine::rules::new_game;
///
/// let catalog = Catalog::standard().unwrap();
/// let state = new_game(&catalog, 2, 42).unwrap();
///
/// assert_eq!(state.phase, Phase::Work);
/// assert_eq!(state.round, 1);
/// assert_eq!(state.player_count(), 2);
///
/// // O(1) clone; both copies compare equal until one is changed.
/// let copy = state.clone();
/// assert_eq!(copy, state);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Players in seating order.
    pub players: PlayerMap<PlayerState>,
    pub board: BoardState,
    /// Whose turn it is.
    pub active: PlayerId,
    /// Starts the next work phase; rotates every round.
    pub first_player: PlayerId,
    pub phase: Phase,
    /// Round counter, starting at 1. Never decreases.
    pub round: u32,
    /// Set together with `Phase::GameEnd`.
    pub terminal: bool,
}

impl GameState {
    /// An empty state with `player_count` empty seats, round 1, work phase.
    #[must_use]
    pub fn empty(player_count: usize) -> Self {
        Self {
            players: PlayerMap::new(player_count, PlayerState::new),
            board: BoardState::default(),
            active: PlayerId::new(0),
            first_player: PlayerId::new(0),
            phase: Phase::Work,
            round: 1,
            terminal: false,
        }
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.player_count()
    }

    /// The player whose turn it is.
    #[must_use]
    pub fn active_player(&self) -> &PlayerState {
        &self.players[self.active]
    }

    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.get(id)
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Every player has finished the current phase.
    #[must_use]
    pub fn all_done(&self) -> bool {
        self.players.values().all(|p| p.phase_done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WorkerId;

    #[test]
    fn test_empty_state() {
        let state = GameState::empty(3);

        assert_eq!(state.player_count(), 3);
        assert_eq!(state.active, PlayerId::new(0));
        assert_eq!(state.phase, Phase::Work);
        assert_eq!(state.round, 1);
        assert!(!state.is_terminal());
        assert!(!state.all_done());
        assert_eq!(state.players[PlayerId::new(2)].id, PlayerId::new(2));
    }

    #[test]
    fn test_clone_is_independent() {
        let state = GameState::empty(2);
        let mut next = state.clone();

        next.players[PlayerId::new(0)].vp = 5;
        next.board.draw_pile.push_back(CardId::new("archer"));

        assert_eq!(state.players[PlayerId::new(0)].vp, 0);
        assert!(state.board.draw_pile.is_empty());
        assert_ne!(state, next);
    }

    #[test]
    fn test_remove_from_hand_takes_one_copy() {
        let mut player = PlayerState::new(PlayerId::new(0));
        player.hand.push_back(CardId::new("archer"));
        player.hand.push_back(CardId::new("archer"));

        assert!(player.remove_from_hand(&CardId::new("archer")));
        assert_eq!(player.hand.len(), 1);
        assert!(!player.remove_from_hand(&CardId::new("priest")));
    }

    #[test]
    fn test_turn_tracker_reset() {
        let mut turn = TurnTracker {
            placed_at: Some(BuildingId::new("mill")),
            placed_color: Some(WorkerColor::Grey),
            used: BTreeSet::new(),
        };
        turn.used.insert(ActionKind::HireCrew);

        assert!(turn.has_placed());
        assert!(turn.has_used(ActionKind::HireCrew));

        turn.reset();
        assert!(!turn.has_placed());
        assert!(turn.used.is_empty());
    }

    #[test]
    fn test_board_lookup_and_draw() {
        let mut board = BoardState::default();
        let mut subs = OrdMap::new();
        subs.insert(SubLocationId::new("a"), SubLocationState::default());
        board.sub_locations.insert(LocationId::new("harbor_1"), subs);
        board.draw_pile.push_back(CardId::new("bottom"));
        board.draw_pile.push_back(CardId::new("top"));

        assert!(board
            .sub_location(&LocationId::new("harbor_1"), &SubLocationId::new("a"))
            .is_some());
        assert!(board
            .sub_location(&LocationId::new("harbor_1"), &SubLocationId::new("b"))
            .is_none());
        assert_eq!(board.iter_sub_locations().count(), 1);
        assert_eq!(board.draw(), Some(CardId::new("top")));
        assert!(board.tokens_at(&BuildingId::new("mill")).is_empty());
    }

    #[test]
    fn test_state_json_round_trip() {
        let mut state = GameState::empty(2);
        state.players[PlayerId::new(1)].worker = Some(WorkerToken::owned(
            WorkerId(1),
            WorkerColor::Black,
            PlayerId::new(1),
        ));
        state
            .board
            .buildings
            .insert(BuildingId::new("mill"), Vector::unit(WorkerToken::neutral(WorkerId(2), WorkerColor::Grey)));

        let json = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
