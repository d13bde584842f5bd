//! Action descriptors.
//!
//! An `Action` is a plain, serializable value naming what the active player
//! wants to do. It carries no reference to state; legality is decided by the
//! rules against a concrete `GameState`.
//!
//! - Work phase: `PlaceWorker` once per turn, then any of the free actions
//!   (`PlayCard`, `HireCrew`, `BuyArmour`, `TakeResources`, `ClaimOffering`),
//!   each at most once, then `PickupWorker` to end the turn.
//! - Raid phase: `Raid` or `EndPhase`.

use serde::{Deserialize, Serialize};

use super::player::PlayerId;
use super::worker::WorkerColor;
use crate::catalog::{BuildingId, CardId, ExchangeId, LocationId, OfferingId, SubLocationId};

/// A complete game action.
///
/// ## Example
///
/// ```
/// use raiders_engine::core::{Action, ActionKind, WorkerColor};
///
/// let place = Action::PlaceWorker { building: "silversmith".into(), color: WorkerColor::Black };
/// assert_eq!(place.kind(), ActionKind::PlaceWorker);
///
/// let json = serde_json::to_string(&Action::EndPhase).unwrap();
/// assert_eq!(json, r#"{"type":"end_phase"}"#);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Put the held token on a building and run its place effect.
    PlaceWorker { building: BuildingId, color: WorkerColor },

    /// Take the oldest token from a building and run its pickup effect.
    /// Ends the turn.
    PickupWorker { building: BuildingId },

    /// Play a card with an immediate effect from hand to the discard pile.
    PlayCard { card: CardId },

    /// Hire a card from hand into the crew.
    HireCrew { card: CardId },

    /// Buy `levels` armour levels.
    BuyArmour { levels: u32 },

    /// Run one of the catalog's resource exchanges.
    TakeResources { exchange: ExchangeId },

    /// Send the held token of `color` to raid a sub-location with the
    /// whole crew. Ends the turn.
    Raid {
        location: LocationId,
        sub_location: SubLocationId,
        color: WorkerColor,
    },

    /// Pay for a face-up offering tile.
    ClaimOffering { offering: OfferingId },

    /// Finish the current phase for this player.
    EndPhase,
}

impl Action {
    /// The variant tag.
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::PlaceWorker { .. } => ActionKind::PlaceWorker,
            Action::PickupWorker { .. } => ActionKind::PickupWorker,
            Action::PlayCard { .. } => ActionKind::PlayCard,
            Action::HireCrew { .. } => ActionKind::HireCrew,
            Action::BuyArmour { .. } => ActionKind::BuyArmour,
            Action::TakeResources { .. } => ActionKind::TakeResources,
            Action::Raid { .. } => ActionKind::Raid,
            Action::ClaimOffering { .. } => ActionKind::ClaimOffering,
            Action::EndPhase => ActionKind::EndPhase,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::PlaceWorker { building, color } => write!(f, "place {color} worker at {building}"),
            Action::PickupWorker { building } => write!(f, "pick up worker from {building}"),
            Action::PlayCard { card } => write!(f, "play {card}"),
            Action::HireCrew { card } => write!(f, "hire {card}"),
            Action::BuyArmour { levels } => write!(f, "buy {levels} armour"),
            Action::TakeResources { exchange } => write!(f, "exchange {exchange}"),
            Action::Raid {
                location,
                sub_location,
                color,
            } => write!(f, "raid {location}/{sub_location} with {color} worker"),
            Action::ClaimOffering { offering } => write!(f, "claim offering {offering}"),
            Action::EndPhase => f.write_str("end phase"),
        }
    }
}

/// Action variant tag, used for per-turn bookkeeping and error reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    PlaceWorker,
    PickupWorker,
    PlayCard,
    HireCrew,
    BuyArmour,
    TakeResources,
    Raid,
    ClaimOffering,
    EndPhase,
}

impl ActionKind {
    /// Free work-phase actions: allowed once per turn, only after placing.
    #[must_use]
    pub const fn is_free_action(self) -> bool {
        matches!(
            self,
            ActionKind::PlayCard
                | ActionKind::HireCrew
                | ActionKind::BuyArmour
                | ActionKind::TakeResources
                | ActionKind::ClaimOffering
        )
    }
}

/// A recorded action with metadata for history tracking.
///
/// Used for:
/// - Session replay
/// - Debugging and training data export
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// The player who took this action.
    pub player: PlayerId,

    /// The action taken.
    pub action: Action,

    /// Round in which the action was taken.
    pub round: u32,

    /// Position in the whole game's action sequence.
    pub sequence: u32,
}

impl ActionRecord {
    /// Create a new action record.
    #[must_use]
    pub fn new(player: PlayerId, action: Action, round: u32, sequence: u32) -> Self {
        Self {
            player,
            action,
            round,
            sequence,
        }
    }
}
