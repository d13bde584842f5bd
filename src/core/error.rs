//! Error taxonomy.
//!
//! - `CatalogError`: malformed or inconsistent static data. Fatal at load.
//! - `IllegalActionError`: a submitted action breaks a precondition. The
//!   driver keeps its untouched state and picks another action.
//! - `NotTerminalError`: scoring asked for before the game ended.
//! - `InvariantViolationError`: a transition would have produced a state
//!   that breaks a state invariant. Indicates a bug or a broken catalog;
//!   the transition is discarded.
//! - `SetupError`, `SnapshotError`: setup and replay storage failures.
//!
//! `EngineError` wraps all of them and classifies each by `ErrorSeverity`.

use thiserror::Error;

use super::action::{Action, ActionKind};
use super::resources::{ResourceOverflow, Shortfall};
use super::state::Phase;
use super::worker::WorkerColor;
use crate::catalog::{BuildingId, CardId, ExchangeId, LocationId, OfferingId, SubLocationId};

/// Severity level of an error, used to pick a recovery strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorSeverity {
    /// The caller can carry on with the same state and a different input.
    Recoverable,

    /// The state or the catalog cannot be trusted; stop.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Static data failed validation.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate {collection} id `{id}`")]
    DuplicateId { collection: &'static str, id: String },

    #[error("{entity} field `{field}` references unknown id `{id}`")]
    DanglingReference {
        entity: String,
        field: &'static str,
        id: String,
    },

    #[error("{entity} field `{field}` out of domain: {detail}")]
    OutOfDomain {
        entity: String,
        field: &'static str,
        detail: String,
    },

    #[error("catalog has no {collection}")]
    Empty { collection: &'static str },
}

/// The specific precondition an illegal action broke.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("the game is over")]
    GameOver,

    #[error("{action:?} is not allowed in the {phase} phase")]
    WrongPhase { phase: Phase, action: ActionKind },

    #[error("no worker in hand")]
    NoWorkerInHand,

    #[error("holding a {held} worker, not {requested}")]
    WrongWorkerColor { held: WorkerColor, requested: WorkerColor },

    #[error("only {required} workers allowed, got {offered}")]
    ColorRestricted { required: WorkerColor, offered: WorkerColor },

    #[error("building {building} is full ({capacity} slots)")]
    BuildingFull { building: BuildingId, capacity: u32 },

    #[error("unknown building {0}")]
    UnknownBuilding(BuildingId),

    #[error("unknown card {0}")]
    UnknownCard(CardId),

    #[error("unknown raid location {0}")]
    UnknownLocation(LocationId),

    #[error("unknown sub-location {location}/{sub_location}")]
    UnknownSubLocation {
        location: LocationId,
        sub_location: SubLocationId,
    },

    #[error("unknown offering {0}")]
    UnknownOffering(OfferingId),

    #[error("unknown exchange {0}")]
    UnknownExchange(ExchangeId),

    #[error("already placed a worker at {building} this turn")]
    AlreadyPlaced { building: BuildingId },

    #[error("must place a worker first")]
    NotPlaced,

    #[error("cannot pick up from {building}, placed there this turn")]
    SameBuilding { building: BuildingId },

    #[error("no worker to pick up at {building}")]
    NothingToPickUp { building: BuildingId },

    #[error("must pick up a worker before ending the turn")]
    PickupPending,

    #[error("placing at {building} would leave no worker to pick up")]
    NoPickupAfterPlacing { building: BuildingId },

    #[error("{0:?} already taken this turn")]
    ActionAlreadyTaken(ActionKind),

    #[error("card {0} is not in hand")]
    CardNotInHand(CardId),

    #[error("hero {0} cannot be played")]
    HeroNotPlayable(CardId),

    #[error("card {0} has no immediate effect")]
    NoImmediateEffect(CardId),

    #[error("insufficient resources: {0}")]
    InsufficientResources(Shortfall),

    #[error("crew is full ({limit})")]
    CrewFull { limit: u32 },

    #[error("{0} is already in the crew")]
    DuplicateCrew(CardId),

    #[error("crew already has a hero, cannot hire {0}")]
    HeroLimit(CardId),

    #[error("{card} must be hired with a {required} worker, placed {placed}")]
    HireColorMismatch {
        card: CardId,
        required: WorkerColor,
        placed: WorkerColor,
    },

    #[error("must buy at least one armour level")]
    ZeroArmourLevels,

    #[error("armour {current} + {requested} exceeds max {max}")]
    ArmourMaxed { current: u32, requested: u32, max: u32 },

    #[error("{location}/{sub_location} is occupied")]
    SubLocationOccupied {
        location: LocationId,
        sub_location: SubLocationId,
    },

    #[error("{location}/{sub_location} has no plunder left")]
    SubLocationExhausted {
        location: LocationId,
        sub_location: SubLocationId,
    },

    #[error("raid needs {required} crew, have {crew}")]
    NotEnoughCrew { required: u32, crew: u32 },

    #[error("offering {0} is not face up")]
    OfferingNotAvailable(OfferingId),
}

impl From<Shortfall> for Violation {
    fn from(shortfall: Shortfall) -> Self {
        Violation::InsufficientResources(shortfall)
    }
}

/// An action broke a precondition. The state it was checked against is
/// unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("illegal action `{action}`: {violation}")]
pub struct IllegalActionError {
    pub action: Action,
    pub violation: Violation,
}

impl IllegalActionError {
    #[must_use]
    pub fn new(action: &Action, violation: Violation) -> Self {
        Self {
            action: action.clone(),
            violation,
        }
    }
}

/// Scoring was requested before the game ended.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("game is not over (round {round}, {phase} phase)")]
pub struct NotTerminalError {
    pub phase: Phase,
    pub round: u32,
}

/// A transition would have broken a state invariant.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invariant `{invariant}` violated: {detail}")]
pub struct InvariantViolationError {
    pub invariant: &'static str,
    pub detail: String,
}

impl InvariantViolationError {
    pub fn new(invariant: &'static str, detail: impl Into<String>) -> Self {
        Self {
            invariant,
            detail: detail.into(),
        }
    }
}

impl From<ResourceOverflow> for InvariantViolationError {
    fn from(err: ResourceOverflow) -> Self {
        Self::new("resource_bounds", err.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("{requested} players requested, catalog allows {min}..={max}")]
    PlayerCount { requested: usize, min: usize, max: usize },
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("binary snapshot: {0}")]
    Binary(#[from] bincode::Error),

    #[error("json snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot version {found} not supported (expected {expected})")]
    Version { found: u32, expected: u32 },

    #[error("snapshot state is inconsistent: {0}")]
    Inconsistent(#[from] InvariantViolationError),
}

/// Failure inside a transition, before it is tied to the submitted action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fault {
    Illegal(Violation),
    Invariant(InvariantViolationError),
}

impl Fault {
    /// Attribute the failure to `action`.
    #[must_use]
    pub fn for_action(self, action: &Action) -> EngineError {
        match self {
            Fault::Illegal(violation) => IllegalActionError::new(action, violation).into(),
            Fault::Invariant(err) => err.into(),
        }
    }
}

impl From<Violation> for Fault {
    fn from(violation: Violation) -> Self {
        Fault::Illegal(violation)
    }
}

impl From<Shortfall> for Fault {
    fn from(shortfall: Shortfall) -> Self {
        Fault::Illegal(shortfall.into())
    }
}

impl From<InvariantViolationError> for Fault {
    fn from(err: InvariantViolationError) -> Self {
        Fault::Invariant(err)
    }
}

impl From<ResourceOverflow> for Fault {
    fn from(err: ResourceOverflow) -> Self {
        Fault::Invariant(err.into())
    }
}

/// Any failure surfaced by the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Illegal(#[from] IllegalActionError),

    #[error(transparent)]
    NotTerminal(#[from] NotTerminalError),

    #[error(transparent)]
    Invariant(#[from] InvariantViolationError),

    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

impl EngineError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Illegal(_) | Self::NotTerminal(_) | Self::Setup(_) => ErrorSeverity::Recoverable,
            Self::Catalog(_) | Self::Invariant(_) | Self::Snapshot(_) => ErrorSeverity::Fatal,
        }
    }

    /// The broken precondition, if this is an illegal-action error.
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            Self::Illegal(err) => Some(&err.violation),
            _ => None,
        }
    }
}
