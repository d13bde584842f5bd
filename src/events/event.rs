//! Game event types.
//!
//! Every `apply` returns the ordered list of events it caused. An event
//! names what happened (`EventKind`), who it happened to, the catalog id it
//! concerns and the numeric changes it made. Analytics can rebuild
//! action-outcome statistics from the events alone, without diffing states.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{PlayerId, Resource, ResourceBag};

/// What happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    // === Actions ===
    WorkerPlaced,
    WorkerPickedUp,
    CardPlayed,
    CrewHired,
    ArmourBought,
    ResourcesExchanged,
    OfferingClaimed,
    PhaseEnded,

    // === Effects ===
    ResourcesGained,
    ResourcesSpent,
    ResourcesLost,
    CardsDrawn,
    ArmourGained,
    TrackAdvanced,
    VictoryGained,

    // === Raids ===
    RaidAttempted,
    DieRolled,
    RaidSucceeded,
    RaidFailed,

    // === Controller ===
    PlayerSkipped,
    PhaseStarted,
    WorkerReturned,
    DeckRefilled,
    OfferingRevealed,
    RoundEnded,
    GameEnded,
}

/// A numeric quantity an event changed or reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Resource(Resource),
    /// Cards entering (positive) or leaving (negative) a hand or pile.
    Cards,
    /// Cards a draw asked for but could not get.
    ShortDraw,
    Armour,
    Track,
    Vp,
    Crew,
    /// Total raid strength.
    Strength,
    /// Strength needed by a raid.
    Required,
    /// One die value.
    Die,
    Round,
}

/// One (stat, delta) pair.
pub type Delta = (Stat, i64);

/// A game event with contextual data.
///
/// ## Example
///
/// ```
/// use raiders_engine::core::{PlayerId, Resource};
/// use raiders_engine::events::{EventKind, GameEvent, Stat};
///
/// let event = GameEvent::new(EventKind::ResourcesGained)
///     .with_player(PlayerId::new(0))
///     .with_subject("silversmith")
///     .with_delta(Stat::Resource(Resource::Silver), 2);
///
/// assert_eq!(event.delta(Stat::Resource(Resource::Silver)), 2);
/// assert_eq!(event.delta(Stat::Vp), 0);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// The type of event.
    pub kind: EventKind,

    /// The player the event happened to, if any.
    pub player: Option<PlayerId>,

    /// Catalog id the event concerns (card, building, location, offering).
    pub subject: Option<String>,

    /// Numeric changes, in the order they were made.
    pub deltas: SmallVec<[Delta; 4]>,
}

impl GameEvent {
    /// Create a new event with just a kind.
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            player: None,
            subject: None,
            deltas: SmallVec::new(),
        }
    }

    /// Set the associated player (builder pattern).
    #[must_use]
    pub fn with_player(mut self, player: PlayerId) -> Self {
        self.player = Some(player);
        self
    }

    /// Set the subject id (builder pattern).
    #[must_use]
    pub fn with_subject(mut self, subject: impl ToString) -> Self {
        self.subject = Some(subject.to_string());
        self
    }

    /// Add a delta (builder pattern).
    #[must_use]
    pub fn with_delta(mut self, stat: Stat, delta: i64) -> Self {
        self.deltas.push((stat, delta));
        self
    }

    /// Add one delta per resource in `bag`, each multiplied by `sign`.
    #[must_use]
    pub fn with_resources(mut self, bag: &ResourceBag, sign: i64) -> Self {
        for (resource, amount) in bag.iter() {
            self.deltas.push((Stat::Resource(resource), sign * i64::from(amount)));
        }
        self
    }

    /// Sum of the deltas recorded for `stat`.
    #[must_use]
    pub fn delta(&self, stat: Stat) -> i64 {
        self.deltas
            .iter()
            .filter(|(s, _)| *s == stat)
            .map(|(_, d)| *d)
            .sum()
    }
}

/// Builders for common event patterns.
impl GameEvent {
    /// Create a phase start event.
    pub fn phase_started(phase: crate::core::Phase, round: u32) -> Self {
        Self::new(EventKind::PhaseStarted)
            .with_subject(phase)
            .with_delta(Stat::Round, i64::from(round))
    }

    /// Create a die roll event.
    pub fn die_rolled(player: PlayerId, location: impl ToString, value: u32) -> Self {
        Self::new(EventKind::DieRolled)
            .with_player(player)
            .with_subject(location)
            .with_delta(Stat::Die, i64::from(value))
    }
}
