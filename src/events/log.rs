//! Accumulated event history.

use serde::{Deserialize, Serialize};

use super::event::{EventKind, GameEvent, Stat};
use crate::core::PlayerId;

/// Ordered events of a whole game.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<GameEvent>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = GameEvent>) {
        self.events.extend(events);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }

    /// Events of one kind, in order.
    pub fn of_kind(&self, kind: EventKind) -> impl Iterator<Item = &GameEvent> {
        self.events.iter().filter(move |e| e.kind == kind)
    }

    /// Count of events of one kind for one player.
    #[must_use]
    pub fn count(&self, kind: EventKind, player: PlayerId) -> usize {
        self.of_kind(kind).filter(|e| e.player == Some(player)).count()
    }

    /// Net change of `stat` for `player` over the events of `kind`.
    #[must_use]
    pub fn total(&self, kind: EventKind, player: PlayerId, stat: Stat) -> i64 {
        self.of_kind(kind)
            .filter(|e| e.player == Some(player))
            .map(|e| e.delta(stat))
            .sum()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[GameEvent] {
        &self.events
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<GameEvent> {
        self.events
    }
}
