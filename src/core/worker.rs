//! Worker tokens.
//!
//! ## ID Layout
//!
//! Every token on the table has a unique `WorkerId`, allocated at setup:
//! - `0..player_count`: the players' own starting tokens
//! - `player_count..`: neutral tokens seeded onto buildings
//!
//! A token keeps its id for the whole game, which is what lets the
//! invariant checker confirm it sits in exactly one place.
//!
//! ```
//! use raiders_engine::core::{PlayerId, WorkerColor, WorkerId, WorkerToken};
//!
//! let token = WorkerToken::owned(WorkerId::player_token(PlayerId::new(1)), WorkerColor::Black, PlayerId::new(1));
//! assert_eq!(token.id, WorkerId(1));
//! assert!(!token.is_neutral());
//! ```

use serde::{Deserialize, Serialize};

use super::player::PlayerId;

/// Unique identifier for a worker token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorkerId(pub u32);

impl WorkerId {
    /// Id of a player's starting token.
    #[must_use]
    pub const fn player_token(player: PlayerId) -> Self {
        Self(player.0 as u32)
    }

    /// First id available for neutral tokens.
    #[must_use]
    pub const fn first_neutral(player_count: usize) -> u32 {
        player_count as u32
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for WorkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Worker({})", self.0)
    }
}

/// Worker colour. Buildings, cards and raid spots may restrict on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerColor {
    Grey,
    Black,
}

impl WorkerColor {
    pub const ALL: [WorkerColor; 2] = [WorkerColor::Grey, WorkerColor::Black];
}

impl std::fmt::Display for WorkerColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerColor::Grey => f.write_str("grey"),
            WorkerColor::Black => f.write_str("black"),
        }
    }
}

/// A placeable token. `owner` is `None` for neutral tokens until a
/// player picks them up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkerToken {
    pub id: WorkerId,
    pub color: WorkerColor,
    pub owner: Option<PlayerId>,
}

impl WorkerToken {
    #[must_use]
    pub const fn owned(id: WorkerId, color: WorkerColor, owner: PlayerId) -> Self {
        Self {
            id,
            color,
            owner: Some(owner),
        }
    }

    #[must_use]
    pub const fn neutral(id: WorkerId, color: WorkerColor) -> Self {
        Self {
            id,
            color,
            owner: None,
        }
    }

    #[must_use]
    pub const fn is_neutral(&self) -> bool {
        self.owner.is_none()
    }

    /// The same token, now owned by `player`.
    #[must_use]
    pub const fn claimed_by(self, player: PlayerId) -> Self {
        Self {
            owner: Some(player),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_layout() {
        assert_eq!(WorkerId::player_token(PlayerId::new(0)), WorkerId(0));
        assert_eq!(WorkerId::player_token(PlayerId::new(3)), WorkerId(3));
        assert_eq!(WorkerId::first_neutral(4), 4);
    }

    #[test]
    fn test_claim_neutral() {
        let token = WorkerToken::neutral(WorkerId(5), WorkerColor::Grey);
        assert!(token.is_neutral());

        let claimed = token.claimed_by(PlayerId::new(1));
        assert_eq!(claimed.owner, Some(PlayerId::new(1)));
        assert_eq!(claimed.id, token.id);
        assert_eq!(claimed.color, WorkerColor::Grey);
    }

    #[test]
    fn test_color_serde() {
        let json = serde_json::to_string(&WorkerColor::Grey).unwrap();
        assert_eq!(json, "\"grey\"");
        let back: WorkerColor = serde_json::from_str("\"black\"").unwrap();
        assert_eq!(back, WorkerColor::Black);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", WorkerId(42)), "Worker(42)");
        assert_eq!(WorkerColor::Black.to_string(), "black");
    }
}
