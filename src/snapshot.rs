//! Session snapshots.
//!
//! A snapshot is everything needed to resume a game exactly: the state and
//! the position of the session RNG. Two encodings are offered:
//! - bincode: compact, for checkpointing many games
//! - JSON: readable, for debugging and fixtures
//!
//! Both are lossless; a round trip compares equal field for field.

use serde::{Deserialize, Serialize};

use crate::core::{GameRngState, GameState, SnapshotError};
use crate::rules;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// A resumable game.
///
/// ```
/// use raiders_engine::catalog::Catalog;
/// use raiders_engine::core::GameRng;
/// use raiders_engine::rules::new_game;
/// use raiders_engine::snapshot::Snapshot;
///
/// let catalog = Catalog::standard().unwrap();
/// let state = new_game(&catalog, 2, 42).unwrap();
/// let snapshot = Snapshot::new(state, GameRng::new(42).state());
///
/// let bytes = snapshot.to_bytes().unwrap();
/// assert_eq!(Snapshot::from_bytes(&bytes).unwrap(), snapshot);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub state: GameState,
    pub rng: GameRngState,
}

impl Snapshot {
    #[must_use]
    pub fn new(state: GameState, rng: GameRngState) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            state,
            rng,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self = bincode::deserialize(bytes)?;
        snapshot.checked()
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)?;
        snapshot.checked()
    }

    fn checked(self) -> Result<Self, SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::Version {
                found: self.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        rules::check_seated(&self.state)?;
        Ok(self)
    }
}
