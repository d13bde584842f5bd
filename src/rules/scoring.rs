//! Final scoring.
//!
//! A player's score is the VP gathered during play, plus the end-game
//! bonuses of their crew, plus leftover resources converted at the rates
//! the rules configure.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::core::{GameState, NotTerminalError, PlayerId, PlayerMap, PlayerState};
use crate::effects::EndGameBonus;

/// Result of a completed game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameResult {
    /// Single winner.
    Winner(PlayerId),
    /// Several players share the best total.
    Winners(Vec<PlayerId>),
    /// Every player has the same total.
    Draw,
}

impl GameResult {
    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        match self {
            GameResult::Winner(p) => *p == player,
            GameResult::Winners(ps) => ps.contains(&player),
            GameResult::Draw => false,
        }
    }
}

/// One player's score breakdown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalScore {
    /// VP accumulated during play.
    pub base: u32,
    /// Crew end-game bonuses.
    pub end_game: u32,
    /// Leftover resource conversions.
    pub leftovers: u32,
    pub total: u32,
}

/// Final scores of every player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSheet {
    scores: PlayerMap<FinalScore>,
}

impl ScoreSheet {
    #[must_use]
    pub fn get(&self, player: PlayerId) -> Option<&FinalScore> {
        self.scores.get(player)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &FinalScore)> {
        self.scores.iter()
    }

    /// Total per player.
    #[must_use]
    pub fn totals(&self) -> PlayerMap<u32> {
        PlayerMap::new(self.scores.player_count(), |id| self.scores[id].total)
    }

    /// Winner(s) by total. Ties share the victory.
    #[must_use]
    pub fn result(&self) -> GameResult {
        let best = self.scores.values().map(|s| s.total).max().unwrap_or(0);
        let winners: Vec<PlayerId> = self
            .scores
            .iter()
            .filter(|(_, s)| s.total == best)
            .map(|(id, _)| id)
            .collect();

        match winners.as_slice() {
            [single] => GameResult::Winner(*single),
            _ if winners.len() == self.scores.player_count() => GameResult::Draw,
            _ => GameResult::Winners(winners),
        }
    }
}

/// Score a finished game.
///
/// ```
/// use raiders_engine::catalog::Catalog;
/// use raiders_engine::rules::{new_game, score};
///
/// let catalog = Catalog::standard().unwrap();
/// let state = new_game(&catalog, 2, 42).unwrap();
/// assert!(score(&catalog, &state).is_err());
/// ```
pub fn score(catalog: &Catalog, state: &GameState) -> Result<ScoreSheet, NotTerminalError> {
    if !state.is_terminal() {
        return Err(NotTerminalError {
            phase: state.phase,
            round: state.round,
        });
    }

    let scores = PlayerMap::new(state.player_count(), |id| final_score(catalog, &state.players[id]));
    Ok(ScoreSheet { scores })
}

fn final_score(catalog: &Catalog, player: &PlayerState) -> FinalScore {
    let end_game = catalog
        .crew_effects(player.crew.iter())
        .filter_map(|effect| effect.end_game())
        .map(|bonus| end_game_bonus(bonus, player))
        .fold(0, u32::saturating_add);

    let leftovers = catalog
        .rules()
        .leftover_conversions
        .iter()
        .map(|c| per_unit(player.resources.get(c.resource), c.per, c.vp))
        .fold(0, u32::saturating_add);

    FinalScore {
        base: player.vp,
        end_game,
        leftovers,
        total: player.vp.saturating_add(end_game).saturating_add(leftovers),
    }
}

fn end_game_bonus(bonus: &EndGameBonus, player: &PlayerState) -> u32 {
    match *bonus {
        EndGameBonus::Flat { vp } => vp,
        EndGameBonus::PerResource { resource, per, vp } => per_unit(player.resources.get(resource), per, vp),
        EndGameBonus::PerCrew { vp } => vp.saturating_mul(player.crew.len() as u32),
        EndGameBonus::PerOffering { vp } => vp.saturating_mul(player.offerings.len() as u32),
        EndGameBonus::PerArmour { per, vp } => per_unit(player.armour, per, vp),
        EndGameBonus::PerTrack { per, vp } => per_unit(player.track, per, vp),
    }
}

/// `vp` for every full `per` of `amount`.
fn per_unit(amount: u32, per: u32, vp: u32) -> u32 {
    amount.checked_div(per).unwrap_or(0).saturating_mul(vp)
}
