//! Turn and phase controller.
//!
//! An explicit state machine over `Phase`:
//!
//! ```text
//! Work --(everyone done)--> Raid --(everyone done)--> RoundEnd
//!   ^                                                     |
//!   +---------(no end condition met, round + 1)----------+
//!                                                         |
//!                                  (end condition met) GameEnd
//! ```
//!
//! `settle` runs after every action. It skips players who cannot act
//! (marking them done) and walks the machine forward until some player has
//! a real choice or the game is over. `RoundEnd` is always passed through
//! within a single `settle`, so drivers never see it.

use im::Vector;
use tracing::info;

use crate::catalog::{Catalog, CardId};
use crate::core::{shuffle, Action, Fault, GameState, InvariantViolationError, Phase, PlayerId, RandomSource};
use crate::events::{EventKind, GameEvent, Stat};

use super::legality::legal_actions;

/// Why the game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndReason {
    RoundLimit,
    OfferingsExhausted,
    PlunderDepleted,
    DrawPileExhausted,
}

impl EndReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            EndReason::RoundLimit => "round_limit",
            EndReason::OfferingsExhausted => "offerings_exhausted",
            EndReason::PlunderDepleted => "plunder_depleted",
            EndReason::DrawPileExhausted => "draw_pile_exhausted",
        }
    }
}

/// End the active player's turn and hand it to the next player who has
/// not finished the phase. Leaves `active` alone when everyone is done.
pub(crate) fn pass_turn(state: &mut GameState) {
    let active = state.active;
    state.players[active].turn.reset();
    if let Some(next) = next_unfinished(state, active) {
        state.active = next;
    }
}

/// First player after `from` (wrapping, `from` itself last) who has not
/// finished the current phase.
fn next_unfinished(state: &GameState, from: PlayerId) -> Option<PlayerId> {
    let count = state.player_count();
    let mut candidate = from;
    for _ in 0..count {
        candidate = candidate.next(count);
        if !state.players[candidate].phase_done {
            return Some(candidate);
        }
    }
    None
}

/// Skip players who cannot act and advance phases until someone can.
pub(crate) fn settle(
    catalog: &Catalog,
    state: &mut GameState,
    rng: &mut dyn RandomSource,
    events: &mut Vec<GameEvent>,
) -> Result<(), Fault> {
    let mut round_ends = 0u32;
    loop {
        if state.phase == Phase::GameEnd {
            return Ok(());
        }

        if state.all_done() {
            match state.phase {
                Phase::Work => start_phase(state, Phase::Raid, events),
                Phase::Raid => {
                    // A second round end within one settle means nobody could
                    // act for a whole round. Only a round limit ends that.
                    round_ends += 1;
                    if round_ends > 1 && catalog.rules().end_conditions.round_limit.is_none() {
                        return Err(InvariantViolationError::new(
                            "progress",
                            format!("no player can act in round {}", state.round),
                        )
                        .into());
                    }
                    end_round(catalog, state, rng, events)?;
                }
                Phase::RoundEnd | Phase::GameEnd => return Ok(()),
            }
            continue;
        }

        let active = state.active;
        let player = &state.players[active];
        if player.phase_done {
            // The player who just finished may still be `active`.
            if let Some(next) = next_unfinished(state, active) {
                state.active = next;
            }
            continue;
        }
        if player.turn.has_placed() {
            return Ok(());
        }

        let over_limit =
            state.phase == Phase::Work && player.work_turns >= catalog.rules().work_turns_per_round;
        if over_limit || legal_actions(catalog, state) == [Action::EndPhase] {
            state.players[active].phase_done = true;
            events.push(
                GameEvent::new(EventKind::PlayerSkipped)
                    .with_player(active)
                    .with_subject(state.phase),
            );
            pass_turn(state);
            continue;
        }

        return Ok(());
    }
}

fn start_phase(state: &mut GameState, phase: Phase, events: &mut Vec<GameEvent>) {
    for (_, player) in state.players.iter_mut() {
        player.phase_done = false;
        player.turn.reset();
        if phase == Phase::Work {
            player.work_turns = 0;
        }
    }
    state.phase = phase;
    state.active = state.first_player;
    info!(%phase, round = state.round, first = %state.first_player, "phase started");
    events.push(GameEvent::phase_started(phase, state.round));
}

/// Round-end bookkeeping, then either the next round or the end of the game.
fn end_round(
    catalog: &Catalog,
    state: &mut GameState,
    rng: &mut dyn RandomSource,
    events: &mut Vec<GameEvent>,
) -> Result<(), Fault> {
    state.phase = Phase::RoundEnd;

    return_raid_workers(state, events);
    refill_deck(state, rng, events);
    refill_offerings(catalog, state, events);
    state.first_player = state.first_player.next(state.player_count());

    events.push(GameEvent::new(EventKind::RoundEnded).with_delta(Stat::Round, i64::from(state.round)));
    info!(round = state.round, "round ended");

    if let Some(reason) = end_reason(catalog, state) {
        state.phase = Phase::GameEnd;
        state.terminal = true;
        for (_, player) in state.players.iter_mut() {
            player.turn.reset();
        }
        info!(round = state.round, reason = reason.as_str(), "game ended");
        events.push(
            GameEvent::new(EventKind::GameEnded)
                .with_subject(reason.as_str())
                .with_delta(Stat::Round, i64::from(state.round)),
        );
        return Ok(());
    }

    state.round = state
        .round
        .checked_add(1)
        .ok_or_else(|| InvariantViolationError::new("round_monotonic", "round counter overflow"))?;
    start_phase(state, Phase::Work, events);
    Ok(())
}

/// Raid tokens go back to their owners. A token stays on its sub-location
/// while its owner already holds another one.
fn return_raid_workers(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let occupied: Vec<_> = state
        .board
        .iter_sub_locations()
        .filter_map(|(loc, sub, spot)| spot.occupant.map(|token| (loc.clone(), sub.clone(), token)))
        .collect();

    for (location, sub_location, token) in occupied {
        let Some(owner) = token.owner else { continue };
        if state.players[owner].worker.is_some() {
            continue;
        }
        state.players[owner].worker = Some(token);
        if let Some(spot) = state.board.sub_location_mut(&location, &sub_location) {
            spot.occupant = None;
        }
        events.push(
            GameEvent::new(EventKind::WorkerReturned)
                .with_player(owner)
                .with_subject(format!("{location}/{sub_location}")),
        );
    }
}

/// Shuffle the discard pile and slide it under the draw pile.
fn refill_deck(state: &mut GameState, rng: &mut dyn RandomSource, events: &mut Vec<GameEvent>) {
    if state.board.discard_pile.is_empty() {
        return;
    }
    let mut discards: Vec<CardId> = std::mem::take(&mut state.board.discard_pile).into_iter().collect();
    shuffle(rng, &mut discards);
    let count = discards.len();

    let mut pile: Vector<CardId> = discards.into_iter().collect();
    pile.append(std::mem::take(&mut state.board.draw_pile));
    state.board.draw_pile = pile;

    events.push(GameEvent::new(EventKind::DeckRefilled).with_delta(Stat::Cards, count as i64));
}

/// Reveal offerings from the top of the stack until the row is full.
pub(crate) fn refill_offerings(catalog: &Catalog, state: &mut GameState, events: &mut Vec<GameEvent>) {
    let size = catalog.rules().offering_row_size as usize;
    while state.board.offering_row.len() < size {
        let Some(offering) = state.board.offering_stack.pop_back() else { break };
        events.push(GameEvent::new(EventKind::OfferingRevealed).with_subject(&offering));
        state.board.offering_row.push_back(offering);
    }
}

/// First end condition met, in the configured order.
fn end_reason(catalog: &Catalog, state: &GameState) -> Option<EndReason> {
    let conditions = &catalog.rules().end_conditions;

    if conditions.round_limit.is_some_and(|limit| state.round >= limit) {
        return Some(EndReason::RoundLimit);
    }
    if conditions
        .offering_stack_at_most
        .is_some_and(|at_most| state.board.offering_stack.len() <= at_most as usize)
    {
        return Some(EndReason::OfferingsExhausted);
    }
    if let Some(depletion) = conditions.plunder_depleted {
        let remaining: u32 = catalog
            .raid_locations()
            .filter(|loc| loc.kind == depletion.kind)
            .flat_map(|loc| {
                loc.sub_locations
                    .iter()
                    .filter_map(|sub| state.board.sub_location(&loc.id, &sub.id))
                    .map(|spot| spot.plunder.total())
            })
            .fold(0, u32::saturating_add);
        if remaining <= depletion.at_most {
            return Some(EndReason::PlunderDepleted);
        }
    }
    if conditions
        .draw_pile_at_most
        .is_some_and(|at_most| state.board.draw_pile.len() <= at_most as usize)
    {
        return Some(EndReason::DrawPileExhausted);
    }
    None
}
