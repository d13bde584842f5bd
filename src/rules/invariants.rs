//! State invariants checked after every transition.
//!
//! A failure here means the engine itself is wrong, never the action: the
//! transition is dropped and reported as `InvariantViolationError`.

use rustc_hash::FxHashSet;

use crate::catalog::Catalog;
use crate::core::{GameState, InvariantViolationError, Phase, WorkerId};

type Check = fn(&Catalog, &GameState, &GameState) -> Result<(), InvariantViolationError>;

const CHECKS: &[Check] = &[
    check_seats,
    check_progression,
    check_workers,
    check_cards,
    check_offerings,
    check_players,
    check_references,
];

/// Check `after` against the catalog and the state it came from.
pub(crate) fn check(catalog: &Catalog, before: &GameState, after: &GameState) -> Result<(), InvariantViolationError> {
    CHECKS.iter().try_for_each(|rule| rule(catalog, before, after))
}

/// Check a state on its own, e.g. one read back from storage.
pub(crate) fn check_standalone(catalog: &Catalog, state: &GameState) -> Result<(), InvariantViolationError> {
    check(catalog, state, state)
}

/// The active and first player are seated.
pub(crate) fn check_seated(state: &GameState) -> Result<(), InvariantViolationError> {
    if state.players.get(state.active).is_none() {
        return violation("active_player", format!("{} out of range", state.active));
    }
    if state.players.get(state.first_player).is_none() {
        return violation("first_player", format!("{} out of range", state.first_player));
    }
    Ok(())
}

fn violation(invariant: &'static str, detail: impl Into<String>) -> Result<(), InvariantViolationError> {
    Err(InvariantViolationError::new(invariant, detail))
}

fn check_seats(_: &Catalog, before: &GameState, after: &GameState) -> Result<(), InvariantViolationError> {
    if after.player_count() != before.player_count() {
        return violation(
            "player_count",
            format!("{} -> {}", before.player_count(), after.player_count()),
        );
    }
    check_seated(after)
}

fn check_progression(_: &Catalog, before: &GameState, after: &GameState) -> Result<(), InvariantViolationError> {
    if after.round < before.round {
        return violation("round_monotonic", format!("{} -> {}", before.round, after.round));
    }
    if after.terminal != (after.phase == Phase::GameEnd) {
        return violation(
            "terminal",
            format!("terminal={} in {} phase", after.terminal, after.phase),
        );
    }
    if after.phase == Phase::RoundEnd {
        return violation("phase", "transition stopped in round end");
    }
    Ok(())
}

/// Every token exists exactly once and none appear or vanish.
fn check_workers(_: &Catalog, before: &GameState, after: &GameState) -> Result<(), InvariantViolationError> {
    let before_ids = worker_ids(before);
    let after_ids = worker_ids(after);

    let mut seen = FxHashSet::default();
    for id in &after_ids {
        if !seen.insert(*id) {
            return violation("worker_unique", format!("{id} is in two places"));
        }
    }
    let expected: FxHashSet<WorkerId> = before_ids.into_iter().collect();
    if seen != expected {
        return violation(
            "worker_conservation",
            format!("{} tokens before, {} after", expected.len(), seen.len()),
        );
    }
    Ok(())
}

fn worker_ids(state: &GameState) -> Vec<WorkerId> {
    let held = state.players.values().filter_map(|p| p.worker).map(|t| t.id);
    let placed = state.board.buildings.values().flat_map(|tokens| tokens.iter().map(|t| t.id));
    let raiding = state.board.iter_sub_locations().filter_map(|(_, _, spot)| spot.occupant).map(|t| t.id);
    held.chain(placed).chain(raiding).collect()
}

fn card_count(state: &GameState) -> usize {
    state.board.draw_pile.len()
        + state.board.discard_pile.len()
        + state.players.values().map(|p| p.hand.len() + p.crew.len()).sum::<usize>()
}

fn check_cards(_: &Catalog, before: &GameState, after: &GameState) -> Result<(), InvariantViolationError> {
    let (b, a) = (card_count(before), card_count(after));
    if a != b {
        return violation("card_conservation", format!("{b} cards -> {a}"));
    }
    Ok(())
}

fn offering_count(state: &GameState) -> usize {
    state.board.offering_stack.len()
        + state.board.offering_row.len()
        + state.players.values().map(|p| p.offerings.len()).sum::<usize>()
}

fn check_offerings(_: &Catalog, before: &GameState, after: &GameState) -> Result<(), InvariantViolationError> {
    let (b, a) = (offering_count(before), offering_count(after));
    if a != b {
        return violation("offering_conservation", format!("{b} offerings -> {a}"));
    }
    Ok(())
}

fn check_players(catalog: &Catalog, _: &GameState, after: &GameState) -> Result<(), InvariantViolationError> {
    let rules = catalog.rules();
    for (id, player) in after.players.iter() {
        if player.crew.len() > rules.crew_limit as usize {
            return violation("crew_limit", format!("{id} has {} crew", player.crew.len()));
        }
        let mut crew = FxHashSet::default();
        if !player.crew.iter().all(|card| crew.insert(card)) {
            return violation("crew_unique", format!("{id} hired the same card twice"));
        }
        let heroes = player
            .crew
            .iter()
            .filter(|card| catalog.card(card).is_some_and(|def| def.hero))
            .count();
        if heroes > 1 {
            return violation("hero_limit", format!("{id} has {heroes} heroes"));
        }
        if player.armour > rules.armour_max {
            return violation("armour_max", format!("{id} has armour {}", player.armour));
        }
        if player.hand.len() > rules.hand_limit as usize {
            return violation("hand_limit", format!("{id} holds {} cards", player.hand.len()));
        }
    }
    Ok(())
}

/// Every id in the state resolves in the catalog.
fn check_references(catalog: &Catalog, _: &GameState, after: &GameState) -> Result<(), InvariantViolationError> {
    let cards = after
        .players
        .values()
        .flat_map(|p| p.hand.iter().chain(p.crew.iter()))
        .chain(after.board.draw_pile.iter())
        .chain(after.board.discard_pile.iter());
    for card in cards {
        if catalog.card(card).is_none() {
            return violation("catalog_reference", format!("unknown card `{card}`"));
        }
    }

    let offerings = after
        .players
        .values()
        .flat_map(|p| p.offerings.iter())
        .chain(after.board.offering_stack.iter())
        .chain(after.board.offering_row.iter());
    for offering in offerings {
        if catalog.offering(offering).is_none() {
            return violation("catalog_reference", format!("unknown offering `{offering}`"));
        }
    }

    for building in after.board.buildings.keys() {
        if catalog.building(building).is_none() {
            return violation("catalog_reference", format!("unknown building `{building}`"));
        }
    }
    for (location, sub, _) in after.board.iter_sub_locations() {
        if catalog.sub_location(location, sub).is_none() {
            return violation("catalog_reference", format!("unknown sub-location `{location}/{sub}`"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BuildingId, CardId};
    use crate::core::PlayerId;
    use crate::rules::new_game;

    fn setup() -> (Catalog, GameState) {
        let catalog = Catalog::standard().unwrap();
        let state = new_game(&catalog, 2, 42).unwrap();
        (catalog, state)
    }

    fn broken(catalog: &Catalog, before: &GameState, after: &GameState) -> &'static str {
        check(catalog, before, after).unwrap_err().invariant
    }

    #[test]
    fn test_fresh_game_holds() {
        let (catalog, state) = setup();
        assert!(check(&catalog, &state, &state).is_ok());
    }

    #[test]
    fn test_duplicate_worker() {
        let (catalog, state) = setup();
        let mut after = state.clone();
        let token = after.players[PlayerId::new(0)].worker.unwrap();
        after
            .board
            .buildings
            .insert(BuildingId::new("silversmith"), im::Vector::unit(token));

        assert_eq!(broken(&catalog, &state, &after), "worker_unique");
    }

    #[test]
    fn test_lost_worker() {
        let (catalog, state) = setup();
        let mut after = state.clone();
        after.players[PlayerId::new(1)].worker = None;

        assert_eq!(broken(&catalog, &state, &after), "worker_conservation");
    }

    #[test]
    fn test_round_goes_backwards() {
        let (catalog, mut state) = setup();
        state.round = 3;
        let mut after = state.clone();
        after.round = 2;

        assert_eq!(broken(&catalog, &state, &after), "round_monotonic");
    }

    #[test]
    fn test_terminal_flag_matches_phase() {
        let (catalog, state) = setup();
        let mut after = state.clone();
        after.terminal = true;

        assert_eq!(broken(&catalog, &state, &after), "terminal");
    }

    #[test]
    fn test_duplicate_crew() {
        let (catalog, state) = setup();
        let mut before = state.clone();
        let card = before.board.draw_pile.pop_back().unwrap();
        before.board.draw_pile.pop_back();
        before.players[PlayerId::new(0)].crew.push_back(card.clone());
        before.players[PlayerId::new(0)].crew.push_back(card);

        assert_eq!(broken(&catalog, &state, &before), "crew_unique");
    }

    #[test]
    fn test_card_conservation() {
        let (catalog, state) = setup();
        let mut after = state.clone();
        after.board.draw_pile.pop_back();

        assert_eq!(broken(&catalog, &state, &after), "card_conservation");
    }

    #[test]
    fn test_unknown_card() {
        let (catalog, state) = setup();
        let mut after = state.clone();
        after.board.draw_pile.pop_back();
        after.board.discard_pile.push_back(CardId::new("dragon"));

        assert_eq!(broken(&catalog, &state, &after), "catalog_reference");
    }
}
