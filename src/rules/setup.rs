//! Game setup.

use im::Vector;
use tracing::info;

use crate::catalog::{CardId, Catalog, OfferingId};
use crate::core::{GameRng, GameState, PlayerId, SetupError, SubLocationState, WorkerId, WorkerToken};

use super::phase::refill_offerings;

/// Set up a fresh game for `player_count` players.
///
/// Everything random at setup (deck and offering order) comes from `seed`,
/// so the same catalog, player count and seed always give the same state.
///
/// ```
/// use raiders_engine::catalog::Catalog;
/// use raiders_engine::core::SetupError;
/// use raiders_engine::rules::new_game;
///
/// let catalog = Catalog::standard().unwrap();
/// assert_eq!(new_game(&catalog, 3, 1).unwrap(), new_game(&catalog, 3, 1).unwrap());
/// assert!(matches!(new_game(&catalog, 9, 1), Err(SetupError::PlayerCount { .. })));
/// ```
pub fn new_game(catalog: &Catalog, player_count: usize, seed: u64) -> Result<GameState, SetupError> {
    let rules = catalog.rules();
    if player_count < rules.min_players.max(1)
        || player_count > rules.max_players
        || player_count > usize::from(u8::MAX)
    {
        return Err(SetupError::PlayerCount {
            requested: player_count,
            min: rules.min_players,
            max: rules.max_players,
        });
    }

    let mut state = GameState::empty(player_count);
    let rng = GameRng::new(seed);

    for (id, player) in state.players.iter_mut() {
        player.resources = rules.starting_resources.clone();
        player.worker = Some(WorkerToken::owned(WorkerId::player_token(id), rules.starting_worker, id));
    }

    let mut next_neutral = WorkerId::first_neutral(player_count);
    for building in catalog.buildings() {
        let mut tokens = Vector::new();
        if let Some(color) = building.starting_worker {
            tokens.push_back(WorkerToken::neutral(WorkerId(next_neutral), color));
            next_neutral += 1;
        }
        state.board.buildings.insert(building.id.clone(), tokens);
    }

    let mut deck: Vec<CardId> = catalog
        .cards()
        .flat_map(|card| std::iter::repeat(card.id.clone()).take(card.deck_count as usize))
        .collect();
    rng.for_context("deck").shuffle(&mut deck);
    state.board.draw_pile = deck.into_iter().collect();

    for _ in 0..rules.starting_hand_size {
        for id in PlayerId::all(player_count) {
            if let Some(card) = state.board.draw() {
                state.players[id].hand.push_back(card);
            }
        }
    }

    let mut offerings: Vec<OfferingId> = catalog.offerings().map(|o| o.id.clone()).collect();
    rng.for_context("offerings").shuffle(&mut offerings);
    state.board.offering_stack = offerings.into_iter().collect();
    refill_offerings(catalog, &mut state, &mut Vec::new());

    for location in catalog.raid_locations() {
        let subs = location
            .sub_locations
            .iter()
            .map(|sub| {
                let spot = SubLocationState {
                    occupant: None,
                    plunder: sub.plunder.clone(),
                };
                (sub.id.clone(), spot)
            })
            .collect();
        state.board.sub_locations.insert(location.id.clone(), subs);
    }

    info!(
        players = player_count,
        seed,
        deck = state.board.draw_pile.len(),
        "game created"
    );
    Ok(state)
}
