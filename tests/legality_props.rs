//! Property-based tests for legality and transitions.
//!
//! States are reached by random legal playouts of the standard catalog;
//! actions are drawn from every variant over real and unknown ids.

#![allow(clippy::unwrap_used)]

mod common;

use proptest::prelude::*;

use raiders_engine::catalog::{BuildingId, CardId, Catalog, ExchangeId, LocationId, OfferingId, SubLocationId};
use raiders_engine::core::{Action, GameRng, GameState, RandomSource, WorkerColor};
use raiders_engine::rules::{apply, check, is_legal, legal_actions};

fn catalog() -> &'static Catalog {
    use std::sync::OnceLock;
    static CATALOG: OnceLock<Catalog> = OnceLock::new();
    CATALOG.get_or_init(common::standard)
}

fn pick<T: Clone + std::fmt::Debug + 'static>(items: Vec<T>) -> impl Strategy<Value = T> {
    (0..items.len()).prop_map(move |i| items[i].clone())
}

fn ids<T>(known: impl Iterator<Item = T>, unknown: T) -> Vec<T> {
    known.chain(std::iter::once(unknown)).collect()
}

fn color() -> impl Strategy<Value = WorkerColor> {
    prop_oneof![Just(WorkerColor::Grey), Just(WorkerColor::Black)]
}

fn arb_action() -> impl Strategy<Value = Action> {
    let c = catalog();
    let buildings = ids(c.buildings().map(|b| b.id.clone()), BuildingId::new("nowhere"));
    let cards = ids(c.cards().map(|d| d.id.clone()), CardId::new("nobody"));
    let exchanges = ids(c.exchanges().map(|e| e.id.clone()), ExchangeId::new("nothing"));
    let offerings = ids(c.offerings().map(|o| o.id.clone()), OfferingId::new("nothing"));
    let spots = ids(
        c.raid_locations()
            .flat_map(|l| l.sub_locations.iter().map(move |s| (l.id.clone(), s.id.clone()))),
        (LocationId::new("atlantis"), SubLocationId::new("a")),
    );

    prop_oneof![
        (pick(buildings.clone()), color()).prop_map(|(building, color)| Action::PlaceWorker { building, color }),
        pick(buildings).prop_map(|building| Action::PickupWorker { building }),
        pick(cards.clone()).prop_map(|card| Action::PlayCard { card }),
        pick(cards).prop_map(|card| Action::HireCrew { card }),
        (0u32..12).prop_map(|levels| Action::BuyArmour { levels }),
        pick(exchanges).prop_map(|exchange| Action::TakeResources { exchange }),
        (pick(spots), color()).prop_map(|((location, sub_location), color)| Action::Raid {
            location,
            sub_location,
            color
        }),
        pick(offerings).prop_map(|offering| Action::ClaimOffering { offering }),
        Just(Action::EndPhase),
    ]
}

/// Play `steps` random legal actions from a fresh game.
fn playout(players: usize, seed: u64, steps: usize) -> GameState {
    let catalog = catalog();
    let mut state = raiders_engine::rules::new_game(catalog, players, seed).unwrap();
    let mut rng = GameRng::new(seed).for_context("play");
    let mut chooser = GameRng::new(seed).for_context("chooser");

    for _ in 0..steps {
        let actions = legal_actions(catalog, &state);
        if actions.is_empty() {
            break;
        }
        let action = &actions[chooser.pick_index(actions.len())];
        state = apply(catalog, &state, action, &mut rng).unwrap().state;
    }
    state
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every listed action is accepted by `check`, and any action `check`
    /// accepts is listed.
    #[test]
    fn prop_legal_actions_match_check(
        players in 2usize..=4,
        seed in any::<u64>(),
        steps in 0usize..120,
        samples in prop::collection::vec(arb_action(), 1..24)
    ) {
        let catalog = catalog();
        let state = playout(players, seed, steps);
        let legal = legal_actions(catalog, &state);

        for action in &legal {
            prop_assert!(check(catalog, &state, action).is_ok(), "{action} listed but rejected");
        }
        for action in &samples {
            prop_assert_eq!(is_legal(catalog, &state, action), legal.contains(action), "{}", action);
        }
    }

    /// Illegal actions fail without side effects; legal ones always apply.
    #[test]
    fn prop_apply_is_all_or_nothing(
        players in 2usize..=4,
        seed in any::<u64>(),
        steps in 0usize..120,
        samples in prop::collection::vec(arb_action(), 1..24)
    ) {
        let catalog = catalog();
        let state = playout(players, seed, steps);
        let before = state.clone();
        let mut rng = GameRng::new(seed);

        for action in &samples {
            let result = apply(catalog, &state, action, &mut rng);
            if is_legal(catalog, &state, action) {
                prop_assert!(result.is_ok(), "{action} is legal but failed: {:?}", result.err());
            } else {
                let err = result.unwrap_err();
                prop_assert!(err.severity().is_recoverable());
            }
            prop_assert_eq!(&state, &before);
        }
    }

    /// Random legal play keeps the game consistent: the active player is
    /// seated, the round never decreases and the game only stops at the end.
    #[test]
    fn prop_random_play_stays_consistent(
        players in 2usize..=4,
        seed in any::<u64>(),
        steps in 0usize..400
    ) {
        let catalog = catalog();
        let mut state = raiders_engine::rules::new_game(catalog, players, seed).unwrap();
        let mut rng = GameRng::new(seed).for_context("play");
        let mut chooser = GameRng::new(seed).for_context("chooser");

        for _ in 0..steps {
            let actions = legal_actions(catalog, &state);
            prop_assert_eq!(actions.is_empty(), state.is_terminal());
            if actions.is_empty() {
                break;
            }
            let action = &actions[chooser.pick_index(actions.len())];
            let next = apply(catalog, &state, action, &mut rng).unwrap().state;

            prop_assert!(next.round >= state.round);
            prop_assert!(next.active.index() < players);
            for player in next.players.values() {
                prop_assert!(player.crew.len() <= catalog.rules().crew_limit as usize);
                prop_assert!(player.armour <= catalog.rules().armour_max);
            }
            state = next;
        }
    }
}
