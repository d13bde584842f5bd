//! Shared fixtures for integration tests.

#![allow(dead_code)]

use raiders_engine::catalog::{
    BuildingDefinition, CardDefinition, Catalog, CatalogSource, LocationKind, RaidLocationDefinition,
    SubLocationDefinition,
};
use raiders_engine::core::{
    Action, DieFaces, EndConditions, GameRng, RandomSource, Resource, ResourceBag, RulesConfig, WorkerColor,
};
use raiders_engine::effects::{Effect, Reward};
use raiders_engine::session::Session;

pub fn standard() -> Catalog {
    Catalog::standard().unwrap()
}

/// A small catalog for scripted raids.
///
/// Every player starts with 1 provisions and a single archer (cost 2,
/// strength 3) in hand. The silversmith pays 2 silver, the mill and the
/// gate hold one neutral black token each, and the harbor's sub-location
/// `a` needs `required` strength with one bonus die of faces 0..=5.
pub fn raid_source(required: u32) -> CatalogSource {
    let rules = RulesConfig::default()
        .with_starting_resources(ResourceBag::from_pairs(&[(Resource::Provisions, 1)]))
        .with_starting_hand_size(1)
        .with_work_turns_per_round(1)
        .with_die(DieFaces::new(0, 5))
        .with_end_conditions(EndConditions::round_limit_only(3));

    CatalogSource {
        rules,
        cards: vec![CardDefinition::new("archer", "Archer")
            .with_cost(2)
            .with_strength(3)
            .with_deck_count(4)],
        buildings: vec![
            BuildingDefinition::new("silversmith", "Silversmith").on_place(Effect::gain(Resource::Silver, 2)),
            BuildingDefinition::new("mill", "Mill").with_starting_worker(WorkerColor::Black),
            BuildingDefinition::new("gate", "Gate").with_starting_worker(WorkerColor::Black),
        ],
        raid_locations: vec![RaidLocationDefinition::new("harbor", "Harbor", LocationKind::Harbor)
            .with_min_crew(1)
            .with_sub_location(
                SubLocationDefinition::new("a", required, ResourceBag::from_pairs(&[(Resource::Gold, 2)]))
                    .with_bonus_dice(1)
                    .with_cost(ResourceBag::from_pairs(&[(Resource::Provisions, 1)]))
                    .with_reward(Reward { vp: 2, track: 1 }),
            )
            .with_sub_location(
                SubLocationDefinition::new("b", 20, ResourceBag::from_pairs(&[(Resource::Iron, 1)]))
                    .with_cost(ResourceBag::from_pairs(&[(Resource::Provisions, 1)])),
            )],
        offerings: Vec::new(),
        exchanges: Vec::new(),
    }
}

pub fn raid_catalog(required: u32) -> Catalog {
    Catalog::load(raid_source(required)).unwrap()
}

/// Play uniformly random legal actions until the game ends or `max_steps`
/// actions have been taken.
pub fn play_random(catalog: &Catalog, players: usize, seed: u64, max_steps: usize) -> Session<'_> {
    let mut session = Session::new(catalog, players, seed).unwrap();
    let mut chooser = GameRng::new(seed).for_context("chooser");

    for _ in 0..max_steps {
        if session.is_over() {
            break;
        }
        let actions = session.legal_actions();
        assert!(!actions.is_empty(), "no legal action in a live game");
        let action = actions[chooser.pick_index(actions.len())].clone();
        session.step(action).unwrap();
    }
    session
}

/// Always take the first legal action.
pub fn play_first(catalog: &Catalog, players: usize, seed: u64, max_steps: usize) -> Session<'_> {
    let mut session = Session::new(catalog, players, seed).unwrap();
    for _ in 0..max_steps {
        if session.is_over() {
            break;
        }
        let action: Action = session.legal_actions()[0].clone();
        session.step(action).unwrap();
    }
    session
}
