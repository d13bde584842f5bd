//! Benchmarks for the transition hot path: legality enumeration, a single
//! `apply` and whole random games.

#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use raiders_engine::catalog::Catalog;
use raiders_engine::core::{GameRng, GameState, RandomSource};
use raiders_engine::rules::{apply, legal_actions, new_game};

/// A mid-game state: `steps` random legal actions from seed 42.
fn mid_game(catalog: &Catalog, steps: usize) -> GameState {
    let mut state = new_game(catalog, 4, 42).unwrap();
    let mut rng = GameRng::new(42);
    for _ in 0..steps {
        let actions = legal_actions(catalog, &state);
        if actions.is_empty() {
            break;
        }
        let action = &actions[rng.pick_index(actions.len())];
        state = apply(catalog, &state, action, &mut rng).unwrap().state;
    }
    state
}

fn play_game(catalog: &Catalog, players: usize, seed: u64) -> GameState {
    let mut state = new_game(catalog, players, seed).unwrap();
    let mut rng = GameRng::new(seed);
    loop {
        let actions = legal_actions(catalog, &state);
        if actions.is_empty() {
            return state;
        }
        let action = &actions[rng.pick_index(actions.len())];
        state = apply(catalog, &state, action, &mut rng).unwrap().state;
    }
}

fn bench_legal_actions(c: &mut Criterion) {
    let catalog = Catalog::standard().unwrap();
    let state = mid_game(&catalog, 60);

    c.bench_function("legal_actions_4p", |b| {
        b.iter(|| black_box(legal_actions(black_box(&catalog), black_box(&state))));
    });
}

fn bench_apply(c: &mut Criterion) {
    let catalog = Catalog::standard().unwrap();
    let state = mid_game(&catalog, 60);
    let action = legal_actions(&catalog, &state)[0].clone();

    c.bench_function("apply_4p", |b| {
        let mut rng = GameRng::new(7);
        b.iter(|| black_box(apply(black_box(&catalog), black_box(&state), black_box(&action), &mut rng)));
    });
}

fn bench_full_game(c: &mut Criterion) {
    let catalog = Catalog::standard().unwrap();

    c.bench_function("random_game_2p", |b| {
        b.iter(|| black_box(play_game(&catalog, 2, black_box(42))));
    });
    c.bench_function("random_game_4p", |b| {
        b.iter(|| black_box(play_game(&catalog, 4, black_box(42))));
    });
}

criterion_group!(benches, bench_legal_actions, bench_apply, bench_full_game);
criterion_main!(benches);
