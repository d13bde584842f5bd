//! Deterministic random number generation.
//!
//! The engine never reads ambient randomness. Every function that needs
//! randomness (raid dice, deck refills) takes a `&mut dyn RandomSource`.
//!
//! - `GameRng`: seeded ChaCha8 stream with forking, context streams and
//!   O(1) serializable position. The normal source for play and self-play.
//! - `ScriptedRng`: replays a fixed list of die values. Used to force raid
//!   outcomes in tests and to replay recorded games.
//!
//! ```
//! use raiders_engine::core::{DieFaces, GameRng, RandomSource};
//!
//! let faces = DieFaces::new(1, 6);
//! let mut a = GameRng::new(42);
//! let mut b = GameRng::new(42);
//!
//! assert_eq!(a.roll_die(faces), b.roll_die(faces));
//! ```

use rand::rngs::mock::StepRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::hash::{Hash, Hasher};

/// Inclusive value range of a single raid die.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DieFaces {
    /// Lowest face value.
    pub min: u32,
    /// Highest face value.
    pub max: u32,
}

impl DieFaces {
    /// Create a die with faces `min..=max`.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Check whether a rolled value is a face of this die.
    #[must_use]
    pub const fn contains(self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }
}

impl Default for DieFaces {
    fn default() -> Self {
        Self::new(1, 6)
    }
}

/// Injected source of randomness for rule resolution.
pub trait RandomSource {
    /// Roll one die. Implementations should return a face of `faces`;
    /// the raid resolver rejects anything else as an invariant violation.
    fn roll_die(&mut self, faces: DieFaces) -> u32;

    /// Underlying generator for picks and shuffles.
    fn rng_core(&mut self) -> &mut dyn RngCore;

    /// Pick an index in `0..len`. An empty range picks 0.
    fn pick_index(&mut self, len: usize) -> usize {
        self.rng_core().gen_range(0..len.max(1))
    }
}

/// Shuffle a slice with the source's generator.
pub fn shuffle<T>(source: &mut dyn RandomSource, items: &mut [T]) {
    items.shuffle(source.rng_core());
}

/// Deterministic RNG with forking for parallel sessions.
///
/// Uses ChaCha8 for speed while keeping a high quality stream.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
    fork_counter: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
            fork_counter: 0,
        }
    }

    /// Fork this RNG to create an independent branch.
    ///
    /// Each fork produces a different but deterministic sequence, so batched
    /// self-play can hand every session its own generator.
    #[must_use]
    pub fn fork(&mut self) -> Self {
        self.fork_counter += 1;
        let fork_seed = self.seed.wrapping_add(self.fork_counter.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        Self {
            inner: ChaCha8Rng::seed_from_u64(fork_seed),
            seed: fork_seed,
            fork_counter: 0,
        }
    }

    /// Create an independent stream for a specific context.
    ///
    /// Setup uses `"deck"` and `"offerings"` so shuffling one pile never
    /// shifts the order of the other.
    #[must_use]
    pub fn for_context(&self, context: &str) -> Self {
        // Fixed hash: context seeds must not change between toolchains.
        let mut hasher = FxHasher::default();
        self.seed.hash(&mut hasher);
        context.hash(&mut hasher);
        let context_seed = hasher.finish();

        Self {
            inner: ChaCha8Rng::seed_from_u64(context_seed),
            seed: context_seed,
            fork_counter: 0,
        }
    }

    /// Generate a random u32 in the inclusive range.
    pub fn gen_inclusive(&mut self, min: u32, max: u32) -> u32 {
        self.inner.gen_range(min..=max)
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.inner);
    }

    /// Get the current state for serialization.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
            fork_counter: self.fork_counter,
        }
    }

    /// Restore from a saved state.
    #[must_use]
    pub fn from_state(state: &GameRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
            fork_counter: state.fork_counter,
        }
    }
}

impl RandomSource for GameRng {
    fn roll_die(&mut self, faces: DieFaces) -> u32 {
        self.gen_inclusive(faces.min, faces.max)
    }

    fn rng_core(&mut self) -> &mut dyn RngCore {
        &mut self.inner
    }
}

/// Serializable RNG state for checkpointing.
///
/// Uses ChaCha8 word position for O(1) serialization regardless of
/// how many random numbers have been generated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    /// Original seed
    pub seed: u64,
    /// ChaCha8 word position (128-bit counter)
    pub word_pos: u128,
    /// Fork counter for deterministic branching
    pub fork_counter: u64,
}

/// Random source that replays scripted die values.
///
/// Die values are consumed front to back and cycle when exhausted; an empty
/// script rolls the lowest face. Picks come from a zero `StepRng`, so index
/// picks return 0 and refill shuffles are a fixed permutation.
#[derive(Clone, Debug)]
pub struct ScriptedRng {
    script: VecDeque<u32>,
    rolled: Vec<u32>,
    picks: StepRng,
}

impl Default for ScriptedRng {
    fn default() -> Self {
        Self::new(VecDeque::new())
    }
}

impl ScriptedRng {
    /// Replay the given die values in order.
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = u32>) -> Self {
        Self {
            script: values.into_iter().collect(),
            rolled: Vec::new(),
            picks: StepRng::new(0, 0),
        }
    }

    /// Every die shows `value`.
    #[must_use]
    pub fn constant(value: u32) -> Self {
        Self::new([value])
    }

    /// Values handed out so far.
    #[must_use]
    pub fn rolled(&self) -> &[u32] {
        &self.rolled
    }
}

impl RandomSource for ScriptedRng {
    fn roll_die(&mut self, faces: DieFaces) -> u32 {
        let value = match self.script.pop_front() {
            Some(value) => {
                self.script.push_back(value);
                value
            }
            None => faces.min,
        };
        self.rolled.push(value);
        value
    }

    fn rng_core(&mut self) -> &mut dyn RngCore {
        &mut self.picks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = GameRng::new(42);
        let mut rng2 = GameRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.gen_inclusive(0, 1000), rng2.gen_inclusive(0, 1000));
        }
    }

    #[test]
    fn test_different_seeds() {
        let mut rng1 = GameRng::new(1);
        let mut rng2 = GameRng::new(2);

        let seq1: Vec<_> = (0..10).map(|_| rng1.gen_inclusive(0, 1000)).collect();
        let seq2: Vec<_> = (0..10).map(|_| rng2.gen_inclusive(0, 1000)).collect();

        assert_ne!(seq1, seq2);
    }

    #[test]
    fn test_fork_is_deterministic_and_distinct() {
        let mut rng1 = GameRng::new(42);
        let mut rng2 = GameRng::new(42);

        let mut forked1 = rng1.fork();
        let mut forked2 = rng2.fork();
        assert_eq!(forked1.seed, forked2.seed);

        let seq_parent: Vec<_> = (0..10).map(|_| rng1.gen_inclusive(0, 1000)).collect();
        let seq_fork: Vec<_> = (0..10).map(|_| forked1.gen_inclusive(0, 1000)).collect();
        assert_ne!(seq_parent, seq_fork);
        assert_eq!(forked2.gen_inclusive(0, 1000), seq_fork[0]);
    }

    #[test]
    fn test_context_streams() {
        let rng = GameRng::new(42);
        let mut deck = rng.for_context("deck");
        let mut offerings = rng.for_context("offerings");
        let mut deck_again = GameRng::new(42).for_context("deck");

        let a: Vec<_> = (0..10).map(|_| deck.gen_inclusive(0, 1000)).collect();
        let b: Vec<_> = (0..10).map(|_| offerings.gen_inclusive(0, 1000)).collect();
        let c: Vec<_> = (0..10).map(|_| deck_again.gen_inclusive(0, 1000)).collect();

        assert_ne!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_roll_die_within_faces() {
        let mut rng = GameRng::new(7);
        let faces = DieFaces::new(1, 6);

        for _ in 0..200 {
            assert!(faces.contains(rng.roll_die(faces)));
        }
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = GameRng::new(42);
        let mut data = vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10];

        rng.shuffle(&mut data);
        assert_ne!(data, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);

        data.sort_unstable();
        assert_eq!(data, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_state_restore_continues_sequence() {
        let mut rng = GameRng::new(42);
        for _ in 0..100 {
            rng.gen_inclusive(0, 1000);
        }

        let state = rng.state();
        let expected: Vec<_> = (0..10).map(|_| rng.gen_inclusive(0, 1000)).collect();

        let mut restored = GameRng::from_state(&state);
        let actual: Vec<_> = (0..10).map(|_| restored.gen_inclusive(0, 1000)).collect();

        assert_eq!(expected, actual);
    }

    #[test]
    fn test_state_serde() {
        let state = GameRngState {
            seed: 42,
            word_pos: 12345,
            fork_counter: 5,
        };

        let json = serde_json::to_string(&state).unwrap();
        let deserialized: GameRngState = serde_json::from_str(&json).unwrap();

        assert_eq!(state, deserialized);
    }

    #[test]
    fn test_scripted_rng_cycles() {
        let faces = DieFaces::new(0, 5);
        let mut rng = ScriptedRng::new([0, 3]);

        assert_eq!(rng.roll_die(faces), 0);
        assert_eq!(rng.roll_die(faces), 3);
        assert_eq!(rng.roll_die(faces), 0);
        assert_eq!(rng.rolled(), &[0, 3, 0]);
        assert_eq!(rng.pick_index(10), 0);
    }

    #[test]
    fn test_context_seeds_are_pinned() {
        // Recorded games depend on these values.
        assert_eq!(GameRng::new(42).for_context("deck").seed, 0xa226_fcd4_ee71_1b52);
        assert_eq!(GameRng::new(42).for_context("play").seed, 0x738c_7fe3_94d2_90fc);
    }

    #[test]
    fn test_shuffle_through_source_matches_game_rng() {
        let mut data: Vec<u32> = (0..20).collect();
        let mut expected = data.clone();

        shuffle(&mut GameRng::new(5), &mut data);
        GameRng::new(5).shuffle(&mut expected);
        assert_eq!(data, expected);
    }

    #[test]
    fn test_scripted_shuffle_is_fixed() {
        let mut a: Vec<u32> = (0..8).collect();
        let mut b = a.clone();

        shuffle(&mut ScriptedRng::default(), &mut a);
        shuffle(&mut ScriptedRng::constant(4), &mut b);
        assert_eq!(a, b);

        a.sort_unstable();
        assert_eq!(a, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn test_scripted_rng_empty_rolls_min() {
        let mut rng = ScriptedRng::default();
        assert_eq!(rng.roll_die(DieFaces::new(2, 4)), 2);
    }
}
