//! Convenient utility functions shared by the search, the front end and the
//! tools.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Picks one of the `items` uniformly at random. Returns [`None`] only if
/// `items` is empty.
pub fn choose<'a, T, R: Rng + ?Sized>(items: &'a [T], rng: &mut R) -> Option<&'a T> {
    items.choose(rng)
}

/// Creates the pseudo-random generator used by the search. A fixed `seed`
/// makes the whole search reproducible, otherwise the generator is seeded
/// from the operating system.
#[must_use]
pub fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
    seed.map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64)
}
