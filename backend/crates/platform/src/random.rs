//! Random Selection

use rand::Rng;
use rand::rngs::OsRng;
use rand::seq::SliceRandom;

/// Pick a uniformly distributed index in `0..len` from the OS RNG.
///
/// Returns `None` for an empty range. Nothing is seeded per caller, so two
/// sessions of the same game never share a sequence.
pub fn random_index(len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(OsRng.gen_range(0..len))
}

/// Shuffle a slice in place.
pub fn shuffle<T>(items: &mut [T]) {
    items.shuffle(&mut OsRng);
}
