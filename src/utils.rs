//! Random number helpers shared by clauses and automata.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::block::{LANES, LaneMask};

/// Fast RNG owned by every clause and automata.
pub type FastRng = Xoshiro256PlusPlus;

/// # Overview
///
/// Creates a fast RNG seeded from a u64 value.
///
/// # Examples
///
/// ```
/// use granular_tsetlin::utils::rng_from_seed;
///
/// let mut rng = rng_from_seed(42);
/// ```
#[inline]
pub fn rng_from_seed(seed: u64) -> FastRng {
    Xoshiro256PlusPlus::seed_from_u64(seed)
}

/// # Overview
///
/// Creates a fast RNG with entropy from the thread-local RNG.
#[inline]
pub fn rng_from_entropy() -> FastRng {
    Xoshiro256PlusPlus::from_rng(&mut rand::rng())
}

/// # Overview
///
/// Derives an independent child engine from a parent engine.
///
/// Used to hand every automata and clause its own stream so that training one
/// class never perturbs the random sequence of another.
#[inline]
pub fn fork(parent: &mut FastRng) -> FastRng {
    Xoshiro256PlusPlus::seed_from_u64(parent.random::<u64>())
}

/// # Overview
///
/// Converts a probability in [0.0, 1.0] to an integer threshold.
///
/// `rng.random::<u32>() < threshold` is equivalent to a Bernoulli draw with
/// the given probability, minus a 2^-32 bias at 1.0.
#[inline]
#[must_use]
pub fn prob_to_threshold(prob: f64) -> u32 {
    (prob.clamp(0.0, 1.0) * u32::MAX as f64) as u32
}

/// # Overview
///
/// Performs a Bernoulli trial with given probability.
#[inline]
pub fn bernoulli<R: Rng>(rng: &mut R, probability: f64) -> bool {
    rng.random::<f64>() < probability
}

/// # Overview
///
/// Draws one independent Bernoulli outcome per lane in `valid`.
///
/// Lanes outside `valid` are never drawn and always come back clear.
#[inline]
pub fn bernoulli_mask<R: Rng>(rng: &mut R, threshold: u32, valid: LaneMask) -> LaneMask {
    let mut mask = 0;
    for lane in 0..LANES {
        if valid & (1 << lane) != 0 && rng.random::<u32>() < threshold {
            mask |= 1 << lane;
        }
    }
    mask
}
