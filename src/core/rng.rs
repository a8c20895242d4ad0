//! Seedable randomness for jitter, wander, and probability rolls
//!
//! All nondeterminism in the subsystem flows through an injected
//! [`rand::RngCore`], so tests can seed a [`ChaCha8Rng`] and replay
//! exact decision sequences.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Construct the subsystem's default RNG from a seed
pub fn seeded(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Symmetric jitter in [-amplitude/2, +amplitude/2]
///
/// Amplitude 0 yields exactly 0 without consuming randomness, so
/// jitter-free runs are bit-reproducible.
pub fn jitter(rng: &mut dyn RngCore, amplitude: f32) -> f32 {
    if amplitude <= 0.0 {
        return 0.0;
    }
    rng.gen_range(-amplitude * 0.5..=amplitude * 0.5)
}

/// Bernoulli roll with probability `p` (clamped to [0,1])
pub fn roll(rng: &mut dyn RngCore, p: f32) -> bool {
    if p <= 0.0 {
        return false;
    }
    if p >= 1.0 {
        return true;
    }
    rng.gen::<f32>() < p
}
