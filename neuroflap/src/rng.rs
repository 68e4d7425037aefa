//! Random-source helpers.
//!
//! Every stochastic operator in this crate is generic over `R: Rng`,
//! so runs can be made reproducible by handing in a seeded engine.

use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

/// Seedable engine used when the caller doesn't bring their own.
pub type DefaultRng = Xoshiro256StarStar;

/// Returns a [`DefaultRng`] seeded from system entropy.
pub fn entropy_rng() -> DefaultRng {
    DefaultRng::from_entropy()
}

/// Returns a [`DefaultRng`] with a fixed seed.
pub fn seeded_rng(seed: u64) -> DefaultRng {
    DefaultRng::seed_from_u64(seed)
}

/// Bernoulli trials with `f32` probabilities.
///
/// # Examples
/// ```
/// use neuroflap::rng::{seeded_rng, Chance};
///
/// let mut rng = seeded_rng(7);
/// assert!(rng.chance(1.0));
/// assert!(!rng.chance(0.0));
/// ```
pub trait Chance {
    /// Returns `true` with probability `chance`.
    /// Values outside `[0, 1]` saturate.
    fn chance(&mut self, chance: f32) -> bool;
}

impl<T: Rng + ?Sized> Chance for T {
    fn chance(&mut self, chance: f32) -> bool {
        self.gen::<f32>() < chance
    }
}

/// Uniform sample from `[-bound, bound]`.
pub(crate) fn symmetric<R: Rng + ?Sized>(rng: &mut R, bound: f32) -> f32 {
    if bound <= 0.0 {
        0.0
    } else {
        rng.gen_range(-bound..=bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chance_extremes() {
        let mut rng = seeded_rng(12345);
        for _ in 0..100 {
            assert!(rng.chance(1.0));
            assert!(!rng.chance(0.0));
        }
    }

    #[test]
    fn chance_is_roughly_calibrated() {
        let mut rng = seeded_rng(12345);
        let hits = (0..10_000).filter(|_| rng.chance(0.3)).count();
        assert!((2_700..3_300).contains(&hits), "hits: {}", hits);
    }

    #[test]
    fn symmetric_stays_in_bound() {
        let mut rng = seeded_rng(1);
        for _ in 0..1_000 {
            assert!(symmetric(&mut rng, 0.1).abs() <= 0.1);
        }
        assert_eq!(symmetric(&mut rng, 0.0), 0.0);
    }
}
