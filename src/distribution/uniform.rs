//! Uniform random box indices
//!
//! All boxes have equal probability. Uses the xoshiro256++ PRNG, which is fast
//! and statistically sound; the generator is owned by the run, so concurrent
//! runs never contend on it.

use super::IndexSource;
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Uniform random index source
pub struct UniformDistribution {
    rng: Xoshiro256PlusPlus,
}

impl UniformDistribution {
    /// Create a new uniform distribution with random seed
    pub fn new() -> Self {
        Self {
            rng: Xoshiro256PlusPlus::from_entropy(),
        }
    }

    /// Create a new uniform distribution with specific seed
    ///
    /// Useful for reproducible runs.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    /// Seeded when `seed` is given, from entropy otherwise
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::with_seed(seed),
            None => Self::new(),
        }
    }
}

impl Default for UniformDistribution {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexSource for UniformDistribution {
    #[inline(always)]
    fn next_index(&mut self, num_boxes: usize) -> usize {
        if num_boxes == 0 {
            return 0;
        }
        self.rng.gen_range(0..num_boxes)
    }
}
