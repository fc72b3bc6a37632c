//! Seeding for deterministic evolution runs.

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;

/// Seed for a deterministic evolution run.
///
/// A 128-bit seed that initializes the trainer's random number generator.
/// The same seed reproduces the same population initialization, pairings,
/// spawn offsets, and genetic operations — the whole run, since the
/// simulation itself contains no randomness.
///
/// # Example
///
/// ```
/// use kumite_training::EvolutionSeed;
/// use rand::Rng as _;
///
/// // A random seed for a fresh run
/// let seed: EvolutionSeed = rand::rng().random();
///
/// // A fixed seed for a reproducible one
/// let seed = EvolutionSeed::from_u64(42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvolutionSeed([u8; 16]);

/// Allows generating random `EvolutionSeed` values with `rng.random()`.
impl Distribution<EvolutionSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> EvolutionSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        EvolutionSeed(seed)
    }
}

impl EvolutionSeed {
    /// Builds a seed from a small integer, e.g. a `--seed` CLI flag.
    #[must_use]
    pub fn from_u64(value: u64) -> Self {
        let mut seed = [0; 16];
        seed[..8].copy_from_slice(&value.to_le_bytes());
        seed[8..].copy_from_slice(&value.wrapping_mul(0x9E37_79B9_7F4A_7C15).to_le_bytes());
        Self(seed)
    }

    pub(crate) fn rng(self) -> Pcg32 {
        Pcg32::from_seed(self.0)
    }
}
