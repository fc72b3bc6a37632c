//! Adaptive mutation-rate control.
//!
//! The mutation rate follows three superimposed mechanisms, evaluated in
//! order each generation:
//!
//! 1. **Decay** - the base rate decays linearly from [`MutationSchedule::init`]
//!    toward [`MutationSchedule::floor`], trading exploration for refinement
//!    as the population matures
//! 2. **Plateau detection** - if the best fitness over the last
//!    [`MutationSchedule::plateau_threshold`] generations improved by less
//!    than 1%, the rate is spiked back up to at least
//!    [`MutationSchedule::plateau_spike`] to escape the local optimum
//! 3. **Periodic oscillation** - every [`MutationSchedule::oscillation_interval`]
//!    generations the rate gets a one-generation boost, injecting variation
//!    on a fixed cadence regardless of progress
//!
//! The result is clamped to `[floor, max]`. The whole controller is a pure
//! function of `(generation, recent best-fitness window)`, which keeps it
//! trivially testable and keeps runs reproducible.

use kumite_stats::improvement;

/// Improvement below which a window counts as a plateau.
const PLATEAU_IMPROVEMENT: f32 = 0.01;

/// Parameters of the adaptive mutation-rate controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MutationSchedule {
    /// Base rate at generation zero.
    pub init: f32,
    /// Lower clamp; decay never goes below this.
    pub floor: f32,
    /// Linear decay per generation.
    pub decay_per_gen: f32,
    /// Window length for plateau detection.
    pub plateau_threshold: usize,
    /// Minimum rate while a plateau is detected.
    pub plateau_spike: f32,
    /// Generations between periodic boosts.
    pub oscillation_interval: u32,
    /// Size of the periodic boost.
    pub oscillation_boost: f32,
    /// Upper clamp.
    pub max: f32,
}

impl Default for MutationSchedule {
    fn default() -> Self {
        Self {
            init: 0.30,
            floor: 0.05,
            decay_per_gen: 0.008,
            plateau_threshold: 5,
            plateau_spike: 0.20,
            oscillation_interval: 25,
            oscillation_boost: 0.05,
            max: 0.35,
        }
    }
}

impl MutationSchedule {
    /// Computes the mutation rate for `generation` given the recent window
    /// of per-generation best-fitness values (oldest first).
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn rate_for(&self, generation: u32, recent_best: &[f32]) -> f32 {
        let mut rate = (self.init - generation as f32 * self.decay_per_gen).max(self.floor);

        if recent_best.len() >= self.plateau_threshold {
            let window = &recent_best[recent_best.len() - self.plateau_threshold..];
            if improvement(window[0], window[window.len() - 1]) < PLATEAU_IMPROVEMENT {
                rate = rate.max(self.plateau_spike);
            }
        }

        if generation > 0 && generation % self.oscillation_interval == 0 {
            rate += self.oscillation_boost;
        }

        rate.clamp(self.floor, self.max)
    }
}
