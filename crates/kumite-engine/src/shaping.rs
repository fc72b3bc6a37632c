//! Fitness shaping: the reward signal that teaches controllers to fight.
//!
//! Match outcomes alone are too sparse a signal for a fresh population, so
//! every fighting tick adds small shaping rewards that encourage closing
//! distance, facing the opponent, holding the center, and staying in motion,
//! and a match's end adds the large outcome awards. The per-tick path is
//! accumulated inside [`Fighter::update`](crate::Fighter::update); the
//! end-of-match awards are applied by the match coordinator, never per tick.
//!
//! All coefficients are literal and intentional: their relative magnitudes
//! (e.g. a KO at +300 versus ~0.1 per tick of good positioning) set how much
//! a controller can earn by posturing versus actually winning.

use crate::{
    fighter::{Facing, Fighter},
    world::{CANVAS_W, FIGHTER_W},
};

/// Proximity bands and their per-tick rewards. The bands stack: a fighter
/// within 80 px earns all three.
const PROXIMITY_BANDS: [(f32, f32); 3] = [(400.0, 0.005), (200.0, 0.02), (80.0, 0.05)];
/// Reward for facing toward the opponent.
const FACING_REWARD: f32 = 0.02;
/// Reward for attacking at close range.
const CLOSE_OFFENSE_RANGE: f32 = 100.0;
const CLOSE_OFFENSE_REWARD: f32 = 0.1;
/// Flat per-tick cost; passive play bleeds fitness.
const TICK_PENALTY: f32 = 0.005;
/// Penalty band near either wall, and the reward band around the center.
const EDGE_MARGIN: f32 = 60.0;
const EDGE_PENALTY: f32 = 0.04;
const CENTER_RANGE: f32 = 150.0;
const CENTER_REWARD: f32 = 0.015;
/// Reward for meaningful horizontal motion.
const MOTION_SPEED: f32 = 0.5;
const MOTION_REWARD: f32 = 0.008;

/// End-of-match award coefficients.
pub const DAMAGE_DEALT_WEIGHT: f32 = 2.0;
pub const HEALTH_REMAINING_WEIGHT: f32 = 2.5;
pub const KO_WIN_BONUS: f32 = 300.0;
pub const TIMEOUT_WIN_BONUS: f32 = 150.0;
/// Both fighters lose this when a timeout match produced almost no damage.
pub const STALEMATE_PENALTY: f32 = 100.0;
pub const STALEMATE_DAMAGE_THRESHOLD: f32 = 30.0;

/// Computes one tick's shaping reward for `fighter`.
///
/// Evaluated against the fighter's pre-update state, so the close-range
/// offense bonus sees the action the opponent reacted to this tick.
#[must_use]
pub fn per_tick(fighter: &Fighter, opponent: &Fighter) -> f32 {
    let mut reward = 0.0;
    let distance = (fighter.x() - opponent.x()).abs();

    for (range, bonus) in PROXIMITY_BANDS {
        if distance < range {
            reward += bonus;
        }
    }

    if fighter.facing() == Facing::toward(opponent.x() - fighter.x()) {
        reward += FACING_REWARD;
    }

    if distance < CLOSE_OFFENSE_RANGE && fighter.state().is_attack() {
        reward += CLOSE_OFFENSE_REWARD;
    }

    reward -= TICK_PENALTY;

    if fighter.x() < EDGE_MARGIN || fighter.x() > CANVAS_W - FIGHTER_W - EDGE_MARGIN {
        reward -= EDGE_PENALTY;
    }
    if (fighter.x() - CANVAS_W / 2.0).abs() < CENTER_RANGE {
        reward += CENTER_REWARD;
    }
    if fighter.vx().abs() > MOTION_SPEED {
        reward += MOTION_REWARD;
    }

    reward
}

/// The outcome-independent part of the end-of-match award: damage dealt plus
/// health preserved.
#[must_use]
pub fn end_of_match_base(health_at_end: f32, damage_dealt: f32) -> f32 {
    DAMAGE_DEALT_WEIGHT * damage_dealt + HEALTH_REMAINING_WEIGHT * health_at_end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32, facing: Facing) -> Fighter {
        Fighter::new(x, facing)
    }

    #[test]
    fn test_proximity_bands_stack() {
        let center = CANVAS_W / 2.0;
        let near = per_tick(&at(center, Facing::Right), &at(center + 60.0, Facing::Left));
        let mid = per_tick(&at(center, Facing::Right), &at(center + 120.0, Facing::Left));
        let far = per_tick(&at(center, Facing::Right), &at(center + 149.0, Facing::Left));
        // 60 px earns all three bands, 120 px two, 149 px two as well but the
        // ordering below only needs the innermost band to matter.
        assert!(near > mid);
        assert!((mid - far).abs() < 1e-6);
        assert!((near - mid - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_facing_away_loses_the_facing_reward() {
        let center = CANVAS_W / 2.0;
        let toward = per_tick(&at(center, Facing::Right), &at(center + 60.0, Facing::Left));
        let away = per_tick(&at(center, Facing::Left), &at(center + 60.0, Facing::Left));
        assert!((toward - away - FACING_REWARD).abs() < 1e-6);
    }

    #[test]
    fn test_edge_penalty_and_center_bonus_are_disjoint() {
        let opponent = at(CANVAS_W / 2.0, Facing::Left);
        let cornered = per_tick(&at(10.0, Facing::Right), &opponent);
        let centered = per_tick(&at(CANVAS_W / 2.0, Facing::Right), &opponent);
        assert!(centered - cornered >= EDGE_PENALTY + CENTER_REWARD - 1e-6);
    }

    #[test]
    fn test_stationary_idle_pair_earns_the_spawn_rate() {
        // The canonical spawn: 280 / 470, facing each other. Distance 190
        // earns two proximity bands, both sit in the center band, facing is
        // correct, nothing moves.
        let p1 = at(280.0, Facing::Right);
        let p2 = at(470.0, Facing::Left);
        let expected = 0.005 + 0.02 + FACING_REWARD - TICK_PENALTY + CENTER_REWARD;
        assert!((per_tick(&p1, &p2) - expected).abs() < 1e-6);
        assert!((per_tick(&p2, &p1) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_end_of_match_base_weights() {
        assert!((end_of_match_base(100.0, 0.0) - 250.0).abs() < 1e-6);
        assert!((end_of_match_base(0.0, 50.0) - 100.0).abs() < 1e-6);
    }
}
