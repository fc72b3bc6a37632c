//! Arena dimensions, physics constants, energy budget, and the action set.
//!
//! Every constant in this module is shared by the fighter state machine, the
//! bout loop, and the fitness shaping rules. They are compile-time constants:
//! the simulation contains no configuration that changes arena geometry or
//! action costs at runtime.

use serde::{Deserialize, Serialize};

/// Arena width in pixels.
pub const CANVAS_W: f32 = 800.0;
/// Arena height in pixels.
pub const CANVAS_H: f32 = 400.0;
/// Y coordinate of the ground line. Fighters stand at `GROUND_Y - FIGHTER_H`.
pub const GROUND_Y: f32 = 380.0;

/// Fighter body width in pixels.
pub const FIGHTER_W: f32 = 55.0;
/// Fighter body height in pixels.
pub const FIGHTER_H: f32 = 110.0;

/// Simulation rate. One tick is 1/60 s.
pub const FPS: u32 = 60;
/// Match timer: 90 seconds at 60 FPS.
pub const MATCH_FRAMES: u32 = 90 * FPS;
/// Pre-fight countdown used by arcade bouts (3 seconds).
pub const COUNTDOWN_FRAMES: u32 = 3 * FPS;

/// Downward acceleration per tick.
pub const GRAVITY: f32 = 0.8;
/// Horizontal velocity retained each tick.
pub const FRICTION: f32 = 0.85;
/// Horizontal velocity retained each tick while ragdolling.
pub const RAGDOLL_FRICTION: f32 = 0.5;
/// A dead fighter settles at `GROUND_Y - RAGDOLL_REST_HEIGHT`.
pub const RAGDOLL_REST_HEIGHT: f32 = 40.0;

/// Horizontal acceleration applied per movement input.
pub const MOVE_ACCEL: f32 = 1.5;
/// Upward velocity set by a jump.
pub const JUMP_VELOCITY: f32 = -18.0;
/// `vx` multiplier while crouching.
pub const CROUCH_DAMP: f32 = 0.5;
/// `vx` multiplier while blocking.
pub const BLOCK_DAMP: f32 = 0.3;
/// `vx` multiplier when an attack starts.
pub const ATTACK_DAMP: f32 = 0.2;

/// Upper bound for both health and energy.
pub const HEALTH_MAX: f32 = 100.0;
pub const ENERGY_MAX: f32 = 100.0;

// Energy costs per action. Movement and crouch/block are per tick held,
// jump and attacks are per activation.
pub const MOVE_COST: f32 = 0.1;
pub const JUMP_COST: f32 = 10.0;
pub const CROUCH_COST: f32 = 0.5;
pub const BLOCK_COST: f32 = 0.5;
pub const PUNCH_COST: f32 = 10.0;
pub const KICK_COST: f32 = 50.0;

/// Energy regenerated per tick while idle and nearly stationary.
pub const REGEN_IDLE: f32 = 0.5;
/// Energy regenerated per tick otherwise.
pub const REGEN_ACTIVE: f32 = 0.2;
/// `|vx|` below this counts as nearly stationary for the regen bonus.
pub const NEAR_STATIONARY: f32 = 0.1;

/// Frames until the next attack is allowed after starting one.
pub const ATTACK_COOLDOWN: u32 = 20;
/// A fighter with `cooldown` above this is animation-locked (no movement).
pub const ANIMATION_LOCK_COOLDOWN: u32 = 5;
/// Attack hitboxes are active while `cooldown` is inside this open interval.
pub const HITBOX_WINDOW: (u32, u32) = (5, 15);
/// Opponent cooldown is normalized by this in the perception vector.
pub const COOLDOWN_SCALE: f32 = 40.0;

pub const PUNCH_DAMAGE: f32 = 5.0;
pub const KICK_DAMAGE: f32 = 10.0;
/// Damage multiplier against a blocking opponent.
pub const BLOCK_DAMAGE_FACTOR: f32 = 0.5;
/// Damage multipliers against a crouching opponent.
pub const CROUCH_PUNCH_FACTOR: f32 = 0.5;
pub const CROUCH_KICK_FACTOR: f32 = 0.25;
/// Energy drained from a blocking or crouching opponent on a landed hit.
pub const GUARD_ENERGY_PENALTY: f32 = 1.0;

/// Knockback `vx` magnitudes, signed by the attacker's facing.
pub const PUNCH_KNOCKBACK: f32 = 8.0;
pub const KICK_KNOCKBACK: f32 = 15.0;
/// Knockback `vy` applied on any landed hit.
pub const HIT_LAUNCH: f32 = -5.0;

/// A fighter's current action. Doubles as the animation state.
///
/// The ordinal (0–7) is contractual: it is the index of the neural output
/// mapped to the action, and the perception vector reports the opponent's
/// state as `ordinal / 7`. Reordering variants breaks every trained network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Idle,
    MoveLeft,
    MoveRight,
    Jump,
    Crouch,
    Punch,
    Kick,
    Block,
}

impl Action {
    pub const COUNT: usize = 8;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Idle,
        Self::MoveLeft,
        Self::MoveRight,
        Self::Jump,
        Self::Crouch,
        Self::Punch,
        Self::Kick,
        Self::Block,
    ];

    /// Returns the contractual ordinal of this action.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns the action with the given ordinal, if it is in range.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Whether this action carries a hitbox during its active frames.
    #[must_use]
    pub fn is_attack(self) -> bool {
        matches!(self, Self::Punch | Self::Kick)
    }
}
