//! Single-fighter state machine: perception, movement, attacks, physics,
//! and damage resolution.
//!
//! A [`Fighter`] is per-bout transient state. It is advanced one 1/60 s tick
//! at a time by [`Fighter::update`], which consumes already-decided
//! [`InputSignals`] — the engine never polls a policy itself. Decisions come
//! from outside (a human device snapshot, a neural forward pass, a script),
//! which keeps this module free of controller dependencies and keeps the
//! tick loop allocation-free.
//!
//! # Tick order
//!
//! `update` performs, in a fixed order: dead-check (ragdoll), per-tick
//! fitness shaping (from the previous tick's state), cooldown decrement and
//! energy regeneration, movement and state transitions (unless
//! animation-locked), attack initiation (if cooldown reached zero), hitbox
//! refresh, physics integration with ground/wall clamps.
//!
//! Hit resolution is separate: after both fighters of a bout have updated,
//! [`Fighter::check_hit`] tests this fighter's hitbox against the opponent's
//! body box and applies damage and knockback.

use crate::{
    input::InputSignals,
    shaping,
    world::{
        Action, ANIMATION_LOCK_COOLDOWN, ATTACK_COOLDOWN, ATTACK_DAMP, BLOCK_COST,
        BLOCK_DAMAGE_FACTOR, BLOCK_DAMP, CANVAS_H, CANVAS_W, COOLDOWN_SCALE, CROUCH_COST,
        CROUCH_DAMP, CROUCH_KICK_FACTOR, CROUCH_PUNCH_FACTOR, ENERGY_MAX, FIGHTER_H, FIGHTER_W,
        FRICTION, GRAVITY, GROUND_Y, GUARD_ENERGY_PENALTY, HEALTH_MAX, HITBOX_WINDOW, HIT_LAUNCH,
        JUMP_COST, JUMP_VELOCITY, KICK_COST, KICK_DAMAGE, KICK_KNOCKBACK, MOVE_ACCEL, MOVE_COST,
        NEAR_STATIONARY, PUNCH_COST, PUNCH_DAMAGE, PUNCH_KNOCKBACK, RAGDOLL_FRICTION,
        RAGDOLL_REST_HEIGHT, REGEN_ACTIVE, REGEN_IDLE,
    },
};

/// Length of the perception vector fed to neural policies.
pub const PERCEPTION_LEN: usize = 9;

/// Which way a fighter is looking. Attacks reach in this direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// −1.0 for left, +1.0 for right. Used for knockback and perception.
    #[must_use]
    pub fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    /// The facing that looks along a horizontal displacement.
    #[must_use]
    pub fn toward(dx: f32) -> Self {
        if dx < 0.0 { Self::Left } else { Self::Right }
    }
}

/// Axis-aligned attack zone, present only during an attack's active frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Hitbox {
    /// Standard AABB overlap test against a body box.
    #[must_use]
    pub fn overlaps(&self, x: f32, y: f32, w: f32, h: f32) -> bool {
        self.x < x + w && x < self.x + self.w && self.y < y + h && y < self.y + self.h
    }
}

// Attack geometry: (width, height, reach beyond the facing edge, y offset).
const PUNCH_BOX: (f32, f32, f32, f32) = (46.0, 20.0, 20.0, 25.0); // shoulder height
const KICK_BOX: (f32, f32, f32, f32) = (66.0, 30.0, 66.0, 55.0); // hip height

#[derive(Debug, Clone)]
pub struct Fighter {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) vx: f32,
    pub(crate) vy: f32,
    facing: Facing,
    health: f32,
    energy: f32,
    state: Action,
    cooldown: u32,
    hitbox: Option<Hitbox>,
    /// Set when the current attack already landed; suppresses the hitbox for
    /// the rest of the active window so one swing cannot hit twice.
    attack_landed: bool,
    shaping_reward: f32,
    damage_dealt: f32,
}

impl Fighter {
    /// Spawns a fighter standing on the ground at column `x`.
    #[must_use]
    pub fn new(x: f32, facing: Facing) -> Self {
        Self {
            x: x.clamp(0.0, CANVAS_W - FIGHTER_W),
            y: GROUND_Y - FIGHTER_H,
            vx: 0.0,
            vy: 0.0,
            facing,
            health: HEALTH_MAX,
            energy: ENERGY_MAX,
            state: Action::Idle,
            cooldown: 0,
            hitbox: None,
            attack_landed: false,
            shaping_reward: 0.0,
            damage_dealt: 0.0,
        }
    }

    #[must_use]
    pub fn x(&self) -> f32 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> f32 {
        self.y
    }

    #[must_use]
    pub fn vx(&self) -> f32 {
        self.vx
    }

    #[must_use]
    pub fn vy(&self) -> f32 {
        self.vy
    }

    #[must_use]
    pub fn facing(&self) -> Facing {
        self.facing
    }

    #[must_use]
    pub fn health(&self) -> f32 {
        self.health
    }

    #[must_use]
    pub fn energy(&self) -> f32 {
        self.energy
    }

    #[must_use]
    pub fn state(&self) -> Action {
        self.state
    }

    #[must_use]
    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    #[must_use]
    pub fn hitbox(&self) -> Option<Hitbox> {
        self.hitbox
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    #[must_use]
    pub fn on_ground(&self) -> bool {
        self.y >= GROUND_Y - FIGHTER_H
    }

    /// Per-tick shaping reward accumulated so far this bout.
    #[must_use]
    pub fn shaping_reward(&self) -> f32 {
        self.shaping_reward
    }

    /// Damage this fighter has dealt so far this bout.
    #[must_use]
    pub fn damage_dealt(&self) -> f32 {
        self.damage_dealt
    }

    /// Advances this fighter by one tick.
    pub fn update(&mut self, input: &InputSignals, opponent: &Fighter) {
        if !self.is_alive() {
            self.ragdoll();
            return;
        }

        // Shaping reads the state the opponent saw this tick, before the
        // state machine below rewrites it.
        self.shaping_reward += shaping::per_tick(self, opponent);

        self.cooldown = self.cooldown.saturating_sub(1);
        let regen = if self.state == Action::Idle && self.vx.abs() < NEAR_STATIONARY {
            REGEN_IDLE
        } else {
            REGEN_ACTIVE
        };
        self.energy = (self.energy + regen).min(ENERGY_MAX);

        if self.cooldown <= ANIMATION_LOCK_COOLDOWN {
            self.apply_movement(input);
        }
        if self.cooldown == 0 {
            self.try_attack(input);
        }

        self.refresh_hitbox();
        self.integrate();
        self.assert_bounds();
    }

    /// Resolves this fighter's attack against the opponent's body.
    ///
    /// A landed hit applies damage (reduced by the opponent's guard state),
    /// drains guard energy, knocks the opponent back, and clears the hitbox
    /// for the remainder of the swing.
    pub fn check_hit(&mut self, opponent: &mut Fighter) {
        let Some(hitbox) = self.hitbox else {
            return;
        };
        if !opponent.is_alive() || !hitbox.overlaps(opponent.x, opponent.y, FIGHTER_W, FIGHTER_H) {
            return;
        }

        let base = match self.state {
            Action::Punch => PUNCH_DAMAGE,
            Action::Kick => KICK_DAMAGE,
            _ => return,
        };
        let damage = match opponent.state {
            Action::Block => {
                opponent.energy = (opponent.energy - GUARD_ENERGY_PENALTY).max(0.0);
                base * BLOCK_DAMAGE_FACTOR
            }
            Action::Crouch => {
                opponent.energy = (opponent.energy - GUARD_ENERGY_PENALTY).max(0.0);
                let factor = if self.state == Action::Kick {
                    CROUCH_KICK_FACTOR
                } else {
                    CROUCH_PUNCH_FACTOR
                };
                base * factor
            }
            _ => base,
        };

        opponent.health = (opponent.health - damage).max(0.0);
        self.damage_dealt += damage;

        let knockback = if self.state == Action::Kick {
            KICK_KNOCKBACK
        } else {
            PUNCH_KNOCKBACK
        };
        opponent.vx = self.facing.sign() * knockback;
        opponent.vy = HIT_LAUNCH;

        self.hitbox = None;
        self.attack_landed = true;
    }

    /// Builds the normalized perception vector a neural policy sees.
    ///
    /// Components (in order): opponent offset x/y, own health, opponent
    /// health, opponent state ordinal, own energy, own facing sign, opponent
    /// cooldown, opponent energy. All roughly in `[-1, 1]` or `[0, 1]`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn compute_ai_inputs(&self, opponent: &Fighter) -> [f32; PERCEPTION_LEN] {
        [
            (opponent.x - self.x) / CANVAS_W,
            (opponent.y - self.y) / CANVAS_H,
            self.health / HEALTH_MAX,
            opponent.health / HEALTH_MAX,
            opponent.state.index() as f32 / (Action::COUNT - 1) as f32,
            self.energy / ENERGY_MAX,
            self.facing.sign(),
            opponent.cooldown as f32 / COOLDOWN_SCALE,
            opponent.energy / ENERGY_MAX,
        ]
    }

    fn apply_movement(&mut self, input: &InputSignals) {
        // Jump persists until the ground clamp clears it; everything else is
        // re-derived from this tick's signals.
        if self.state != Action::Jump {
            self.state = Action::Idle;
        }

        if input.left && self.energy >= MOVE_COST {
            self.vx -= MOVE_ACCEL;
            self.facing = Facing::Left;
            self.energy -= MOVE_COST;
            if self.state != Action::Jump {
                self.state = Action::MoveLeft;
            }
        }
        if input.right && self.energy >= MOVE_COST {
            self.vx += MOVE_ACCEL;
            self.facing = Facing::Right;
            self.energy -= MOVE_COST;
            if self.state != Action::Jump {
                self.state = Action::MoveRight;
            }
        }
        if input.up && self.on_ground() && self.energy >= JUMP_COST {
            self.vy = JUMP_VELOCITY;
            self.energy -= JUMP_COST;
            self.state = Action::Jump;
        }
        if input.down && self.on_ground() && self.energy >= CROUCH_COST {
            self.vx *= CROUCH_DAMP;
            self.energy -= CROUCH_COST;
            self.state = Action::Crouch;
        }
        if input.action3 && self.energy >= BLOCK_COST {
            self.vx *= BLOCK_DAMP;
            self.energy -= BLOCK_COST;
            self.state = Action::Block;
        }
    }

    fn try_attack(&mut self, input: &InputSignals) {
        if input.action1 && self.energy >= PUNCH_COST {
            self.energy -= PUNCH_COST;
            self.begin_attack(Action::Punch);
        } else if input.action2 && self.energy >= KICK_COST {
            self.energy -= KICK_COST;
            self.begin_attack(Action::Kick);
        }
    }

    fn begin_attack(&mut self, attack: Action) {
        debug_assert!(attack.is_attack());
        self.state = attack;
        self.cooldown = ATTACK_COOLDOWN;
        self.vx *= ATTACK_DAMP;
        self.attack_landed = false;
    }

    fn refresh_hitbox(&mut self) {
        let (lo, hi) = HITBOX_WINDOW;
        let active = self.state.is_attack() && self.cooldown > lo && self.cooldown < hi;
        if !active || self.attack_landed {
            self.hitbox = None;
            return;
        }
        let (w, h, reach, y_offset) = if self.state == Action::Kick {
            KICK_BOX
        } else {
            PUNCH_BOX
        };
        // The box's leading edge reaches `reach` px past the facing edge.
        let x = match self.facing {
            Facing::Right => self.x + FIGHTER_W + reach - w,
            Facing::Left => self.x - reach,
        };
        self.hitbox = Some(Hitbox {
            x,
            y: self.y + y_offset,
            w,
            h,
        });
    }

    fn integrate(&mut self) {
        self.x += self.vx;
        self.y += self.vy;
        self.vy += GRAVITY;
        self.vx *= FRICTION;

        if self.y >= GROUND_Y - FIGHTER_H {
            self.y = GROUND_Y - FIGHTER_H;
            self.vy = 0.0;
            if self.state == Action::Jump {
                self.state = Action::Idle;
            }
        }
        self.x = self.x.clamp(0.0, CANVAS_W - FIGHTER_W);
    }

    /// Physics-only integration after death. No policy input, halved
    /// friction, settles lying at `GROUND_Y - RAGDOLL_REST_HEIGHT`.
    fn ragdoll(&mut self) {
        self.hitbox = None;
        self.x += self.vx;
        self.y += self.vy;
        self.vy += GRAVITY;
        self.vx *= RAGDOLL_FRICTION;
        if self.y >= GROUND_Y - RAGDOLL_REST_HEIGHT {
            self.y = GROUND_Y - RAGDOLL_REST_HEIGHT;
            self.vy = 0.0;
        }
        self.x = self.x.clamp(0.0, CANVAS_W - FIGHTER_W);
    }

    fn assert_bounds(&self) {
        debug_assert!((0.0..=HEALTH_MAX).contains(&self.health));
        debug_assert!((0.0..=ENERGY_MAX).contains(&self.energy));
        debug_assert!((0.0..=CANVAS_W - FIGHTER_W).contains(&self.x));
        debug_assert!(self.y <= GROUND_Y - FIGHTER_H);
        if self.hitbox.is_some() {
            let (lo, hi) = HITBOX_WINDOW;
            debug_assert!(self.state.is_attack());
            debug_assert!(self.cooldown > lo && self.cooldown < hi);
        }
    }

    #[cfg(test)]
    pub(crate) fn set_health(&mut self, health: f32) {
        self.health = health;
    }

    #[cfg(test)]
    pub(crate) fn set_energy(&mut self, energy: f32) {
        self.energy = energy;
    }
}
