//! A bout: one two-fighter episode from countdown to knockout or timeout.
//!
//! The bout owns both [`Fighter`]s and advances them in lockstep. Each call
//! to [`Bout::tick`] consumes one already-decided [`InputSignals`] per
//! fighter; during the countdown both fighters are frozen and the inputs are
//! ignored. The tick order is fixed and reproducible: update P1, update P2,
//! resolve body penetration, resolve P1's hit, resolve P2's hit, advance the
//! timer, check termination. Both attacks can land in the same tick.
//!
//! There is no randomness anywhere in the loop: two bouts constructed from
//! identical fighters and fed identical input sequences produce identical
//! outcomes.

use serde::{Deserialize, Serialize};

use crate::{
    fighter::Fighter,
    input::InputSignals,
    world::{CANVAS_W, COUNTDOWN_FRAMES, FIGHTER_H, FIGHTER_W, MATCH_FRAMES},
};

/// Phase of a bout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum BoutStatus {
    Countdown,
    Fighting,
    Ended,
}

/// Who won a finished bout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    P1,
    P2,
    Draw,
}

/// How a finished bout ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    Knockout,
    Timeout,
}

/// Final accounting of a finished bout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoutOutcome {
    pub winner: Winner,
    pub ended_by: EndReason,
    pub p1_health: f32,
    pub p2_health: f32,
    /// Fighting frames elapsed (countdown excluded).
    pub duration_frames: u32,
    /// Damage dealt by both fighters combined; the stalemate test reads this.
    pub total_damage: f32,
}

#[derive(Debug, Clone)]
pub struct Bout {
    p1: Fighter,
    p2: Fighter,
    timer_frames: u32,
    countdown_frames: u32,
    status: BoutStatus,
    duration_frames: u32,
    outcome: Option<BoutOutcome>,
}

impl Bout {
    /// An arcade bout: 3-second countdown, then 90 seconds on the clock.
    #[must_use]
    pub fn new(p1: Fighter, p2: Fighter) -> Self {
        Self::with_countdown(p1, p2, COUNTDOWN_FRAMES)
    }

    /// A headless training bout: no countdown, fighting from the first tick.
    #[must_use]
    pub fn headless(p1: Fighter, p2: Fighter) -> Self {
        Self::with_countdown(p1, p2, 0)
    }

    #[must_use]
    pub fn with_countdown(p1: Fighter, p2: Fighter, countdown_frames: u32) -> Self {
        let status = if countdown_frames == 0 {
            BoutStatus::Fighting
        } else {
            BoutStatus::Countdown
        };
        Self {
            p1,
            p2,
            timer_frames: MATCH_FRAMES,
            countdown_frames,
            status,
            duration_frames: 0,
            outcome: None,
        }
    }

    #[must_use]
    pub fn p1(&self) -> &Fighter {
        &self.p1
    }

    #[must_use]
    pub fn p2(&self) -> &Fighter {
        &self.p2
    }

    #[must_use]
    pub fn status(&self) -> BoutStatus {
        self.status
    }

    #[must_use]
    pub fn timer_frames(&self) -> u32 {
        self.timer_frames
    }

    /// The outcome, present once the bout has ended.
    #[must_use]
    pub fn outcome(&self) -> Option<&BoutOutcome> {
        self.outcome.as_ref()
    }

    /// Advances the bout by one tick.
    pub fn tick(&mut self, input1: &InputSignals, input2: &InputSignals) {
        match self.status {
            BoutStatus::Ended => {}
            BoutStatus::Countdown => {
                self.countdown_frames -= 1;
                if self.countdown_frames == 0 {
                    self.status = BoutStatus::Fighting;
                }
            }
            BoutStatus::Fighting => self.fighting_tick(input1, input2),
        }
    }

    fn fighting_tick(&mut self, input1: &InputSignals, input2: &InputSignals) {
        self.p1.update(input1, &self.p2);
        self.p2.update(input2, &self.p1);

        resolve_body_overlap(&mut self.p1, &mut self.p2);

        self.p1.check_hit(&mut self.p2);
        self.p2.check_hit(&mut self.p1);

        self.timer_frames -= 1;
        self.duration_frames += 1;

        if !self.p1.is_alive() || !self.p2.is_alive() || self.timer_frames == 0 {
            self.settle();
        }
    }

    fn settle(&mut self) {
        let p1_dead = !self.p1.is_alive();
        let p2_dead = !self.p2.is_alive();
        let (winner, ended_by) = if p1_dead || p2_dead {
            let winner = match (p1_dead, p2_dead) {
                (true, true) => Winner::Draw,
                (true, false) => Winner::P2,
                _ => Winner::P1,
            };
            (winner, EndReason::Knockout)
        } else {
            let winner = if self.p1.health() > self.p2.health() {
                Winner::P1
            } else if self.p2.health() > self.p1.health() {
                Winner::P2
            } else {
                Winner::Draw
            };
            (winner, EndReason::Timeout)
        };
        self.outcome = Some(BoutOutcome {
            winner,
            ended_by,
            p1_health: self.p1.health(),
            p2_health: self.p2.health(),
            duration_frames: self.duration_frames,
            total_damage: self.p1.damage_dealt() + self.p2.damage_dealt(),
        });
        self.status = BoutStatus::Ended;
    }
}

/// Pushes two vertically-overlapping bodies apart horizontally, half the
/// overlap each, along the axis of their relative position. Facing is left
/// untouched.
fn resolve_body_overlap(p1: &mut Fighter, p2: &mut Fighter) {
    let overlap_x = (p1.x + FIGHTER_W).min(p2.x + FIGHTER_W) - p1.x.max(p2.x);
    let overlap_y = (p1.y + FIGHTER_H).min(p2.y + FIGHTER_H) - p1.y.max(p2.y);
    if overlap_x <= 0.0 || overlap_y <= 0.0 {
        return;
    }
    let push = overlap_x / 2.0;
    if p1.x <= p2.x {
        p1.x -= push;
        p2.x += push;
    } else {
        p1.x += push;
        p2.x -= push;
    }
    p1.x = p1.x.clamp(0.0, CANVAS_W - FIGHTER_W);
    p2.x = p2.x.clamp(0.0, CANVAS_W - FIGHTER_W);
}
