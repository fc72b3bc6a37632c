//! Deterministic combat engine for two-fighter neuroevolution.
//!
//! This crate simulates a 2D fighting arena at a fixed 60 ticks per second:
//! a fighter state machine with physics integration, attack hitboxes, damage
//! and knockback resolution, an energy budget, and the per-tick fitness
//! shaping signal used to train neural controllers.
//!
//! # Architecture
//!
//! - [`world`] - arena constants and the [`Action`] set (contractual 0–7
//!   ordinals shared with the neural output layer)
//! - [`input`] - the [`InputSignals`] struct every controller produces
//! - [`fighter`] - single-fighter per-tick evolution and hit resolution
//! - [`bout`] - the two-fighter episode: countdown, fixed tick order,
//!   body-penetration resolution, termination and outcome
//! - [`shaping`] - per-tick reward shaping and end-of-match award weights
//!
//! # Important Design Decisions
//!
//! ## The engine is passive
//!
//! [`Bout::tick`] takes one already-decided [`InputSignals`] per fighter;
//! the engine never calls back into a controller. Neural, scripted, and
//! human policies all live outside this crate and inject their decisions,
//! which keeps the tick loop free of controller dependencies and trivially
//! reproducible.
//!
//! ## No randomness, no allocation in the tick loop
//!
//! The simulation contains no RNG: all variation (spawn offsets, network
//! weights) is injected at construction. Perception vectors and hitboxes
//! are fixed-size values on the stack, so a 5400-tick bout allocates
//! nothing.
//!
//! # Usage
//!
//! ```
//! use kumite_engine::{Bout, Facing, Fighter, InputSignals};
//!
//! let p1 = Fighter::new(280.0, Facing::Right);
//! let p2 = Fighter::new(470.0, Facing::Left);
//! let mut bout = Bout::headless(p1, p2);
//!
//! while !bout.status().is_ended() {
//!     bout.tick(&InputSignals::NONE, &InputSignals::NONE);
//! }
//! assert!(bout.outcome().is_some());
//! ```

pub use self::{
    bout::{Bout, BoutOutcome, BoutStatus, EndReason, Winner},
    fighter::{Facing, Fighter, Hitbox, PERCEPTION_LEN},
    input::InputSignals,
    world::Action,
};

pub mod bout;
pub mod fighter;
pub mod input;
pub mod shaping;
pub mod world;
