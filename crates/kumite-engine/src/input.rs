//! The control-signal struct shared by every policy kind.
//!
//! A fighter is driven exclusively through [`InputSignals`]: a human device,
//! a neural controller, and a user script all produce the same seven
//! booleans, and the fighter state machine interprets them identically
//! regardless of origin.

use serde::{Deserialize, Serialize};

/// One tick's worth of control signals.
///
/// | Signal | Meaning |
/// |---|---|
/// | `left` / `right` | horizontal acceleration, updates facing |
/// | `up` | jump if on the ground |
/// | `down` | crouch if on the ground |
/// | `action1` | punch |
/// | `action2` | kick |
/// | `action3` | block |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSignals {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub action1: bool,
    pub action2: bool,
    pub action3: bool,
}

impl InputSignals {
    /// The null input: no signal fires. Substituted for a faulting or
    /// over-budget policy, and fed to both fighters during the countdown.
    pub const NONE: Self = Self {
        left: false,
        right: false,
        up: false,
        down: false,
        action1: false,
        action2: false,
        action3: false,
    };
}
