//! Policy adapters: the three ways a fighter gets its decisions.
//!
//! Every controller kind — a human device, a neural network, a user script —
//! is wrapped in the [`Policy`] enum and exposes the single operation
//! [`Policy::decide`], producing the [`InputSignals`] the engine consumes.
//! The engine itself never sees a policy; [`run_bout`] (and the training
//! workers built on it) sit between the two, polling decisions and feeding
//! ticks.
//!
//! Script policies are treated as untrusted: a panic inside the script or a
//! decide call that overruns its wall-clock budget degrades to the null
//! input for that tick instead of taking the simulation down. The fault is
//! remembered so a driver can report it once per bout.

use std::{
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use kumite_engine::{Action, Bout, BoutOutcome, BoutStatus, Fighter, InputSignals};

use crate::network::Network;

/// Decision threshold: a neural output must strictly exceed this to fire.
const FIRE_THRESHOLD: f32 = 0.5;

/// Externally-written device state read by a human policy each tick.
///
/// The device side keeps one handle and writes it from its event loop; the
/// policy snapshots it once per tick, so a mid-tick write never tears.
#[derive(Debug, Clone, Default)]
pub struct SharedInput(Arc<Mutex<InputSignals>>);

impl SharedInput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current device state.
    pub fn set(&self, signals: InputSignals) {
        *self.0.lock().expect("input mutex poisoned") = signals;
    }

    #[must_use]
    pub fn snapshot(&self) -> InputSignals {
        *self.0.lock().expect("input mutex poisoned")
    }
}

/// A user-supplied decision function with a per-tick wall-clock budget.
pub struct ScriptPolicy {
    script: Box<dyn FnMut(&Fighter, &Fighter) -> InputSignals + Send>,
    budget: Duration,
    fault_pending: bool,
}

impl ScriptPolicy {
    /// Default per-tick budget for a script decision.
    pub const DEFAULT_BUDGET: Duration = Duration::from_millis(1);

    pub fn new<F>(script: F) -> Self
    where
        F: FnMut(&Fighter, &Fighter) -> InputSignals + Send + 'static,
    {
        Self::with_budget(script, Self::DEFAULT_BUDGET)
    }

    pub fn with_budget<F>(script: F, budget: Duration) -> Self
    where
        F: FnMut(&Fighter, &Fighter) -> InputSignals + Send + 'static,
    {
        Self {
            script: Box::new(script),
            budget,
            fault_pending: false,
        }
    }

    /// Runs the script for one tick. A panic or a blown budget yields the
    /// null input; the simulation is suspended for at most this one call.
    fn decide(&mut self, fighter: &Fighter, opponent: &Fighter) -> InputSignals {
        let start = Instant::now();
        let result = catch_unwind(AssertUnwindSafe(|| (self.script)(fighter, opponent)));
        match result {
            Ok(signals) if start.elapsed() <= self.budget => signals,
            _ => {
                self.fault_pending = true;
                InputSignals::NONE
            }
        }
    }

    /// Whether a fault occurred since the last call; clears the flag so a
    /// driver reports each fault burst once.
    pub fn take_fault(&mut self) -> bool {
        std::mem::take(&mut self.fault_pending)
    }
}

impl fmt::Debug for ScriptPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptPolicy")
            .field("budget", &self.budget)
            .field("fault_pending", &self.fault_pending)
            .finish_non_exhaustive()
    }
}

/// A fighter's decision source.
#[derive(Debug)]
pub enum Policy {
    /// Passthrough of external device state.
    Human(SharedInput),
    /// Perception vector → forward pass → threshold per output.
    Neural(Network),
    /// Sandboxed user script behind a time budget.
    Script(ScriptPolicy),
}

impl Policy {
    /// Produces this tick's control signals for `fighter` against `opponent`.
    pub fn decide(&mut self, fighter: &Fighter, opponent: &Fighter) -> InputSignals {
        match self {
            Self::Human(shared) => shared.snapshot(),
            Self::Neural(network) => {
                let outputs = network.predict(&fighter.compute_ai_inputs(opponent));
                signals_from_outputs(&outputs)
            }
            Self::Script(script) => script.decide(fighter, opponent),
        }
    }
}

/// Reinterprets the output vector with the contractual ordinal table: output
/// `k` above the threshold fires the signal of the action with ordinal `k`.
/// The `Idle` output has no signal to fire and is ignored.
fn signals_from_outputs(outputs: &[f32; Action::COUNT]) -> InputSignals {
    let fires = |action: Action| outputs[action.index()] > FIRE_THRESHOLD;
    InputSignals {
        left: fires(Action::MoveLeft),
        right: fires(Action::MoveRight),
        up: fires(Action::Jump),
        down: fires(Action::Crouch),
        action1: fires(Action::Punch),
        action2: fires(Action::Kick),
        action3: fires(Action::Block),
    }
}

/// Drives a bout to completion with a policy per fighter.
///
/// During the countdown no policy is polled (both fighters are frozen);
/// once fighting, each tick polls P1 then P2 and advances the bout.
pub fn run_bout(bout: &mut Bout, p1: &mut Policy, p2: &mut Policy) -> BoutOutcome {
    while !bout.status().is_ended() {
        if bout.status() == BoutStatus::Countdown {
            bout.tick(&InputSignals::NONE, &InputSignals::NONE);
            continue;
        }
        let input1 = p1.decide(bout.p1(), bout.p2());
        let input2 = p2.decide(bout.p2(), bout.p1());
        bout.tick(&input1, &input2);
    }
    *bout.outcome().expect("ended bout has an outcome")
}

#[cfg(test)]
mod tests {
    use kumite_engine::{Facing, Winner, world::MATCH_FRAMES};

    use super::*;
    use crate::network::{BIAS_COUNT, HIDDEN_COUNT, INPUT_COUNT, OUTPUT_COUNT};

    fn spawn_pair() -> (Fighter, Fighter) {
        (
            Fighter::new(280.0, Facing::Right),
            Fighter::new(470.0, Facing::Left),
        )
    }

    #[test]
    fn test_zeroed_network_fires_nothing() {
        // Every sigmoid output is exactly 0.5 and the threshold is strict.
        let (p1, p2) = spawn_pair();
        let mut policy = Policy::Neural(Network::zeroed());
        assert_eq!(policy.decide(&p1, &p2), InputSignals::NONE);
    }

    #[test]
    fn test_output_ordinals_map_to_signals() {
        // Bias the MoveRight and Punch outputs high; only those fire.
        let mut biases = [0.0; BIAS_COUNT];
        biases[HIDDEN_COUNT + Action::MoveRight.index()] = 5.0;
        biases[HIDDEN_COUNT + Action::Punch.index()] = 5.0;
        let network = Network::from_parts(
            [[0.0; HIDDEN_COUNT]; INPUT_COUNT],
            [[0.0; OUTPUT_COUNT]; HIDDEN_COUNT],
            biases,
        );
        let (p1, p2) = spawn_pair();
        let mut policy = Policy::Neural(network);
        let signals = policy.decide(&p1, &p2);
        assert_eq!(
            signals,
            InputSignals {
                right: true,
                action1: true,
                ..InputSignals::NONE
            }
        );
    }

    #[test]
    fn test_human_policy_passes_device_state_through() {
        let shared = SharedInput::new();
        let mut policy = Policy::Human(shared.clone());
        let (p1, p2) = spawn_pair();
        assert_eq!(policy.decide(&p1, &p2), InputSignals::NONE);

        shared.set(InputSignals {
            up: true,
            ..InputSignals::NONE
        });
        assert!(policy.decide(&p1, &p2).up);
    }

    #[test]
    fn test_panicking_script_degrades_to_null_input() {
        let mut policy = ScriptPolicy::new(|_, _| panic!("bad script"));
        let (p1, p2) = spawn_pair();
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(|_| {}));
        let signals = policy.decide(&p1, &p2);
        std::panic::set_hook(previous);
        assert_eq!(signals, InputSignals::NONE);
        assert!(policy.take_fault());
        assert!(!policy.take_fault());
    }

    #[test]
    fn test_slow_script_degrades_to_null_input() {
        let mut policy = ScriptPolicy::with_budget(
            |_, _| {
                std::thread::sleep(Duration::from_millis(5));
                InputSignals {
                    action1: true,
                    ..InputSignals::NONE
                }
            },
            Duration::from_millis(1),
        );
        let (p1, p2) = spawn_pair();
        assert_eq!(policy.decide(&p1, &p2), InputSignals::NONE);
        assert!(policy.take_fault());
    }

    #[test]
    fn test_two_indifferent_networks_stall_to_a_draw() {
        // Two zeroed genomes at the canonical spawns: no output ever crosses
        // the threshold, nobody moves, and the bout times out untouched.
        let (p1, p2) = spawn_pair();
        let mut bout = Bout::headless(p1, p2);
        let outcome = run_bout(
            &mut bout,
            &mut Policy::Neural(Network::zeroed()),
            &mut Policy::Neural(Network::zeroed()),
        );
        assert_eq!(outcome.winner, Winner::Draw);
        assert_eq!(outcome.duration_frames, MATCH_FRAMES);
        assert_eq!(outcome.p1_health, 100.0);
        assert_eq!(outcome.p2_health, 100.0);
        assert_eq!(outcome.total_damage, 0.0);
    }
}
