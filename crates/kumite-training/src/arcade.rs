//! Paced single-bout sessions for interactive embedders.
//!
//! Training workers run matches flat out, but an interactive shell (arcade
//! mode, a spectated exhibition bout) advances the simulation in steps of
//! `sim_speed` ticks per [`ArcadeSession::advance`] call, polling each
//! fighter's [`Policy`] along the way.

use kumite_brain::Policy;
use kumite_engine::{Bout, BoutOutcome, BoutStatus, InputSignals};

use crate::trainer::SimSpeedRange;

pub struct ArcadeSession {
    bout: Bout,
    p1: Policy,
    p2: Policy,
    sim_speed: u32,
}

impl ArcadeSession {
    /// Wraps a bout with its two policies at `sim_speed` ticks per advance.
    pub fn new(bout: Bout, p1: Policy, p2: Policy, sim_speed: u32) -> Result<Self, SimSpeedRange> {
        if sim_speed < 1 {
            return Err(SimSpeedRange {
                requested: sim_speed,
            });
        }
        Ok(Self {
            bout,
            p1,
            p2,
            sim_speed,
        })
    }

    #[must_use]
    pub fn bout(&self) -> &Bout {
        &self.bout
    }

    #[must_use]
    pub fn outcome(&self) -> Option<&BoutOutcome> {
        self.bout.outcome()
    }

    /// Advances up to `sim_speed` ticks. Returns the outcome once the bout
    /// has ended.
    pub fn advance(&mut self) -> Option<&BoutOutcome> {
        for _ in 0..self.sim_speed {
            match self.bout.status() {
                BoutStatus::Ended => break,
                BoutStatus::Countdown => {
                    self.bout.tick(&InputSignals::NONE, &InputSignals::NONE);
                }
                BoutStatus::Fighting => {
                    let input1 = self.p1.decide(self.bout.p1(), self.bout.p2());
                    let input2 = self.p2.decide(self.bout.p2(), self.bout.p1());
                    self.bout.tick(&input1, &input2);
                }
            }
        }
        self.bout.outcome()
    }
}

#[cfg(test)]
mod tests {
    use kumite_brain::Network;
    use kumite_engine::{Facing, Fighter, world::MATCH_FRAMES};

    use super::*;

    fn session(sim_speed: u32) -> Result<ArcadeSession, SimSpeedRange> {
        let bout = Bout::headless(
            Fighter::new(280.0, Facing::Right),
            Fighter::new(470.0, Facing::Left),
        );
        ArcadeSession::new(
            bout,
            Policy::Neural(Network::zeroed()),
            Policy::Neural(Network::zeroed()),
            sim_speed,
        )
    }

    #[test]
    fn test_zero_speed_is_rejected() {
        assert!(matches!(session(0), Err(SimSpeedRange { requested: 0 })));
    }

    #[test]
    fn test_advance_steps_sim_speed_ticks() {
        let mut session = session(4).unwrap();
        session.advance();
        assert_eq!(session.bout().timer_frames(), MATCH_FRAMES - 4);
    }

    #[test]
    fn test_session_runs_to_outcome() {
        let mut session = session(600).unwrap();
        let mut advances = 0;
        while session.advance().is_none() {
            advances += 1;
            assert!(advances < 20, "session never finished");
        }
        assert!(session.outcome().is_some());
    }
}
