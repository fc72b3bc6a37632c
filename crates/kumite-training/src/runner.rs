//! Headless match evaluation: one job in, one result out.
//!
//! Workers call [`run_match`] with a job snapshot; it reconstructs fighters
//! and neural policies, drives the bout to completion at unbounded speed
//! (no frame pacing), and folds the per-tick shaping each fighter
//! accumulated together with the end-of-match awards into the two fitness
//! deltas.

use kumite_brain::{Policy, run_bout};
use kumite_engine::{
    Bout, BoutOutcome, EndReason, Facing, Fighter, Winner,
    shaping::{
        self, KO_WIN_BONUS, STALEMATE_DAMAGE_THRESHOLD, STALEMATE_PENALTY, TIMEOUT_WIN_BONUS,
    },
};

use crate::job::{MatchJob, MatchResult, MatchSummary};

/// Runs one headless match to completion.
#[must_use]
pub fn run_match(job: &MatchJob) -> MatchResult {
    let p1 = Fighter::new(job.spawn1_x, Facing::toward(job.spawn2_x - job.spawn1_x));
    let p2 = Fighter::new(job.spawn2_x, Facing::toward(job.spawn1_x - job.spawn2_x));
    let mut bout = Bout::headless(p1, p2);

    let mut policy1 = Policy::Neural(job.genome1.network.clone());
    let mut policy2 = Policy::Neural(job.genome2.network.clone());
    let outcome = run_bout(&mut bout, &mut policy1, &mut policy2);

    let awards = settle_awards(
        &outcome,
        bout.p1().shaping_reward(),
        bout.p1().damage_dealt(),
        bout.p2().shaping_reward(),
        bout.p2().damage_dealt(),
    );

    MatchResult {
        job_id: job.job_id,
        genome1_id: job.genome1.id.clone(),
        genome2_id: job.genome2.id.clone(),
        genome1_fitness_delta: awards.delta1,
        genome2_fitness_delta: awards.delta2,
        genome1_won: awards.won1,
        genome2_won: awards.won2,
        summary: MatchSummary {
            winner: outcome.winner,
            p1_health: outcome.p1_health,
            p2_health: outcome.p2_health,
            duration_frames: outcome.duration_frames,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Awards {
    delta1: f32,
    delta2: f32,
    won1: bool,
    won2: bool,
}

/// Folds shaping totals and the end-of-match awards into fitness deltas.
///
/// - damage dealt and remaining health always pay out
/// - a knockout pays the KO bonus, a health lead at timeout the smaller
///   timeout bonus; either counts as a win
/// - a timeout that produced almost no damage is a stalemate: both sides
///   are penalized, win bonuses included (a "win" in a stalemate is still
///   a failure to fight)
fn settle_awards(
    outcome: &BoutOutcome,
    p1_shaping: f32,
    p1_damage: f32,
    p2_shaping: f32,
    p2_damage: f32,
) -> Awards {
    let mut awards = Awards {
        delta1: p1_shaping + shaping::end_of_match_base(outcome.p1_health, p1_damage),
        delta2: p2_shaping + shaping::end_of_match_base(outcome.p2_health, p2_damage),
        won1: false,
        won2: false,
    };

    let win_bonus = match outcome.ended_by {
        EndReason::Knockout => KO_WIN_BONUS,
        EndReason::Timeout => TIMEOUT_WIN_BONUS,
    };
    match outcome.winner {
        Winner::P1 => {
            awards.delta1 += win_bonus;
            awards.won1 = true;
        }
        Winner::P2 => {
            awards.delta2 += win_bonus;
            awards.won2 = true;
        }
        Winner::Draw => {}
    }

    if outcome.ended_by == EndReason::Timeout && outcome.total_damage < STALEMATE_DAMAGE_THRESHOLD {
        awards.delta1 -= STALEMATE_PENALTY;
        awards.delta2 -= STALEMATE_PENALTY;
    }

    awards
}

#[cfg(test)]
mod tests {
    use kumite_brain::{GenomePayload, NetworkPayload, import_genome};
    use kumite_engine::world::MATCH_FRAMES;

    use crate::job::GenomeSnapshot;

    use super::*;

    fn outcome(winner: Winner, ended_by: EndReason, healths: (f32, f32), damage: f32) -> BoutOutcome {
        BoutOutcome {
            winner,
            ended_by,
            p1_health: healths.0,
            p2_health: healths.1,
            duration_frames: 100,
            total_damage: damage,
        }
    }

    #[test]
    fn test_ko_win_pays_the_big_bonus() {
        let awards = settle_awards(
            &outcome(Winner::P1, EndReason::Knockout, (55.0, 0.0), 145.0),
            10.0,
            100.0,
            5.0,
            45.0,
        );
        // shaping + 2*damage + 2.5*health + 300
        assert!((awards.delta1 - (10.0 + 200.0 + 137.5 + 300.0)).abs() < 1e-3);
        assert!((awards.delta2 - (5.0 + 90.0)).abs() < 1e-3);
        assert!(awards.won1);
        assert!(!awards.won2);
    }

    #[test]
    fn test_timeout_health_lead_pays_the_small_bonus() {
        let awards = settle_awards(
            &outcome(Winner::P2, EndReason::Timeout, (40.0, 70.0), 90.0),
            0.0,
            30.0,
            0.0,
            60.0,
        );
        assert!(awards.won2);
        assert!((awards.delta2 - (120.0 + 175.0 + TIMEOUT_WIN_BONUS)).abs() < 1e-3);
    }

    #[test]
    fn test_low_damage_timeout_is_a_stalemate_for_both() {
        let awards = settle_awards(
            &outcome(Winner::Draw, EndReason::Timeout, (100.0, 100.0), 0.0),
            0.0,
            0.0,
            0.0,
            0.0,
        );
        assert!((awards.delta1 - (250.0 - STALEMATE_PENALTY)).abs() < 1e-3);
        assert!((awards.delta2 - (250.0 - STALEMATE_PENALTY)).abs() < 1e-3);
        assert!(!awards.won1 && !awards.won2);
    }

    fn snapshot_from_payload(id: &str, network: NetworkPayload) -> GenomeSnapshot {
        let payload = GenomePayload {
            id: id.to_owned(),
            fitness: 0.0,
            matches_won: 0,
            generation: 0,
            network,
            architecture: kumite_brain::Architecture::compiled_in(),
        };
        let json = serde_json::to_string(&payload).unwrap();
        let genome = import_genome(&json).unwrap();
        GenomeSnapshot {
            id: genome.id().to_owned(),
            network: genome.network().clone(),
        }
    }

    fn zeroed_network_payload() -> NetworkPayload {
        NetworkPayload {
            input_weights: vec![vec![0.0; 13]; 9],
            output_weights: vec![vec![0.0; 8]; 13],
            biases: vec![0.0; 21],
        }
    }

    /// A network whose only drive is a huge bias on one output.
    fn biased_network_payload(output_ordinal: usize) -> NetworkPayload {
        let mut payload = zeroed_network_payload();
        payload.biases[13 + output_ordinal] = 5.0;
        payload
    }

    #[test]
    fn test_indifferent_genomes_stalemate_and_get_penalized() {
        // Two zeroed networks at the canonical spawns: every output sits at
        // 0.5, nothing fires, the match times out untouched and both sides
        // eat the stalemate penalty on top of their passive shaping.
        let job = MatchJob {
            job_id: 0,
            genome1: snapshot_from_payload("a", zeroed_network_payload()),
            genome2: snapshot_from_payload("b", zeroed_network_payload()),
            spawn1_x: 280.0,
            spawn2_x: 470.0,
        };
        let result = run_match(&job);

        assert_eq!(result.summary.winner, Winner::Draw);
        assert_eq!(result.summary.duration_frames, MATCH_FRAMES);
        assert_eq!(result.summary.p1_health, 100.0);
        assert_eq!(result.summary.p2_health, 100.0);
        assert!(!result.genome1_won && !result.genome2_won);

        // Per tick both earn 0.055 (two proximity bands, facing, center,
        // minus the tick cost); end awards add 250 health and subtract the
        // 100 stalemate penalty.
        #[expect(clippy::cast_precision_loss)]
        let expected = 0.055 * MATCH_FRAMES as f32 + 250.0 - 100.0;
        assert!((result.genome1_fitness_delta - expected).abs() < 1.0);
        assert!((result.genome2_fitness_delta - expected).abs() < 1.0);
        assert!(
            (result.genome1_fitness_delta - result.genome2_fitness_delta).abs() < 1e-3,
            "symmetric spawns must score symmetrically"
        );
    }

    #[test]
    fn test_relentless_puncher_knocks_out_a_passive_opponent() {
        // The aggressor only ever punches; pinned against the right wall,
        // the passive victim cannot be knocked out of reach, so every swing
        // lands and the match ends by knockout with the full KO bonus.
        let job = MatchJob {
            job_id: 3,
            genome1: snapshot_from_payload("puncher", biased_network_payload(5)),
            genome2: snapshot_from_payload("victim", zeroed_network_payload()),
            spawn1_x: 690.0,
            spawn2_x: 745.0,
        };
        let result = run_match(&job);

        assert!(result.genome1_won);
        assert!(!result.genome2_won);
        assert_eq!(result.summary.winner, Winner::P1);
        assert_eq!(result.summary.p2_health, 0.0);
        assert!(result.summary.duration_frames < MATCH_FRAMES);
        // 2*100 damage + 2.5*100 health + 300 KO, plus shaping.
        assert!(result.genome1_fitness_delta > 750.0);
    }

    #[test]
    fn test_forfeited_result_is_all_zero() {
        let job = MatchJob {
            job_id: 9,
            genome1: snapshot_from_payload("a", zeroed_network_payload()),
            genome2: snapshot_from_payload("b", zeroed_network_payload()),
            spawn1_x: 280.0,
            spawn2_x: 470.0,
        };
        let result = MatchResult::forfeited(&job);
        assert_eq!(result.job_id, 9);
        assert_eq!(result.genome1_fitness_delta, 0.0);
        assert_eq!(result.genome2_fitness_delta, 0.0);
        assert!(!result.genome1_won && !result.genome2_won);
    }
}
