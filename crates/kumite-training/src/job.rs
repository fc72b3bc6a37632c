//! Match jobs: the unit of work dispatched to evaluation workers.
//!
//! A job carries everything a worker needs to run one headless match:
//! independent deep copies of both networks and the spawn columns. Workers
//! never see the live population — snapshot in, fitness deltas out.

use rand::Rng;

use kumite_brain::{Genome, Network};
use kumite_engine::Winner;
use serde::Serialize;

/// Base spawn columns for the two fighters.
pub const SPAWN_X1: f32 = 280.0;
pub const SPAWN_X2: f32 = 470.0;
/// Uniform jitter applied to each spawn column per job.
pub const SPAWN_JITTER: f32 = 50.0;

/// A deep copy of the parts of a genome a worker needs.
#[derive(Debug, Clone)]
pub struct GenomeSnapshot {
    pub id: String,
    pub network: Network,
}

impl GenomeSnapshot {
    fn of(genome: &Genome) -> Self {
        Self {
            id: genome.id().to_owned(),
            network: genome.network().clone(),
        }
    }
}

/// One match's worth of work.
#[derive(Debug, Clone)]
pub struct MatchJob {
    pub job_id: usize,
    pub genome1: GenomeSnapshot,
    pub genome2: GenomeSnapshot,
    pub spawn1_x: f32,
    pub spawn2_x: f32,
}

/// What a finished match reports back.
///
/// Deltas, not absolute values: the evaluator never mutates genomes, only
/// the population coordinator applies these.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub job_id: usize,
    pub genome1_id: String,
    pub genome2_id: String,
    pub genome1_fitness_delta: f32,
    pub genome2_fitness_delta: f32,
    pub genome1_won: bool,
    pub genome2_won: bool,
    pub summary: MatchSummary,
}

impl MatchResult {
    /// The zero result recorded when a job's worker failed twice: no
    /// fitness, no wins, for either participant.
    #[must_use]
    pub fn forfeited(job: &MatchJob) -> Self {
        Self {
            job_id: job.job_id,
            genome1_id: job.genome1.id.clone(),
            genome2_id: job.genome2.id.clone(),
            genome1_fitness_delta: 0.0,
            genome2_fitness_delta: 0.0,
            genome1_won: false,
            genome2_won: false,
            summary: MatchSummary {
                winner: Winner::Draw,
                p1_health: 0.0,
                p2_health: 0.0,
                duration_frames: 0,
            },
        }
    }
}

/// Outcome digest surfaced to the embedding shell as a match event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchSummary {
    pub winner: Winner,
    pub p1_health: f32,
    pub p2_health: f32,
    pub duration_frames: u32,
}

/// Builds the generation's job list.
///
/// Consecutive genomes are paired `(0,1), (2,3), …`; an odd leftover fights
/// a uniformly random earlier genome. Spawn columns get per-job jitter so
/// matches don't all start from the identical position.
pub fn build_jobs<R>(genomes: &[Genome], rng: &mut R) -> Vec<MatchJob>
where
    R: Rng + ?Sized,
{
    let mut jobs = Vec::with_capacity(genomes.len().div_ceil(2));
    let mut index = 0;
    while index + 1 < genomes.len() {
        jobs.push(job_for(jobs.len(), &genomes[index], &genomes[index + 1], rng));
        index += 2;
    }
    if index < genomes.len() && index > 0 {
        let partner = rng.random_range(0..index);
        jobs.push(job_for(jobs.len(), &genomes[index], &genomes[partner], rng));
    }
    jobs
}

fn job_for<R>(job_id: usize, g1: &Genome, g2: &Genome, rng: &mut R) -> MatchJob
where
    R: Rng + ?Sized,
{
    MatchJob {
        job_id,
        genome1: GenomeSnapshot::of(g1),
        genome2: GenomeSnapshot::of(g2),
        spawn1_x: SPAWN_X1 + rng.random_range(-SPAWN_JITTER..=SPAWN_JITTER),
        spawn2_x: SPAWN_X2 + rng.random_range(-SPAWN_JITTER..=SPAWN_JITTER),
    }
}
