//! Evolution of fighting-game controllers by genetic algorithm.
//!
//! This crate turns the passive combat engine and the neural controllers
//! into a training system: it schedules matches within a generation, fans
//! them out to a worker pool, aggregates fitness, and breeds the next
//! generation.
//!
//! # How Training Works
//!
//! 1. **Population** - a fixed-size set of genomes with random networks
//! 2. **Pairing** - consecutive genomes are matched up; every genome fights
//!    once per generation (the odd one out fights a random earlier genome)
//! 3. **Evaluation** - workers run each match headless and return fitness
//!    deltas (per-tick shaping plus end-of-match awards) and win flags
//! 4. **Merge** - the coordinator walks the job list and applies deltas to
//!    the live population by genome id
//! 5. **Selection & Reproduction** - elitism for the top two, uniform
//!    parent choice from the top quarter, uniform crossover, mutation at
//!    the current rate
//! 6. **Repeat** - the mutation rate adapts per generation (decay, plateau
//!    spikes, periodic oscillation)
//!
//! # Architecture
//!
//! ```text
//! Trainer (commands in, events out)
//!     ↓ pairs genomes into
//! MatchJobs (deep-copied snapshots)
//!     ↓ dispatched to
//! WorkerPool (ready tracking, fault containment)
//!     ↓ each worker runs
//! runner::run_match (headless Bout + Neural policies)
//!     ↓ results merged into
//! Population  →  evolve()  →  next generation
//! ```
//!
//! # Determinism
//!
//! A run is fully determined by its [`EvolutionSeed`]: population
//! initialization, pairings, spawn jitter, and the genetic operators all
//! draw from one seeded generator, and the simulation itself contains no
//! randomness. Parallel result arrival order does not matter because the
//! merge walks the job list, not the result list.
//!
//! # Concurrency model
//!
//! The generation loop is single-threaded; parallelism exists only at match
//! granularity inside [`WorkerPool`]. Workers receive deep-copied job
//! snapshots and never touch shared state. The coordinator blocks at the
//! batch barrier, so generation `k + 1` cannot start until every job of
//! generation `k` has been merged. Pause is observed between batches;
//! in-flight matches always finish (they are bounded at 5400 ticks).

pub use self::{
    arcade::ArcadeSession,
    job::{GenomeSnapshot, MatchJob, MatchResult, MatchSummary, build_jobs},
    mutation::MutationSchedule,
    pool::{MAX_WORKERS, WorkerPool},
    population::{DEFAULT_POPULATION_SIZE, ELITE_COUNT, Population},
    runner::run_match,
    seed::EvolutionSeed,
    trainer::{
        EvolutionState, GenerationReport, MutationMode, NoGenomeYet, SimSpeedRange, Trainer,
        TrainerEvent, TrainerSettings,
    },
};

pub mod arcade;
pub mod job;
pub mod mutation;
pub mod pool;
pub mod population;
pub mod runner;
pub mod seed;
pub mod trainer;
