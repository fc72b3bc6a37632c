//! The training coordinator: generations in, evolved populations out.
//!
//! [`Trainer`] owns the live population, the worker pool, the seeded RNG,
//! and the evolution bookkeeping. One [`Trainer::run_generation`] call is
//! one full cycle: pair the population into jobs, fan the jobs out to the
//! pool, merge the fitness deltas back in (walking the job list, so the
//! order deltas land in is deterministic regardless of result arrival
//! order), then select, reproduce, and install the next generation.
//!
//! The embedding shell talks to the trainer through commands (pause/resume,
//! reset, mutation-rate and sim-speed settings, genome import/export) and
//! reads back queued [`TrainerEvent`]s. Pause is observed between batches
//! only: an in-flight generation always completes, which bounds cancellation
//! latency at one batch.
//!
//! The best genome ever seen is kept as a deep-copied snapshot, replaced
//! wholesale when beaten — readers never observe a half-written value.

use std::collections::{HashMap, VecDeque};

use arrayvec::ArrayVec;
use rand_pcg::Pcg32;

use kumite_brain::{Genome, GenomePayload, ImportError, export_genome, import_genome};
use kumite_stats::FitnessSummary;

use crate::{
    job::{self, MatchJob, MatchResult, MatchSummary},
    mutation::MutationSchedule,
    pool::WorkerPool,
    population::{DEFAULT_POPULATION_SIZE, Population},
    seed::EvolutionSeed,
};

/// Plateau detection looks at this many recent best-fitness values.
pub const RECENT_BEST_LEN: usize = 10;
/// Fitness history entries surfaced to the shell.
pub const FITNESS_HISTORY_LEN: usize = 20;

/// How the per-generation mutation rate is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MutationMode {
    /// Decay + plateau detection + oscillation via [`MutationSchedule`].
    Adaptive,
    /// A fixed rate in `[0, 1]`.
    Fixed(f32),
}

#[derive(Debug, Clone)]
pub struct TrainerSettings {
    pub population_size: usize,
    pub worker_count: usize,
    pub mutation_mode: MutationMode,
    pub schedule: MutationSchedule,
    pub sim_speed: u32,
}

impl Default for TrainerSettings {
    fn default() -> Self {
        Self {
            population_size: DEFAULT_POPULATION_SIZE,
            worker_count: WorkerPool::default_worker_count(),
            mutation_mode: MutationMode::Adaptive,
            schedule: MutationSchedule::default(),
            sim_speed: 1,
        }
    }
}

/// Requested simulation speed is below the minimum of 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("simulation speed must be at least 1, got {requested}")]
pub struct SimSpeedRange {
    pub requested: u32,
}

/// Export was requested before any generation completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("no genome has been trained yet")]
pub struct NoGenomeYet;

/// Evolution bookkeeping carried across generations.
#[derive(Debug, Clone)]
pub struct EvolutionState {
    generation: u32,
    best_fitness: f32,
    recent_best: ArrayVec<f32, RECENT_BEST_LEN>,
    current_mutation_rate: f32,
    fitness_history: ArrayVec<f32, FITNESS_HISTORY_LEN>,
}

impl EvolutionState {
    fn new(initial_rate: f32) -> Self {
        Self {
            generation: 1,
            best_fitness: f32::MIN,
            recent_best: ArrayVec::new(),
            current_mutation_rate: initial_rate,
            fitness_history: ArrayVec::new(),
        }
    }

    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Best fitness ever observed across the run.
    #[must_use]
    pub fn best_fitness(&self) -> f32 {
        self.best_fitness
    }

    #[must_use]
    pub fn current_mutation_rate(&self) -> f32 {
        self.current_mutation_rate
    }

    /// Recent per-generation best-fitness values, oldest first.
    #[must_use]
    pub fn recent_best(&self) -> &[f32] {
        &self.recent_best
    }

    #[must_use]
    pub fn fitness_history(&self) -> &[f32] {
        &self.fitness_history
    }

    fn record_generation_best(&mut self, best: f32) {
        push_bounded(&mut self.recent_best, best);
        push_bounded(&mut self.fitness_history, best);
        if best > self.best_fitness {
            self.best_fitness = best;
        }
    }
}

fn push_bounded<const N: usize>(buffer: &mut ArrayVec<f32, N>, value: f32) {
    if buffer.is_full() {
        buffer.remove(0);
    }
    buffer.push(value);
}

/// Events queued for the embedding shell.
#[derive(Debug, Clone, PartialEq)]
pub enum TrainerEvent {
    GenerationCompleted {
        generation: u32,
        best_fitness: f32,
        mutation_rate: f32,
    },
    MatchCompleted(MatchSummary),
    FitnessUpdated {
        history: Vec<f32>,
    },
}

/// What one completed generation looked like.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub generation: u32,
    pub best_id: String,
    pub best_fitness: f32,
    pub matches_won_by_best: u32,
    pub mutation_rate: f32,
    pub fitness: FitnessSummary,
}

pub struct Trainer {
    settings: TrainerSettings,
    population: Population,
    pool: WorkerPool,
    rng: Pcg32,
    state: EvolutionState,
    best_trained: Option<Genome>,
    paused: bool,
    events: VecDeque<TrainerEvent>,
}

impl Trainer {
    /// A trainer over a fresh random population.
    ///
    /// Population size is clamped to at least 2 (a generation needs a pair).
    #[must_use]
    pub fn new(settings: TrainerSettings, seed: EvolutionSeed) -> Self {
        let mut rng = seed.rng();
        let population = Population::random(settings.population_size.max(2), &mut rng);
        let pool = WorkerPool::new(settings.worker_count);
        let initial_rate = match settings.mutation_mode {
            MutationMode::Adaptive => settings.schedule.init,
            MutationMode::Fixed(rate) => rate,
        };
        Self {
            settings,
            population,
            pool,
            rng,
            state: EvolutionState::new(initial_rate),
            best_trained: None,
            paused: false,
            events: VecDeque::new(),
        }
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    #[must_use]
    pub fn state(&self) -> &EvolutionState {
        &self.state
    }

    /// The best-ever genome snapshot, if a generation has completed.
    #[must_use]
    pub fn best_trained(&self) -> Option<&Genome> {
        self.best_trained.as_ref()
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    #[must_use]
    pub fn sim_speed(&self) -> u32 {
        self.settings.sim_speed
    }

    pub fn set_sim_speed(&mut self, sim_speed: u32) -> Result<(), SimSpeedRange> {
        if sim_speed < 1 {
            return Err(SimSpeedRange {
                requested: sim_speed,
            });
        }
        self.settings.sim_speed = sim_speed;
        Ok(())
    }

    /// Switches between adaptive control and a fixed rate (clamped to
    /// `[0, 1]`).
    pub fn set_mutation_rate(&mut self, mode: MutationMode) {
        self.settings.mutation_mode = match mode {
            MutationMode::Fixed(rate) => MutationMode::Fixed(rate.clamp(0.0, 1.0)),
            MutationMode::Adaptive => MutationMode::Adaptive,
        };
    }

    /// Replaces the population with a fresh random one and clears run
    /// bookkeeping. The best-genome snapshot survives unless `clear_best`.
    pub fn reset_population(&mut self, clear_best: bool) {
        self.population = Population::random(self.settings.population_size.max(2), &mut self.rng);
        let best_fitness = self.state.best_fitness;
        self.state = EvolutionState::new(self.state.current_mutation_rate);
        if clear_best {
            self.best_trained = None;
        } else {
            self.state.best_fitness = best_fitness;
        }
    }

    /// Validates and installs a serialized genome: it becomes the
    /// best-trained snapshot and replaces the worst member of the live
    /// population. On any error both are left untouched.
    pub fn import_genome(&mut self, json: &str) -> Result<(), ImportError> {
        let genome = import_genome(json)?;
        self.best_trained = Some(genome.clone());
        self.population.replace_worst(genome);
        Ok(())
    }

    pub fn export_best_genome(&self) -> Result<GenomePayload, NoGenomeYet> {
        self.best_trained
            .as_ref()
            .map(|genome| export_genome(genome, self.state.generation))
            .ok_or(NoGenomeYet)
    }

    /// Drains queued events, oldest first.
    pub fn drain_events(&mut self) -> Vec<TrainerEvent> {
        self.events.drain(..).collect()
    }

    /// Runs one full generation: evaluate, merge, evolve.
    ///
    /// Returns `None` without doing any work while paused.
    pub fn run_generation(&mut self) -> Option<GenerationReport> {
        if self.paused {
            return None;
        }
        let jobs = job::build_jobs(self.population.genomes(), &mut self.rng);
        let results = self.pool.evaluate(&jobs);
        merge_results(&mut self.population, &jobs, results, &mut self.events);
        Some(self.evolve_step())
    }

    fn evolve_step(&mut self) -> GenerationReport {
        self.population.sort_by_fitness();
        let generation = self.population.generation();
        let best = &self.population.genomes()[0];
        let best_fitness = best.fitness();

        if best_fitness > self.state.best_fitness || self.best_trained.is_none() {
            self.best_trained = Some(best.clone());
        }
        self.state.record_generation_best(best_fitness);

        let mutation_rate = match self.settings.mutation_mode {
            MutationMode::Adaptive => self
                .settings
                .schedule
                .rate_for(generation, self.state.recent_best()),
            MutationMode::Fixed(rate) => rate,
        };
        self.state.current_mutation_rate = mutation_rate;

        let report = GenerationReport {
            generation,
            best_id: best.id().to_owned(),
            best_fitness,
            matches_won_by_best: best.matches_won(),
            mutation_rate,
            fitness: self
                .population
                .fitness_summary()
                .expect("population is never empty"),
        };

        self.events.push_back(TrainerEvent::GenerationCompleted {
            generation,
            best_fitness,
            mutation_rate,
        });
        self.events.push_back(TrainerEvent::FitnessUpdated {
            history: self.state.fitness_history().to_vec(),
        });

        self.population = self.population.evolve(mutation_rate, &mut self.rng);
        self.state.generation = self.population.generation();
        report
    }
}

/// Applies match results to the live population.
///
/// Walks the job list (not the result list) so the order deltas are applied
/// in is deterministic; results whose genome ids no longer match a live
/// genome (e.g. the population was swapped mid-flight) are discarded.
fn merge_results(
    population: &mut Population,
    jobs: &[MatchJob],
    results: Vec<MatchResult>,
    events: &mut VecDeque<TrainerEvent>,
) {
    let mut by_job: HashMap<usize, MatchResult> =
        results.into_iter().map(|r| (r.job_id, r)).collect();
    for job in jobs {
        let Some(result) = by_job.remove(&job.job_id) else {
            continue;
        };
        if let Some(genome) = population.genome_mut(&result.genome1_id) {
            genome.add_fitness(result.genome1_fitness_delta);
            if result.genome1_won {
                genome.record_win();
            }
        }
        if let Some(genome) = population.genome_mut(&result.genome2_id) {
            genome.add_fitness(result.genome2_fitness_delta);
            if result.genome2_won {
                genome.record_win();
            }
        }
        events.push_back(TrainerEvent::MatchCompleted(result.summary));
    }
}
