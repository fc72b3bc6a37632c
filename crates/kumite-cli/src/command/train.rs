use std::path::PathBuf;

use chrono::Utc;
use rand::Rng as _;

use kumite_training::{
    EvolutionSeed, MutationMode, Trainer, TrainerEvent, TrainerSettings, WorkerPool,
};

use crate::model::FighterModel;

const DEFAULT_GENERATIONS: u32 = 100;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Generations to evolve
    #[arg(long, default_value_t = DEFAULT_GENERATIONS)]
    generations: u32,
    /// Population size
    #[arg(long, default_value_t = kumite_training::DEFAULT_POPULATION_SIZE)]
    population: usize,
    /// Worker threads (0 = hardware concurrency, capped at 8)
    #[arg(long, default_value_t = 0)]
    workers: usize,
    /// RNG seed for a reproducible run (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Fixed mutation rate; adaptive control if omitted
    #[arg(long)]
    mutation_rate: Option<f32>,
    /// Model name recorded in the output file
    #[arg(long, default_value = "champion")]
    name: String,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let seed = arg
        .seed
        .map_or_else(|| rand::rng().random(), EvolutionSeed::from_u64);
    let settings = TrainerSettings {
        population_size: arg.population,
        worker_count: if arg.workers == 0 {
            WorkerPool::default_worker_count()
        } else {
            arg.workers
        },
        mutation_mode: arg
            .mutation_rate
            .map_or(MutationMode::Adaptive, MutationMode::Fixed),
        ..TrainerSettings::default()
    };
    let worker_count = settings.worker_count;
    let mut trainer = Trainer::new(settings, seed);

    eprintln!(
        "Training {} genomes on {worker_count} workers for {} generations",
        arg.population, arg.generations,
    );

    for _ in 0..arg.generations {
        let Some(report) = trainer.run_generation() else {
            continue;
        };
        let decisive = trainer
            .drain_events()
            .iter()
            .filter(|event| {
                matches!(
                    event,
                    TrainerEvent::MatchCompleted(summary)
                        if summary.winner != kumite_engine::Winner::Draw
                )
            })
            .count();

        eprintln!("Generation #{}:", report.generation);
        eprintln!(
            "  Best: {} => {:.3} ({} wins)",
            report.best_id, report.best_fitness, report.matches_won_by_best,
        );
        eprintln!(
            "  Fitness: worst {:.3} / mean {:.3} / best {:.3} (spread {:.3})",
            report.fitness.worst,
            report.fitness.mean,
            report.fitness.best,
            report.fitness.spread(),
        );
        eprintln!("  Mutation rate: {:.3}", report.mutation_rate);
        eprintln!("  Decisive matches: {decisive}");
    }

    eprintln!("Training completed.");
    eprintln!("  Best fitness ever: {:.3}", trainer.state().best_fitness());

    let payload = trainer.export_best_genome()?;
    let model = FighterModel {
        name: arg.name.clone(),
        trained_at: Utc::now(),
        genome: payload,
    };
    let path = arg
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}.json", arg.name)));
    model.save(&path)?;

    eprintln!();
    eprintln!("Model saved successfully");
    eprintln!("  Path: {}", path.display());
    eprintln!("  Name: {}", model.name);
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Final fitness: {:.3}", model.genome.fitness);

    Ok(())
}
