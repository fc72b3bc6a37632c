use std::path::PathBuf;

use crate::model::FighterModel;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct InspectArg {
    /// Fighter model to inspect
    model: PathBuf,
}

pub(crate) fn run(arg: &InspectArg) -> anyhow::Result<()> {
    let model = FighterModel::open(&arg.model)?;
    let genome = &model.genome;

    println!("Name:        {}", model.name);
    println!("Trained at:  {}", model.trained_at);
    println!("Genome id:   {}", genome.id);
    println!("Generation:  {}", genome.generation);
    println!("Fitness:     {:.3}", genome.fitness);
    println!("Matches won: {}", genome.matches_won);
    println!(
        "Shape:       {}-{}-{}",
        genome.architecture.input, genome.architecture.hidden, genome.architecture.output,
    );

    let weights: Vec<f32> = genome
        .network
        .input_weights
        .iter()
        .chain(&genome.network.output_weights)
        .flatten()
        .copied()
        .chain(genome.network.biases.iter().copied())
        .collect();
    if !weights.is_empty() {
        let min = weights.iter().copied().fold(f32::INFINITY, f32::min);
        let max = weights.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        #[expect(clippy::cast_precision_loss)]
        let mean_abs = weights.iter().map(|w| w.abs()).sum::<f32>() / weights.len() as f32;
        println!("Weights:     min {min:.3} / max {max:.3} / mean |w| {mean_abs:.3}");
    }

    // Flag payloads that would be rejected on import.
    match genome.to_genome() {
        Ok(_) => println!("Payload:     valid"),
        Err(err) => println!("Payload:     INVALID ({err})"),
    }

    Ok(())
}
