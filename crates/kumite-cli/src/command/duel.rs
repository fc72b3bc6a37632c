use std::path::PathBuf;

use anyhow::Context as _;
use serde::Serialize;

use kumite_brain::Policy;
use kumite_engine::{Bout, BoutOutcome, Facing, Fighter, Winner};
use kumite_training::ArcadeSession;

use crate::model::FighterModel;

const SPAWN_X1: f32 = 280.0;
const SPAWN_X2: f32 = 470.0;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct DuelArg {
    /// Fighter model for player 1
    p1: PathBuf,
    /// Fighter model for player 2
    p2: PathBuf,
    /// Simulation ticks advanced per step
    #[arg(long, default_value_t = 1)]
    sim_speed: u32,
    /// Skip the pre-fight countdown
    #[arg(long)]
    headless: bool,
    /// Print the outcome as JSON on stdout
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct DuelReport<'a> {
    p1: &'a str,
    p2: &'a str,
    outcome: BoutOutcome,
}

pub(crate) fn run(arg: &DuelArg) -> anyhow::Result<()> {
    let model1 = FighterModel::open(&arg.p1)?;
    let model2 = FighterModel::open(&arg.p2)?;
    let genome1 = model1
        .genome
        .to_genome()
        .with_context(|| format!("Invalid genome in {}", arg.p1.display()))?;
    let genome2 = model2
        .genome
        .to_genome()
        .with_context(|| format!("Invalid genome in {}", arg.p2.display()))?;

    let p1 = Fighter::new(SPAWN_X1, Facing::Right);
    let p2 = Fighter::new(SPAWN_X2, Facing::Left);
    let bout = if arg.headless {
        Bout::headless(p1, p2)
    } else {
        Bout::new(p1, p2)
    };
    let mut session = ArcadeSession::new(
        bout,
        Policy::Neural(genome1.network().clone()),
        Policy::Neural(genome2.network().clone()),
        arg.sim_speed,
    )?;

    eprintln!("{} vs {}", model1.name, model2.name);
    let outcome = loop {
        if let Some(outcome) = session.advance() {
            break *outcome;
        }
    };

    let winner_name = match outcome.winner {
        Winner::P1 => Some(&model1.name),
        Winner::P2 => Some(&model2.name),
        Winner::Draw => None,
    };
    match winner_name {
        Some(name) => eprintln!("Winner: {name} ({:?})", outcome.ended_by),
        None => eprintln!("Draw ({:?})", outcome.ended_by),
    }
    eprintln!(
        "  Health: {:.1} vs {:.1}  |  {} frames  |  {:.1} total damage",
        outcome.p1_health, outcome.p2_health, outcome.duration_frames, outcome.total_damage,
    );

    if arg.json {
        let report = DuelReport {
            p1: &model1.name,
            p2: &model2.name,
            outcome,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
