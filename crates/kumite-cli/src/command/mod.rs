use clap::{Parser, Subcommand};

use self::{duel::DuelArg, inspect::InspectArg, train::TrainArg};

mod duel;
mod inspect;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Train a population of fighters with the genetic algorithm
    Train(#[clap(flatten)] TrainArg),
    /// Run a headless exhibition bout between two trained fighters
    Duel(#[clap(flatten)] DuelArg),
    /// Show metadata and weight statistics of a trained fighter
    Inspect(#[clap(flatten)] InspectArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Duel(arg) => duel::run(&arg)?,
        Mode::Inspect(arg) => inspect::run(&arg)?,
    }
    Ok(())
}
