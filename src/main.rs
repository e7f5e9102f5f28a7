use clap::{Parser, Subcommand};
use std::process;
use tracing::error;

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a combined word list from a build plan
    Build(cmd::build::BuildArgs),
    /// Merge a source list into a target list
    Merge(cmd::merge::MergeArgs),
    /// Cap and re-rank the bigram rows of a list
    Filter(cmd::filter::FilterArgs),
    /// Compile a list into a binary keyboard dictionary
    Compile(cmd::compile::CompileArgs),
    /// Summarize a combined list
    Stats(cmd::stats::StatsArgs),
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Build(args) => cmd::build::run(args),
        Commands::Merge(args) => cmd::merge::run(args),
        Commands::Filter(args) => cmd::filter::run(args),
        Commands::Compile(args) => cmd::compile::run(args),
        Commands::Stats(args) => cmd::stats::run(args),
    };
    if let Err(err) = result {
        error!("❌ {}", err);
        process::exit(1);
    }
}
