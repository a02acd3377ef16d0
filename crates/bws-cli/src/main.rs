use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use commands::{
    generate::{self, GenerateArgs},
    methods::{self, MethodsArgs},
    score::{self, ScoreArgs},
    simulate::{self, SimulateArgs},
};
use config::BwsConfig;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

#[derive(Parser, Debug)]
#[command(name = "bws", version, about = "Best-worst scaling design and scoring toolkit")]
struct Cli {
    /// YAML file overriding design, scoring, column and simulation defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log at debug level unless BWS_LOG says otherwise.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a trial design from an item list.
    Generate(GenerateArgs),
    /// Score one or more response files.
    Score(ScoreArgs),
    /// Simulate participants with known preferences and check method accuracy.
    Simulate(SimulateArgs),
    /// List the available scoring methods.
    Methods(MethodsArgs),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("BWS_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = BwsConfig::load(cli.config.as_deref())?;
    match cli.command {
        Command::Generate(args) => generate::run(&args, &config),
        Command::Score(args) => score::run(&args, &config),
        Command::Simulate(args) => simulate::run(&args, &config),
        Command::Methods(args) => methods::run(&args),
    }
}
