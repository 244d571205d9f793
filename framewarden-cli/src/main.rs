//! Framewarden command-line tool.
//!
//! Two subcommands:
//! - `probe` - classify the host device and report the quality
//!   configuration a session would start with
//! - `simulate` - drive the control loop with a synthetic workload and
//!   print quality transitions as they happen

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "framewarden",
    version,
    about = "Adaptive rendering-quality control, tuned to the device it runs on"
)]
struct Cli {
    /// Increase log verbosity (debug-level tracing).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify this host and show the starting quality configuration.
    Probe(commands::probe::ProbeArgs),

    /// Run a synthetic workload through the control loop.
    Simulate(commands::simulate::SimulateArgs),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Probe(args) => commands::probe::run(args),
        Command::Simulate(args) => commands::simulate::run(args),
    };

    if let Err(error) = result {
        eprintln!("Error: {}", error);
        std::process::exit(1);
    }
}
