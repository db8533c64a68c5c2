use anyhow::{Context, Result};
use bioswarm::manager::Manager;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Run bio-inspired drone swarm simulations.
#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    /// Directory holding `config.toml` and the run directories.
    #[arg(long)]
    sim_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Simulate new runs and export their trajectories.
    Create {
        #[arg(long, default_value_t = 1)]
        n_runs: usize,
    },

    /// Summarize the metrics of every run.
    Analyze,

    /// Remove every run and the analysis results.
    Clean,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::debug!("{args:#?}");

    let mgr = Manager::new(&args.sim_dir)
        .with_context(|| format!("failed to open simulation in {:?}", args.sim_dir))?;

    match args.command {
        Command::Create { n_runs } => {
            for _ in 0..n_runs {
                mgr.create_run().context("failed to create run")?;
            }
        }
        Command::Analyze => mgr.analyze_sim().context("failed to analyze simulation")?,
        Command::Clean => mgr.clean_sim().context("failed to clean simulation")?,
    }

    Ok(())
}
