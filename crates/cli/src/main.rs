mod args;
mod commands;
pub mod defaults;
mod printing;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};

use args::{AnnotateArgs, FitArgs, MetricsArgs, SimulateCrArgs, SimulateGlvArgs};
use commands::{annotate, fit, metrics, simulate_cr, simulate_glv};

/// Ribotherm: rRNA copy number and temperature in microbial communities
///
/// Simulates community assembly under temperature-dependent growth,
/// annotates OTU tables with rRNA operon copy numbers and fits the simulated
/// copy-number distribution to field data.
#[derive(Parser, Debug)]
#[command(name = "ribotherm")]
#[command(author, version, about = "rRNA copy number and temperature in microbial communities", long_about = None)]
struct Cli {
    /// Number of threads to use for parallel processing
    ///
    /// If not specified, defaults to the number of logical CPUs.
    #[arg(short = 't', long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate Lotka-Volterra communities and write the WMCN grid.
    ///
    /// Runs one ensemble per p value across temperatures and stores the mean
    /// WMCN per (Temperature, p).
    SimulateGlv(Box<SimulateGlvArgs>),

    /// Simulate consumer-resource communities and write mean WMGR.
    SimulateCr(Box<SimulateCrArgs>),

    /// Fit p to observed WMCN against a simulated grid by bootstrap.
    Fit(Box<FitArgs>),

    /// Assign rRNA copy numbers to OTUs from a reference table.
    Annotate(AnnotateArgs),

    /// Compute WMCN/WMGR per sample and add them to the metadata.
    Metrics(MetricsArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    match cli.command {
        Commands::SimulateGlv(args) => simulate_glv::simulate_glv(&args)?,
        Commands::SimulateCr(args) => simulate_cr::simulate_cr(&args)?,
        Commands::Fit(args) => fit::fit_p(&args)?,
        Commands::Annotate(args) => annotate::annotate(&args)?,
        Commands::Metrics(args) => metrics::compute_metrics(&args)?,
    }

    Ok(())
}
