use clap::Args;
use std::path::PathBuf;

use crate::defaults;

#[derive(Args, Debug)]
pub struct SimulateGlvArgs {
    /// JSON configuration file (missing fields use the defaults)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output grid CSV (Temperature,p,WMCN)
    #[arg(short, long, default_value = defaults::GLV_GRID_OUTPUT)]
    pub output: PathBuf,

    /// Comma-separated geometric parameters to sweep
    #[arg(short, long, value_delimiter = ',', conflicts_with = "p_range")]
    pub p_values: Vec<f64>,

    /// Sweep p over START END STEP (inclusive)
    #[arg(long, num_args = 3, value_names = ["START", "END", "STEP"])]
    pub p_range: Option<Vec<f64>>,

    /// Mean relative abundance per copy-number class, per p and temperature
    #[arg(long)]
    pub classes: Option<PathBuf>,

    /// Number of species per community
    #[arg(short = 'n', long)]
    pub species: Option<usize>,

    /// Number of trials per p
    #[arg(long)]
    pub trials: Option<usize>,

    /// Integration time in hours
    #[arg(long)]
    pub duration: Option<f64>,

    /// Per-capita death rate
    #[arg(long)]
    pub death_rate: Option<f64>,

    /// Random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Args, Debug)]
pub struct SimulateCrArgs {
    /// JSON configuration file (missing fields use the defaults)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output CSV (Supply,Temperature,WMGR)
    #[arg(short, long, default_value = defaults::CR_OUTPUT)]
    pub output: PathBuf,

    /// Number of species
    #[arg(short = 'n', long)]
    pub species: Option<usize>,

    /// Number of resources
    #[arg(short, long)]
    pub resources: Option<usize>,

    /// Number of trials
    #[arg(long)]
    pub trials: Option<usize>,

    /// Integration time in hours
    #[arg(long)]
    pub duration: Option<f64>,

    /// Random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Args, Debug)]
pub struct FitArgs {
    /// Simulated grid CSV (Temperature,p,WMCN)
    #[arg(short, long)]
    pub grid: PathBuf,

    /// Sample metadata CSV with Temperature and the observed metric
    #[arg(short, long)]
    pub metadata: PathBuf,

    /// Metadata column holding the observed WMCN
    #[arg(long, default_value = defaults::FIT_COLUMN)]
    pub column: String,

    /// Keep only samples whose id contains this text
    #[arg(long)]
    pub sample_contains: Option<String>,

    /// Keep only samples where COLUMN equals VALUE (repeatable)
    #[arg(long, value_name = "COLUMN=VALUE")]
    pub filter: Vec<String>,

    /// Number of bootstrap replicates
    #[arg(short, long, default_value_t = defaults::FIT_REPLICATES)]
    pub replicates: usize,

    /// Draws per replicate (default: number of observations)
    #[arg(long)]
    pub sample_size: Option<usize>,

    /// Comma-separated candidate p values (default: every p in the grid)
    #[arg(long, value_delimiter = ',')]
    pub candidates: Vec<f64>,

    /// Random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the fitted curve (observed vs predicted WMCN per sample)
    #[arg(long)]
    pub curve: Option<PathBuf>,

    /// Write the fit result as JSON
    #[arg(long)]
    pub json: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct AnnotateArgs {
    /// Reference table CSV (taxid,rank,name,mean)
    #[arg(short, long)]
    pub reference: PathBuf,

    /// Abundance table CSV
    #[arg(short, long)]
    pub abundance: PathBuf,

    /// Output annotated abundance table
    #[arg(short, long, default_value = defaults::ANNOTATED_OUTPUT)]
    pub output: PathBuf,

    /// Write unresolved OTUs with their fallback codes
    #[arg(long)]
    pub unresolved: Option<PathBuf>,

    /// Skip the species rank during lookup
    #[arg(long)]
    pub no_species: bool,
}

#[derive(Args, Debug)]
pub struct MetricsArgs {
    /// Annotated abundance table CSV
    #[arg(short, long)]
    pub abundance: PathBuf,

    /// Sample metadata CSV
    #[arg(short, long)]
    pub metadata: PathBuf,

    /// Output metadata with metric columns
    #[arg(short, long, default_value = defaults::METADATA_OUTPUT)]
    pub output: PathBuf,
}
