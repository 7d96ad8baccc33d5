//! Shared default values for command-line arguments.

pub const GLV_GRID_OUTPUT: &str = "simulated_wmcn.csv";
pub const CR_OUTPUT: &str = "simulated_wmgr.csv";
pub const ANNOTATED_OUTPUT: &str = "annotated_abundance.csv";
pub const METADATA_OUTPUT: &str = "metadata_with_metrics.csv";

pub const FIT_REPLICATES: usize = 100;
pub const FIT_COLUMN: &str = "WMCN";
