//! # Analysis Crate
//!
//! The empirical side of the copy-number study: assigning rRNA operon copy
//! numbers to classified OTUs from a reference table, and computing
//! abundance-weighted community metrics (WMCN, WMGR) per sample.

pub mod community;
pub mod errors;
pub mod io;
pub mod taxonomy;

pub use community::{AbundanceTable, CommunityMetricCalculator, SampleMetadata};
pub use errors::TableError;
pub use taxonomy::{ReferenceTable, TaxonomicCopyNumberResolver};
