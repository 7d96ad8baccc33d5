//! Taxonomic copy-number resolution.
//!
//! - [`Rank`]: the six ranks used for lookup, finest first
//! - [`ReferenceTable`]: mean copy number per (rank, name)
//! - [`TaxonomicCopyNumberResolver`]: finest-rank-first cascade over an
//!   abundance table

pub mod rank;
pub mod reference;
pub mod resolver;

pub use rank::Rank;
pub use reference::{ReferenceEntry, ReferenceTable};
pub use resolver::{
    Resolution, ResolutionReport, ResolverConfig, TaxonomicCopyNumberResolver, UnresolvedOtu,
    UnresolvedReason,
};
