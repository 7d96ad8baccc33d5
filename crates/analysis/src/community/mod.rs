//! Abundance tables, sample metadata and community-weighted metrics.

pub mod metadata;
pub mod metrics;
pub mod table;

pub use metadata::SampleMetadata;
pub use metrics::{
    COPIOTROPH_THRESHOLD, CommunityMetricCalculator, CommunityMetrics, SAR11_ORDERS, TaxonSubset,
    WMCN_COLUMNS, WMGR_COLUMNS, weighted_mean_copy_number, weighted_mean_growth_rate,
};
pub use table::{AbundanceTable, Classification, Otu};
