//! Abundance-weighted community metrics.
//!
//! # Weighted mean copy number (WMCN)
//!
//! Read counts overstate taxa with many rRNA operons, so abundances are
//! first converted to cell counts by dividing by copy number:
//!
//! $$\mathrm{WMCN} = \frac{\sum_i a_i}{\sum_i a_i / c_i}$$
//!
//! over taxa with a defined copy number `c_i`.
//!
//! # Weighted mean growth rate (WMGR)
//!
//! $$\mathrm{WMGR} = \frac{\sum_i a_i g_i}{\sum_i a_i}$$
//!
//! over taxa with a defined growth rate `g_i`.
//!
//! Both are undefined (`None`) when no taxon qualifies or the total weight is
//! zero.

use crate::community::{AbundanceTable, Otu, SampleMetadata};
use crate::taxonomy::Rank;
use serde::{Deserialize, Serialize};

/// Order names treated as SAR11.
pub const SAR11_ORDERS: [&str; 3] = ["SAR11_clade", "SAR11 clade", "Pelagibacterales"];

/// Growth rate (per hour) above which a taxon counts as a copiotroph.
pub const COPIOTROPH_THRESHOLD: f64 = 0.1386;

pub const WMCN: &str = "WMCN";
pub const WMCN_NO_SAR11: &str = "WMCN, no SAR11";
pub const WMCN_NO_CN1: &str = "WMCN, no CN1";
pub const WMCN_HETEROTROPHS: &str = "WMCN, Heterotrophs";
pub const WMGR: &str = "WMGR";
pub const WMGR_NO_SAR11: &str = "WMGR, no SAR11";
pub const WMGR_COPIO: &str = "WMGR, copio";
pub const WMGR_HETEROTROPHS: &str = "WMGR, Heterotrophs";

/// WMCN metadata columns and their subsets, in output order.
pub const WMCN_COLUMNS: [(&str, TaxonSubset); 4] = [
    (WMCN, TaxonSubset::All),
    (WMCN_NO_SAR11, TaxonSubset::NoSar11),
    (WMCN_NO_CN1, TaxonSubset::NoCopyNumberOne),
    (WMCN_HETEROTROPHS, TaxonSubset::Heterotrophs),
];

/// WMGR metadata columns and their subsets, in output order.
pub const WMGR_COLUMNS: [(&str, TaxonSubset); 4] = [
    (WMGR, TaxonSubset::All),
    (WMGR_NO_SAR11, TaxonSubset::NoSar11),
    (WMGR_COPIO, TaxonSubset::Copiotrophs),
    (WMGR_HETEROTROPHS, TaxonSubset::Heterotrophs),
];

/// Taxon filters applied before weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxonSubset {
    All,
    /// Order not one of [`SAR11_ORDERS`]; taxa without an order are kept
    NoSar11,
    /// Copy number strictly greater than 1
    NoCopyNumberOne,
    /// Phototroph flag explicitly false
    Heterotrophs,
    /// Growth rate above [`COPIOTROPH_THRESHOLD`]
    Copiotrophs,
}

impl TaxonSubset {
    pub fn includes(self, otu: &Otu) -> bool {
        match self {
            TaxonSubset::All => true,
            TaxonSubset::NoSar11 => otu
                .classification
                .get(Rank::Order)
                .is_none_or(|order| !SAR11_ORDERS.contains(&order)),
            TaxonSubset::NoCopyNumberOne => otu.copy_number.is_some_and(|c| c > 1.0),
            TaxonSubset::Heterotrophs => otu.phototroph == Some(false),
            TaxonSubset::Copiotrophs => otu
                .growth_rate
                .is_some_and(|g| g > COPIOTROPH_THRESHOLD),
        }
    }
}

/// Harmonic copy-number mean of one sample column over `subset`.
pub fn weighted_mean_copy_number(
    table: &AbundanceTable,
    sample_idx: usize,
    subset: TaxonSubset,
) -> Option<f64> {
    let mut reads = 0.0;
    let mut cells = 0.0;
    for otu in table.otus().iter().filter(|o| subset.includes(o)) {
        let Some(copy_number) = otu.copy_number.filter(|&c| c > 0.0) else {
            continue;
        };
        let a = otu.abundances[sample_idx];
        reads += a;
        cells += a / copy_number;
    }
    (cells > 0.0).then(|| reads / cells)
}

/// Abundance-weighted growth rate of one sample column over `subset`.
pub fn weighted_mean_growth_rate(
    table: &AbundanceTable,
    sample_idx: usize,
    subset: TaxonSubset,
) -> Option<f64> {
    let mut weight = 0.0;
    let mut weighted = 0.0;
    for otu in table.otus().iter().filter(|o| subset.includes(o)) {
        let Some(rate) = otu.growth_rate else {
            continue;
        };
        let a = otu.abundances[sample_idx];
        weight += a;
        weighted += a * rate;
    }
    (weight > 0.0).then(|| weighted / weight)
}

/// All metrics for one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityMetrics {
    pub sample: String,
    pub wmcn: Option<f64>,
    pub wmcn_no_sar11: Option<f64>,
    pub wmcn_no_cn1: Option<f64>,
    pub wmcn_heterotrophs: Option<f64>,
    /// WMGR values are only computed when the table has growth rates
    pub wmgr: Option<f64>,
    pub wmgr_no_sar11: Option<f64>,
    pub wmgr_copio: Option<f64>,
    pub wmgr_heterotrophs: Option<f64>,
}

impl CommunityMetrics {
    /// `(column name, value)` pairs; WMGR columns only when `with_growth`.
    pub fn columns(&self, with_growth: bool) -> Vec<(&'static str, Option<f64>)> {
        let mut columns = vec![
            (WMCN, self.wmcn),
            (WMCN_NO_SAR11, self.wmcn_no_sar11),
            (WMCN_NO_CN1, self.wmcn_no_cn1),
            (WMCN_HETEROTROPHS, self.wmcn_heterotrophs),
        ];
        if with_growth {
            columns.extend([
                (WMGR, self.wmgr),
                (WMGR_NO_SAR11, self.wmgr_no_sar11),
                (WMGR_COPIO, self.wmgr_copio),
                (WMGR_HETEROTROPHS, self.wmgr_heterotrophs),
            ]);
        }
        columns
    }
}

/// Computes WMCN/WMGR per sample and writes them into sample metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommunityMetricCalculator;

impl CommunityMetricCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Metrics for one sample column, or `None` if the table lacks it.
    pub fn compute_sample(&self, table: &AbundanceTable, sample: &str) -> Option<CommunityMetrics> {
        let idx = table.sample_index(sample)?;
        let with_growth = table.has_growth_rates();
        let wmgr = |subset| {
            if with_growth {
                weighted_mean_growth_rate(table, idx, subset)
            } else {
                None
            }
        };

        Some(CommunityMetrics {
            sample: sample.to_string(),
            wmcn: weighted_mean_copy_number(table, idx, TaxonSubset::All),
            wmcn_no_sar11: weighted_mean_copy_number(table, idx, TaxonSubset::NoSar11),
            wmcn_no_cn1: weighted_mean_copy_number(table, idx, TaxonSubset::NoCopyNumberOne),
            wmcn_heterotrophs: weighted_mean_copy_number(table, idx, TaxonSubset::Heterotrophs),
            wmgr: wmgr(TaxonSubset::All),
            wmgr_no_sar11: wmgr(TaxonSubset::NoSar11),
            wmgr_copio: wmgr(TaxonSubset::Copiotrophs),
            wmgr_heterotrophs: wmgr(TaxonSubset::Heterotrophs),
        })
    }

    /// Compute metrics for every metadata sample that is also a table
    /// column and store them as metadata columns.
    ///
    /// Metadata samples missing from the table are left untouched.
    pub fn compute(
        &self,
        table: &AbundanceTable,
        metadata: &mut SampleMetadata,
    ) -> Vec<CommunityMetrics> {
        let with_growth = table.has_growth_rates();
        for (column, _) in WMCN_COLUMNS {
            metadata.ensure_metric_column(column);
        }
        if with_growth {
            for (column, _) in WMGR_COLUMNS {
                metadata.ensure_metric_column(column);
            }
        }

        let samples: Vec<String> = metadata.samples().to_vec();
        let mut results = Vec::new();
        for sample in &samples {
            let Some(metrics) = self.compute_sample(table, sample) else {
                log::debug!("Sample '{sample}' has no abundance column; skipped");
                continue;
            };
            for (column, value) in metrics.columns(with_growth) {
                metadata.set_metric(sample, column, value);
            }
            results.push(metrics);
        }
        results
    }
}
