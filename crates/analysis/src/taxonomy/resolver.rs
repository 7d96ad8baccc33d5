//! Finest-rank-first copy-number lookup.
//!
//! For each OTU the present ranks are tried from finest to coarsest against
//! the matching partition of the reference table:
//!
//! - exactly one match: accept it and record the rank
//! - several matches: ambiguous; stop and leave the copy number unset
//! - no match: fall back to the next coarser present rank
//!
//! An OTU that runs out of ranks is reported with a code derived from the
//! finest rank it carried (see [`Rank::fallback_code`]).

use crate::community::{AbundanceTable, Classification};
use crate::taxonomy::{Rank, ReferenceTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resolver options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Try the species rank before genus
    pub include_species: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            include_species: true,
        }
    }
}

impl ResolverConfig {
    /// Variant that ignores species names entirely.
    pub fn without_species() -> Self {
        Self {
            include_species: false,
        }
    }
}

/// Outcome of resolving one classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    Matched { rank: Rank, copy_number: f64 },
    Ambiguous { rank: Rank, matches: usize },
    Exhausted,
}

/// Why an OTU was left without a copy number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnresolvedReason {
    /// No present rank matched the reference table
    Exhausted,
    /// A rank matched more than one reference entry
    Ambiguous { rank: Rank, matches: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedOtu {
    pub otu_id: String,
    /// Fallback code from the finest present rank
    pub code: u8,
    pub reason: UnresolvedReason,
}

/// Summary of one annotation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionReport {
    /// Number of OTUs that received a copy number
    pub resolved: usize,
    /// Resolved OTUs per matching rank
    pub by_rank: BTreeMap<Rank, usize>,
    pub unresolved: Vec<UnresolvedOtu>,
}

impl ResolutionReport {
    pub fn total(&self) -> usize {
        self.resolved + self.unresolved.len()
    }

    pub fn ambiguous(&self) -> usize {
        self.unresolved
            .iter()
            .filter(|u| matches!(u.reason, UnresolvedReason::Ambiguous { .. }))
            .count()
    }
}

/// Assigns mean copy numbers from a reference table.
#[derive(Debug, Clone, Copy)]
pub struct TaxonomicCopyNumberResolver<'a> {
    reference: &'a ReferenceTable,
    config: ResolverConfig,
}

impl<'a> TaxonomicCopyNumberResolver<'a> {
    pub fn new(reference: &'a ReferenceTable, config: ResolverConfig) -> Self {
        Self { reference, config }
    }

    pub fn config(&self) -> ResolverConfig {
        self.config
    }

    fn ranks(&self) -> impl Iterator<Item = Rank> + '_ {
        Rank::ALL
            .into_iter()
            .filter(|&r| self.config.include_species || r != Rank::Species)
    }

    /// Resolve a single classification.
    pub fn resolve(&self, classification: &Classification) -> Resolution {
        for rank in self.ranks() {
            let Some(name) = classification.get(rank) else {
                continue;
            };
            match self.reference.lookup(rank, name) {
                [] => continue,
                [copy_number] => {
                    return Resolution::Matched {
                        rank,
                        copy_number: *copy_number,
                    };
                }
                many => {
                    return Resolution::Ambiguous {
                        rank,
                        matches: many.len(),
                    };
                }
            }
        }
        Resolution::Exhausted
    }

    /// Fill `copy_number` and `classification_level` for every OTU.
    ///
    /// Existing annotations are overwritten; unresolved OTUs are cleared.
    pub fn annotate(&self, table: &mut AbundanceTable) -> ResolutionReport {
        let mut report = ResolutionReport::default();

        for otu in table.otus_mut() {
            let resolution = self.resolve(&otu.classification);
            otu.copy_number = None;
            otu.classification_level = None;

            let code = Rank::fallback_code(otu.classification.finest(self.config.include_species));
            match resolution {
                Resolution::Matched { rank, copy_number } => {
                    otu.copy_number = Some(copy_number);
                    otu.classification_level = Some(rank);
                    report.resolved += 1;
                    *report.by_rank.entry(rank).or_default() += 1;
                }
                Resolution::Ambiguous { rank, matches } => {
                    log::warn!(
                        "OTU '{}': {matches} reference entries for {rank} '{}'",
                        otu.id,
                        otu.classification.get(rank).unwrap_or_default()
                    );
                    report.unresolved.push(UnresolvedOtu {
                        otu_id: otu.id.clone(),
                        code,
                        reason: UnresolvedReason::Ambiguous { rank, matches },
                    });
                }
                Resolution::Exhausted => {
                    log::debug!("OTU '{}': no reference match (code {code})", otu.id);
                    report.unresolved.push(UnresolvedOtu {
                        otu_id: otu.id.clone(),
                        code,
                        reason: UnresolvedReason::Exhausted,
                    });
                }
            }
        }

        log::info!(
            "Resolved {} of {} OTUs ({} ambiguous)",
            report.resolved,
            report.total(),
            report.ambiguous()
        );
        report
    }
}
