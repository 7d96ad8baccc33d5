//! OTU abundance table.

use crate::taxonomy::Rank;

/// Taxonomic names of one OTU, one optional entry per rank.
///
/// Names are trimmed on insertion; blank names count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    names: [Option<String>; 6],
}

impl Classification {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, rank: Rank, name: &str) -> Self {
        self.set(rank, Some(name));
        self
    }

    pub fn set(&mut self, rank: Rank, name: Option<&str>) {
        self.names[rank.index()] = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
    }

    pub fn get(&self, rank: Rank) -> Option<&str> {
        self.names[rank.index()].as_deref()
    }

    /// Finest rank with a name, optionally ignoring species.
    pub fn finest(&self, include_species: bool) -> Option<Rank> {
        Rank::ALL
            .into_iter()
            .filter(|&r| include_species || r != Rank::Species)
            .find(|&r| self.get(r).is_some())
    }
}

/// One row of the abundance table.
#[derive(Debug, Clone, PartialEq)]
pub struct Otu {
    pub id: String,
    pub classification: Classification,
    /// Abundance per sample, aligned with [`AbundanceTable::samples`]
    pub abundances: Vec<f64>,
    /// Maximum growth rate (per hour), when annotated
    pub growth_rate: Option<f64>,
    /// Phototroph flag, when annotated
    pub phototroph: Option<bool>,
    /// Resolved mean rRNA copy number
    pub copy_number: Option<f64>,
    /// Rank at which the copy number was resolved
    pub classification_level: Option<Rank>,
    /// Free-text cells, aligned with [`AbundanceTable::text_columns`]
    pub text: Vec<String>,
}

impl Otu {
    pub fn new(id: impl Into<String>, classification: Classification, abundances: Vec<f64>) -> Self {
        Self {
            id: id.into(),
            classification,
            abundances,
            growth_rate: None,
            phototroph: None,
            copy_number: None,
            classification_level: None,
            text: Vec::new(),
        }
    }

    pub fn with_growth_rate(mut self, rate: f64) -> Self {
        self.growth_rate = Some(rate);
        self
    }

    pub fn with_phototroph(mut self, phototroph: bool) -> Self {
        self.phototroph = Some(phototroph);
        self
    }

    pub fn with_copy_number(mut self, copy_number: f64) -> Self {
        self.copy_number = Some(copy_number);
        self
    }

    pub fn with_text(mut self, text: Vec<String>) -> Self {
        self.text = text;
        self
    }

    /// Cell of the text column at `index`, empty when absent.
    pub fn text_at(&self, index: usize) -> &str {
        self.text.get(index).map_or("", String::as_str)
    }
}

/// OTUs by samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AbundanceTable {
    samples: Vec<String>,
    /// Non-numeric columns carried through unchanged (e.g. `Kingdom`)
    text_columns: Vec<String>,
    otus: Vec<Otu>,
    growth_rates_annotated: bool,
}

impl AbundanceTable {
    pub fn new(samples: Vec<String>) -> Self {
        Self {
            samples,
            text_columns: Vec::new(),
            otus: Vec::new(),
            growth_rates_annotated: false,
        }
    }

    pub fn with_text_columns(mut self, columns: Vec<String>) -> Self {
        self.text_columns = columns;
        self
    }

    /// Append an OTU.
    ///
    /// # Panics
    /// Panics if the OTU does not carry one abundance per sample.
    pub fn push(&mut self, otu: Otu) {
        assert_eq!(
            otu.abundances.len(),
            self.samples.len(),
            "OTU '{}' has {} abundances for {} samples",
            otu.id,
            otu.abundances.len(),
            self.samples.len()
        );
        if otu.growth_rate.is_some() {
            self.growth_rates_annotated = true;
        }
        self.otus.push(otu);
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    pub fn text_columns(&self) -> &[String] {
        &self.text_columns
    }

    pub fn sample_index(&self, sample: &str) -> Option<usize> {
        self.samples.iter().position(|s| s == sample)
    }

    pub fn otus(&self) -> &[Otu] {
        &self.otus
    }

    pub fn otus_mut(&mut self) -> &mut [Otu] {
        &mut self.otus
    }

    pub fn len(&self) -> usize {
        self.otus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.otus.is_empty()
    }

    /// Whether the table carries a growth-rate annotation column.
    pub fn has_growth_rates(&self) -> bool {
        self.growth_rates_annotated
    }

    pub fn set_growth_rates_annotated(&mut self, annotated: bool) {
        self.growth_rates_annotated = annotated;
    }

    /// Whether any OTU carries a phototroph flag.
    pub fn has_phototroph_flags(&self) -> bool {
        self.otus.iter().any(|o| o.phototroph.is_some())
    }

    /// Whether any OTU names a species.
    pub fn has_species(&self) -> bool {
        self.otus
            .iter()
            .any(|o| o.classification.get(Rank::Species).is_some())
    }
}
