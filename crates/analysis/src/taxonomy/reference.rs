//! Reference copy-number table, partitioned by rank.

use crate::taxonomy::Rank;
use std::collections::HashMap;

/// One row of the reference database.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceEntry {
    pub rank: Rank,
    pub name: String,
    /// Mean rRNA operon copy number
    pub mean: f64,
}

/// Mean copy numbers keyed by exact name within each rank.
///
/// Names map to every mean recorded for them so duplicates stay visible to
/// the resolver.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    partitions: [HashMap<String, Vec<f64>>; 6],
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = ReferenceEntry>) -> Self {
        let mut table = Self::new();
        for entry in entries {
            table.insert(entry.rank, entry.name, entry.mean);
        }
        table
    }

    /// Record a mean copy number; the name is trimmed.
    pub fn insert(&mut self, rank: Rank, name: impl AsRef<str>, mean: f64) {
        self.partitions[rank.index()]
            .entry(name.as_ref().trim().to_string())
            .or_default()
            .push(mean);
    }

    /// All means recorded for `name` at `rank` (case-sensitive).
    pub fn lookup(&self, rank: Rank, name: &str) -> &[f64] {
        self.partitions[rank.index()]
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of distinct names at `rank`.
    pub fn rank_len(&self, rank: Rank) -> usize {
        self.partitions[rank.index()].len()
    }

    /// Total number of recorded means.
    pub fn len(&self) -> usize {
        self.partitions
            .iter()
            .flat_map(|p| p.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.iter().all(HashMap::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partitions_are_separate() {
        let mut table = ReferenceTable::new();
        table.insert(Rank::Genus, "Alpha", 3.5);
        table.insert(Rank::Family, "Alpha", 2.0);

        assert_eq!(table.lookup(Rank::Genus, "Alpha"), &[3.5]);
        assert_eq!(table.lookup(Rank::Family, "Alpha"), &[2.0]);
        assert!(table.lookup(Rank::Species, "Alpha").is_empty());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_duplicates_kept() {
        let table = ReferenceTable::from_entries([
            ReferenceEntry {
                rank: Rank::Order,
                name: "Dup".into(),
                mean: 1.0,
            },
            ReferenceEntry {
                rank: Rank::Order,
                name: " Dup ".into(),
                mean: 2.0,
            },
        ]);
        assert_eq!(table.lookup(Rank::Order, "Dup"), &[1.0, 2.0]);
        assert_eq!(table.rank_len(Rank::Order), 1);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let mut table = ReferenceTable::new();
        table.insert(Rank::Genus, "Alpha", 3.5);
        assert!(table.lookup(Rank::Genus, "alpha").is_empty());
    }
}
