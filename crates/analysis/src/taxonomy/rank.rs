use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Taxonomic rank, ordered finest to coarsest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    Species,
    Genus,
    Family,
    Order,
    Class,
    Phylum,
}

impl Rank {
    /// All ranks, finest first.
    pub const ALL: [Rank; 6] = [
        Rank::Species,
        Rank::Genus,
        Rank::Family,
        Rank::Order,
        Rank::Class,
        Rank::Phylum,
    ];

    /// Position in [`Rank::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Lower-case label used in the reference table's `rank` column.
    pub fn reference_label(self) -> &'static str {
        match self {
            Rank::Species => "species",
            Rank::Genus => "genus",
            Rank::Family => "family",
            Rank::Order => "order",
            Rank::Class => "class",
            Rank::Phylum => "phylum",
        }
    }

    /// Capitalized label used for abundance-table columns and reports.
    pub fn label(self) -> &'static str {
        match self {
            Rank::Species => "Species",
            Rank::Genus => "Genus",
            Rank::Family => "Family",
            Rank::Order => "Order",
            Rank::Class => "Class",
            Rank::Phylum => "Phylum",
        }
    }

    /// Code recorded for an OTU that could not be resolved, keyed by the
    /// finest rank it carried. Species and genus share code 1; an OTU with
    /// no classification at all gets 6.
    pub fn fallback_code(finest_present: Option<Rank>) -> u8 {
        match finest_present {
            Some(Rank::Species) | Some(Rank::Genus) => 1,
            Some(Rank::Family) => 2,
            Some(Rank::Order) => 3,
            Some(Rank::Class) => 4,
            Some(Rank::Phylum) => 5,
            None => 6,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Rank {
    type Err = String;

    /// Accepts either label form, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Rank::ALL
            .into_iter()
            .find(|r| r.reference_label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("Unknown rank '{needle}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_is_finest_first() {
        assert!(Rank::Species < Rank::Genus);
        assert!(Rank::Class < Rank::Phylum);
        for (i, rank) in Rank::ALL.iter().enumerate() {
            assert_eq!(rank.index(), i);
        }
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!("genus".parse::<Rank>().unwrap(), Rank::Genus);
        assert_eq!("Phylum".parse::<Rank>().unwrap(), Rank::Phylum);
        assert_eq!(" order ".parse::<Rank>().unwrap(), Rank::Order);
        assert!("superkingdom".parse::<Rank>().is_err());
    }

    #[test]
    fn test_fallback_codes() {
        assert_eq!(Rank::fallback_code(Some(Rank::Species)), 1);
        assert_eq!(Rank::fallback_code(Some(Rank::Genus)), 1);
        assert_eq!(Rank::fallback_code(Some(Rank::Family)), 2);
        assert_eq!(Rank::fallback_code(Some(Rank::Phylum)), 5);
        assert_eq!(Rank::fallback_code(None), 6);
    }

    #[test]
    fn test_display() {
        assert_eq!(Rank::Family.to_string(), "Family");
    }
}
