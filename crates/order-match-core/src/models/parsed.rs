//! Structured attributes derived from a free-text item name.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical basis a dosage value is expressed in.
///
/// Variant order matches the ordering of the textual tags
/// (`""` < `"fraction"` < `"g"` < `"ml"`), which keeps sorted dosage lists stable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DosageUnit {
    /// Bare number without a recognized unit
    None,
    /// Dimensionless fraction (from a percentage)
    Fraction,
    /// Mass, in grams
    Grams,
    /// Volume, in milliliters
    Milliliters,
}

impl DosageUnit {
    /// Short textual tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            DosageUnit::None => "",
            DosageUnit::Fraction => "fraction",
            DosageUnit::Grams => "g",
            DosageUnit::Milliliters => "ml",
        }
    }
}

impl fmt::Display for DosageUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A quantity normalized to its canonical unit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Dosage {
    pub value: f64,
    pub unit: DosageUnit,
}

impl Dosage {
    pub fn new(value: f64, unit: DosageUnit) -> Self {
        Self { value, unit }
    }

    /// Total order by `(value, unit)`.
    pub fn canonical_cmp(&self, other: &Dosage) -> Ordering {
        self.value
            .total_cmp(&other.value)
            .then(self.unit.cmp(&other.unit))
    }
}

/// Sort dosages ascending by `(value, unit)`.
pub fn sort_dosages(dosages: &mut [Dosage]) {
    dosages.sort_by(Dosage::canonical_cmp);
}

/// A name decomposed into brand slots, form, pack numbering, dosages and tail.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ParsedName {
    /// First unclassified token
    pub brand1: String,
    /// Second unclassified token
    pub brand2: String,
    /// Third unclassified token
    pub brand3: String,
    /// Canonical dosage form tag (e.g., "таблетки")
    pub form: Option<String>,
    /// Canonical pack numbering tag (e.g., "№20")
    pub numbering: Option<String>,
    /// Dosages sorted by `(value, unit)`
    pub dosage: Vec<Dosage>,
    /// Remaining tokens joined by single spaces
    pub tail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_order_matches_tags() {
        let mut units = vec![
            DosageUnit::Milliliters,
            DosageUnit::Grams,
            DosageUnit::None,
            DosageUnit::Fraction,
        ];
        units.sort();
        let tags: Vec<&str> = units.iter().map(|u| u.as_str()).collect();

        let mut expected = tags.clone();
        expected.sort();
        assert_eq!(tags, expected);
    }

    #[test]
    fn test_sort_dosages() {
        let mut list = vec![
            Dosage::new(10.0, DosageUnit::Milliliters),
            Dosage::new(0.5, DosageUnit::Grams),
            Dosage::new(10.0, DosageUnit::Grams),
        ];
        sort_dosages(&mut list);

        assert_eq!(
            list,
            vec![
                Dosage::new(0.5, DosageUnit::Grams),
                Dosage::new(10.0, DosageUnit::Grams),
                Dosage::new(10.0, DosageUnit::Milliliters),
            ]
        );
    }
}
