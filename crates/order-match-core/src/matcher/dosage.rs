//! Dosage extraction.
//!
//! Finds every `<number>[<unit>]` in a text and converts it to the canonical
//! unit of its category:
//! - mass (мг, г, кг) → grams
//! - volume (мл, л) → milliliters
//! - percent → dimensionless fraction
//!
//! A bare number keeps [`DosageUnit::None`].

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{sort_dosages, Dosage, DosageUnit};

use super::numbering::take_numbering;
use super::tables::UNIT_SPELLINGS;

static DOSAGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // Longest spellings first so that "мг" is never read as "г"
    let mut spellings: Vec<&str> = UNIT_SPELLINGS.iter().map(|(s, _, _)| *s).collect();
    spellings.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    let units = spellings
        .iter()
        .map(|s| regex::escape(s))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)(\d+(?:\.\d+)?)(\s?(?:{})?)", units))
        .expect("unit table yields a valid pattern")
});

/// Parse all dosages in `text`, sorted by `(value, unit)`.
///
/// Empty input yields an empty list. A pack-numbering mark (`№20`) is not a
/// dosage and is skipped.
pub fn parse_dosages(text: &str) -> Vec<Dosage> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let prepared = prepare_text(text);
    let (_, rest) = take_numbering(&prepared);
    extract_dosages(&rest)
}

/// Normalize the decimal separator and case.
pub(crate) fn prepare_text(text: &str) -> String {
    text.replace(',', ".").to_lowercase()
}

/// Extract dosages from text already passed through [`prepare_text`].
pub(crate) fn extract_dosages(prepared: &str) -> Vec<Dosage> {
    let mut dosages: Vec<Dosage> = DOSAGE_PATTERN
        .captures_iter(prepared)
        .map(|caps| {
            // Digits outside ASCII still match \d; they parse as zero.
            let raw = caps
                .get(1)
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .unwrap_or(0.0);
            let spelling = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            let (unit, factor) = lookup_unit(spelling);
            Dosage::new(raw * factor, unit)
        })
        .collect();

    sort_dosages(&mut dosages);
    dosages
}

/// Replace every dosage substring with a single space.
pub(crate) fn blank_dosages(prepared: &str) -> String {
    DOSAGE_PATTERN.replace_all(prepared, " ").into_owned()
}

fn lookup_unit(spelling: &str) -> (DosageUnit, f64) {
    let spelling = spelling.trim().to_lowercase();
    UNIT_SPELLINGS
        .iter()
        .find(|(s, _, _)| *s == spelling)
        .map(|(_, unit, factor)| (*unit, *factor))
        .unwrap_or((DosageUnit::None, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_dosages(text: &str, expected: &[(f64, DosageUnit)]) {
        let parsed = parse_dosages(text);
        assert_eq!(
            parsed.len(),
            expected.len(),
            "{:?} parsed as {:?}",
            text,
            parsed
        );
        for (dosage, (value, unit)) in parsed.iter().zip(expected) {
            assert!(
                (dosage.value - value).abs() < 1e-9,
                "{:?}: expected {} got {}",
                text,
                value,
                dosage.value
            );
            assert_eq!(dosage.unit, *unit, "{:?}", text);
        }
    }

    #[test]
    fn test_mass_units() {
        assert_dosages("500мг", &[(0.5, DosageUnit::Grams)]);
        assert_dosages("500 mg", &[(0.5, DosageUnit::Grams)]);
        assert_dosages("2,5 г", &[(2.5, DosageUnit::Grams)]);
        assert_dosages("1кг", &[(1000.0, DosageUnit::Grams)]);
        assert_dosages("500МГ", &[(0.5, DosageUnit::Grams)]);
    }

    #[test]
    fn test_volume_units() {
        assert_dosages("10 мл", &[(10.0, DosageUnit::Milliliters)]);
        assert_dosages("1.5л", &[(1500.0, DosageUnit::Milliliters)]);
        assert_dosages("100ML", &[(100.0, DosageUnit::Milliliters)]);
    }

    #[test]
    fn test_percent_becomes_fraction() {
        assert_dosages("5%", &[(0.05, DosageUnit::Fraction)]);
        assert_dosages("0,9 %", &[(0.009, DosageUnit::Fraction)]);
    }

    #[test]
    fn test_bare_number_keeps_empty_unit() {
        assert_dosages("Аспирин 20", &[(20.0, DosageUnit::None)]);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_dosages("").is_empty());
        assert!(parse_dosages("   ").is_empty());
        assert!(parse_dosages("Аспирин").is_empty());
    }

    #[test]
    fn test_sorted_output() {
        assert_dosages(
            "10мл 500мг 5%",
            &[
                (0.05, DosageUnit::Fraction),
                (0.5, DosageUnit::Grams),
                (10.0, DosageUnit::Milliliters),
            ],
        );
    }

    #[test]
    fn test_numbering_is_not_a_dosage() {
        assert_dosages("Парацетамол 500мг таб №20", &[(0.5, DosageUnit::Grams)]);
        assert_dosages("Парацетамол 500 мг табл N20", &[(0.5, DosageUnit::Grams)]);
    }

    #[test]
    fn test_unparsable_digits_default_to_zero() {
        // Arabic-Indic five matches \d but is not a valid f64 literal
        assert_dosages("٥мг", &[(0.0, DosageUnit::Grams)]);
    }

    #[test]
    fn test_blank_dosages() {
        let blanked = blank_dosages(&prepare_text("Нурофен 200мг табл"));
        assert_eq!(blanked.split_whitespace().collect::<Vec<_>>(), vec!["нурофен", "табл"]);
    }
}
