//! Independent partial comparators, each returning a score in 0..=100.

use rapidfuzz::distance::indel;

use crate::models::{sort_dosages, Dosage};

/// Values closer to zero than this count as zero.
const ZERO_EPSILON: f64 = 1e-9;

/// Length ratio at which the fuzzy tail comparison starts looking for substrings.
const PARTIAL_LENGTH_RATIO: f64 = 1.5;

/// Length ratio beyond which substring matches are discounted further.
const LONG_PARTIAL_LENGTH_RATIO: f64 = 8.0;

/// Round a 0-100 value half-to-even and clamp it into a score.
pub fn round_score(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.round_ties_even().clamp(0.0, 100.0) as u8
}

/// Compare two dosage lists.
///
/// Lists are compared position by position after sorting, so the order the
/// dosages appeared in the text does not matter. A unit mismatch, a zero
/// against a non-zero, or any ratio below `strict_threshold` makes the whole
/// comparison 0.
pub fn compare_dosages(a: &[Dosage], b: &[Dosage], tolerance: f64, strict_threshold: f64) -> u8 {
    if a.is_empty() && b.is_empty() {
        return 100;
    }
    if a.len() != b.len() {
        return 0;
    }

    let mut a = a.to_vec();
    let mut b = b.to_vec();
    sort_dosages(&mut a);
    sort_dosages(&mut b);

    let mut total = 0.0;
    for (x, y) in a.iter().zip(&b) {
        if x.unit != y.unit {
            return 0;
        }
        let x_zero = x.value.abs() < ZERO_EPSILON;
        let y_zero = y.value.abs() < ZERO_EPSILON;
        if x_zero && y_zero {
            total += 100.0;
            continue;
        }
        if x_zero || y_zero {
            return 0;
        }

        let ratio = x.value.min(y.value) / x.value.max(y.value);
        if ratio < strict_threshold {
            return 0;
        }
        total += if ratio >= 1.0 - tolerance {
            100.0
        } else {
            ratio * 100.0
        };
    }

    round_score(total / a.len() as f64)
}

/// Compare two prices. Missing or non-positive prices carry no signal and score 0.
pub fn compare_prices(a: Option<f64>, b: Option<f64>, tolerance: f64) -> u8 {
    let (Some(a), Some(b)) = (a, b) else {
        return 0;
    };
    if !a.is_finite() || !b.is_finite() || a <= 0.0 || b <= 0.0 {
        return 0;
    }

    let ratio = a.min(b) / a.max(b);
    if ratio >= 1.0 - tolerance {
        100
    } else {
        round_score(ratio * 100.0)
    }
}

/// Insert/delete similarity of two strings, `2 * LCS / (|a| + |b|)`.
///
/// Two empty strings are identical and score 100.
pub fn ratio(a: &str, b: &str) -> u8 {
    round_score(similarity(a, b) * 100.0)
}

/// Normalized Indel similarity in 0.0..=1.0.
fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    indel::normalized_similarity(a.chars(), b.chars())
}

/// Similarity that favors one string being contained in the other.
///
/// Takes the best of:
/// - plain insert/delete similarity
/// - similarity of the sorted tokens
/// - similarity of shared vs. unshared token sets
/// - best alignment of the shorter string inside the longer one, when the
///   lengths differ enough
///
/// An empty side scores 0.
pub fn weighted_ratio(a: &str, b: &str) -> u8 {
    if a.trim().is_empty() || b.trim().is_empty() {
        return 0;
    }

    let base = similarity(a, b);
    let len_a = a.chars().count() as f64;
    let len_b = b.chars().count() as f64;
    let length_ratio = len_a.max(len_b) / len_a.min(len_b);

    let token_scale = 0.95;
    let best = if length_ratio < PARTIAL_LENGTH_RATIO {
        base.max(token_sort_similarity(a, b) * token_scale)
            .max(token_set_similarity(a, b) * token_scale)
    } else {
        let partial_scale = if length_ratio < LONG_PARTIAL_LENGTH_RATIO {
            0.9
        } else {
            0.6
        };
        let (shorter, longer) = if len_a <= len_b { (a, b) } else { (b, a) };
        base.max(partial_similarity(shorter, longer) * partial_scale)
            .max(token_sort_similarity(a, b) * token_scale * partial_scale)
            .max(token_set_similarity(a, b) * token_scale * partial_scale)
    };

    round_score(best * 100.0)
}

/// Best similarity of `shorter` against every same-length window of `longer`.
fn partial_similarity(shorter: &str, longer: &str) -> f64 {
    let needle: Vec<char> = shorter.chars().collect();
    let haystack: Vec<char> = longer.chars().collect();
    if needle.len() >= haystack.len() {
        return similarity(shorter, longer);
    }

    let mut best: f64 = 0.0;
    for window in haystack.windows(needle.len()) {
        let candidate: String = window.iter().collect();
        best = best.max(similarity(shorter, &candidate));
        if best >= 1.0 {
            break;
        }
    }
    best
}

fn sorted_tokens(text: &str) -> Vec<&str> {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.sort_unstable();
    tokens
}

fn token_sort_similarity(a: &str, b: &str) -> f64 {
    similarity(&sorted_tokens(a).join(" "), &sorted_tokens(b).join(" "))
}

fn token_set_similarity(a: &str, b: &str) -> f64 {
    let mut tokens_a = sorted_tokens(a);
    let mut tokens_b = sorted_tokens(b);
    tokens_a.dedup();
    tokens_b.dedup();

    let shared: Vec<&str> = tokens_a
        .iter()
        .filter(|t| tokens_b.contains(t))
        .copied()
        .collect();
    let only_a: Vec<&str> = tokens_a
        .iter()
        .filter(|t| !shared.contains(t))
        .copied()
        .collect();
    let only_b: Vec<&str> = tokens_b
        .iter()
        .filter(|t| !shared.contains(t))
        .copied()
        .collect();

    let shared_text = shared.join(" ");
    let combined_a = format!("{} {}", shared_text, only_a.join(" ")).trim().to_string();
    let combined_b = format!("{} {}", shared_text, only_b.join(" ")).trim().to_string();

    let mut best = similarity(&combined_a, &combined_b);
    if !shared.is_empty() {
        best = best
            .max(similarity(&shared_text, &combined_a))
            .max(similarity(&shared_text, &combined_b));
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DosageUnit;
    use proptest::prelude::*;

    fn g(value: f64) -> Dosage {
        Dosage::new(value, DosageUnit::Grams)
    }

    fn ml(value: f64) -> Dosage {
        Dosage::new(value, DosageUnit::Milliliters)
    }

    fn dosages(a: &[Dosage], b: &[Dosage]) -> u8 {
        compare_dosages(a, b, 0.05, 0.8)
    }

    #[test]
    fn test_round_score_half_to_even() {
        assert_eq!(round_score(62.5), 62);
        assert_eq!(round_score(63.5), 64);
        assert_eq!(round_score(-3.0), 0);
        assert_eq!(round_score(140.0), 100);
        assert_eq!(round_score(f64::NAN), 0);
    }

    #[test]
    fn test_dosage_empty_and_length_mismatch() {
        assert_eq!(dosages(&[], &[]), 100);
        assert_eq!(dosages(&[g(1.0)], &[]), 0);
        assert_eq!(dosages(&[g(1.0)], &[g(1.0), ml(5.0)]), 0);
    }

    #[test]
    fn test_dosage_unit_mismatch() {
        assert_eq!(dosages(&[g(1.0)], &[ml(1.0)]), 0);
    }

    #[test]
    fn test_dosage_zero_handling() {
        let none = |v| Dosage::new(v, DosageUnit::None);
        assert_eq!(dosages(&[none(0.0)], &[none(0.0)]), 100);
        assert_eq!(dosages(&[none(0.0)], &[none(5.0)]), 0);
    }

    #[test]
    fn test_dosage_ratios() {
        // Within tolerance
        assert_eq!(dosages(&[g(0.5)], &[g(0.49)]), 100);
        // Between threshold and tolerance: ratio * 100
        assert_eq!(dosages(&[g(0.5)], &[g(0.45)]), 90);
        // Below strict threshold
        assert_eq!(dosages(&[g(0.5)], &[g(0.3)]), 0);
        // One bad pair invalidates the whole comparison
        assert_eq!(dosages(&[g(0.5), ml(10.0)], &[g(0.5), ml(5.0)]), 0);
        // Mean of contributions
        assert_eq!(dosages(&[g(0.5), ml(10.0)], &[g(0.45), ml(10.0)]), 95);
    }

    #[test]
    fn test_price_scores() {
        assert_eq!(compare_prices(Some(100.0), Some(120.0), 0.2), 100);
        assert_eq!(compare_prices(Some(100.0), Some(200.0), 0.2), 50);
        assert_eq!(compare_prices(Some(100.0), Some(130.0), 0.2), 77);
        assert_eq!(compare_prices(None, Some(100.0), 0.2), 0);
        assert_eq!(compare_prices(Some(0.0), Some(100.0), 0.2), 0);
        assert_eq!(compare_prices(Some(-5.0), Some(10.0), 0.2), 0);
        assert_eq!(compare_prices(Some(f64::NAN), Some(10.0), 0.2), 0);
    }

    #[test]
    fn test_ratio() {
        assert_eq!(ratio("", ""), 100);
        assert_eq!(ratio("парацетамол", "парацетамол"), 100);
        assert_eq!(ratio("abcd", "abce"), 75);
        assert_eq!(ratio("парацетамол", "парацетомол"), 91);
        // Lengths differ: 2 * 7 / 18
        assert_eq!(ratio("аспирин", "аспиринкард"), 78);
        assert_eq!(ratio("ибупрофен", "нурофен"), 75);
        assert!(ratio("парацетамол", "ибупрофен") < 70);
    }

    #[test]
    fn test_weighted_ratio_empty_sides() {
        assert_eq!(weighted_ratio("", ""), 0);
        assert_eq!(weighted_ratio("оболочкой", ""), 0);
    }

    #[test]
    fn test_weighted_ratio_favors_containment() {
        let short = "шипучие";
        let long = "шипучие таблетки апельсин";

        assert_eq!(weighted_ratio(short, long), 90);
        assert!(weighted_ratio(short, long) > ratio(short, long));
    }

    #[test]
    fn test_weighted_ratio_word_order() {
        assert_eq!(weighted_ratio("вишня детский", "детский вишня"), 95);
        assert_eq!(weighted_ratio("вишня детский", "вишня детский"), 100);
    }

    proptest! {
        #[test]
        fn prop_price_symmetric(a in 0.01f64..10_000.0, b in 0.01f64..10_000.0) {
            prop_assert_eq!(compare_prices(Some(a), Some(b), 0.2), compare_prices(Some(b), Some(a), 0.2));
        }

        #[test]
        fn prop_dosage_order_independent(
            values in proptest::collection::vec((0.001f64..1000.0, 0usize..4), 0..5),
            shift in 0usize..5,
        ) {
            let units = [DosageUnit::None, DosageUnit::Fraction, DosageUnit::Grams, DosageUnit::Milliliters];
            let list: Vec<Dosage> = values.iter().map(|(v, u)| Dosage::new(*v, units[*u])).collect();
            let mut rotated = list.clone();
            if !rotated.is_empty() {
                let k = shift % rotated.len();
                rotated.rotate_left(k);
            }
            let mut reversed = list.clone();
            reversed.reverse();

            let reference = dosages(&list, &list);
            prop_assert_eq!(reference, 100);
            prop_assert_eq!(dosages(&list, &rotated), reference);
            prop_assert_eq!(dosages(&reversed, &rotated), reference);
        }

        #[test]
        fn prop_scores_in_range(a in "\\PC{0,12}", b in "\\PC{0,12}") {
            prop_assert!(ratio(&a, &b) <= 100);
            prop_assert!(weighted_ratio(&a, &b) <= 100);
        }
    }
}
