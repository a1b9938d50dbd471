//! Lookup tables for unit, form and pack-numbering spellings.
//!
//! New synonyms are added here; no other code needs to change.

use crate::models::DosageUnit;

/// Unit spelling → (canonical unit, multiplier to the canonical unit).
pub const UNIT_SPELLINGS: &[(&str, DosageUnit, f64)] = &[
    // Mass
    ("мг", DosageUnit::Grams, 0.001),
    ("mg", DosageUnit::Grams, 0.001),
    ("г", DosageUnit::Grams, 1.0),
    ("g", DosageUnit::Grams, 1.0),
    ("кг", DosageUnit::Grams, 1000.0),
    ("kg", DosageUnit::Grams, 1000.0),
    // Volume
    ("мл", DosageUnit::Milliliters, 1.0),
    ("ml", DosageUnit::Milliliters, 1.0),
    ("л", DosageUnit::Milliliters, 1000.0),
    ("l", DosageUnit::Milliliters, 1000.0),
    // Percentage
    ("%", DosageUnit::Fraction, 0.01),
];

/// Form spelling → canonical form tag.
///
/// Keys are lower-case. A whole word (trailing dots ignored) is looked up
/// first, so hyphenated spellings survive; otherwise the word is split at
/// punctuation and each piece is looked up.
pub const FORM_SPELLINGS: &[(&str, &str)] = &[
    // Tablets
    ("таблетка", "таблетки"),
    ("таблетки", "таблетки"),
    ("табл", "таблетки"),
    ("таб", "таблетки"),
    ("tabl", "таблетки"),
    ("tab", "таблетки"),
    ("tabs", "таблетки"),
    // Capsules
    ("капс", "капсулы"),
    ("капсула", "капсулы"),
    ("капсулы", "капсулы"),
    ("caps", "капсулы"),
    // Drops
    ("капли", "капли"),
    // Sprays
    ("спрей", "спрей"),
    ("аэрозоль", "спрей"),
    // Solutions
    ("раствор", "раствор"),
    ("р-р", "раствор"),
    // Injections
    ("инъекции", "инъекции"),
    ("амп", "инъекции"),
    // Suppositories
    ("свечи", "свечи"),
    ("супп", "свечи"),
];

/// Marks that introduce a pack count (`№20`, `N20`, `#20`).
///
/// Alphabetic marks only count at the start of a word.
pub const NUMBERING_MARKS: &[&str] = &["№", "#", "n"];

/// Prefix of every canonical numbering tag.
pub const NUMBERING_TAG_PREFIX: &str = "№";
