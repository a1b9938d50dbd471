//! Tunable scoring parameters.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Weights of the partial scores inside the structural score.
///
/// The defaults sum to 0.90, so a perfect structural match scores 90.
/// They are applied as-is and never renormalized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StructuralWeights {
    pub brand1: f64,
    pub brand2: f64,
    pub brand3: f64,
    pub form: f64,
    pub numbering: f64,
    pub dosage: f64,
    pub tail: f64,
}

impl Default for StructuralWeights {
    fn default() -> Self {
        Self {
            brand1: 0.20,
            brand2: 0.10,
            brand3: 0.05,
            form: 0.10,
            numbering: 0.10,
            dosage: 0.20,
            tail: 0.15,
        }
    }
}

impl StructuralWeights {
    /// Sum of all weights (the maximum attainable structural score / 100).
    pub fn total(&self) -> f64 {
        self.brand1
            + self.brand2
            + self.brand3
            + self.form
            + self.numbering
            + self.dosage
            + self.tail
    }

    fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> {
        [
            ("brand1", self.brand1),
            ("brand2", self.brand2),
            ("brand3", self.brand3),
            ("form", self.form),
            ("numbering", self.numbering),
            ("dosage", self.dosage),
            ("tail", self.tail),
        ]
        .into_iter()
    }
}

/// Scoring configuration for the match engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatchConfig {
    /// Dosage ratios at or above `1 - tolerance` count as a full match
    pub dosage_tolerance: f64,
    /// Any dosage ratio below this invalidates the whole dosage comparison
    pub dosage_strict_threshold: f64,
    /// Price ratios at or above `1 - tolerance` count as a full match
    pub price_tolerance: f64,
    /// Minimum primary-brand similarity; below it the structural score is 0
    pub brand_gate: u8,
    /// Structural score weights
    pub weights: StructuralWeights,
    /// Share of the structural score in the combined score
    pub structural_share: f64,
    /// Share of the price score in the combined score
    pub price_share: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            dosage_tolerance: 0.05,
            dosage_strict_threshold: 0.8,
            price_tolerance: 0.2,
            brand_gate: 70,
            weights: StructuralWeights::default(),
            structural_share: 0.8,
            price_share: 0.2,
        }
    }
}

impl MatchConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: MatchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would push scores outside [0, 100].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit_interval = [
            ("dosage_tolerance", self.dosage_tolerance),
            ("dosage_strict_threshold", self.dosage_strict_threshold),
            ("price_tolerance", self.price_tolerance),
            ("structural_share", self.structural_share),
            ("price_share", self.price_share),
        ];
        for (name, value) in unit_interval {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if self.brand_gate > 100 {
            return Err(ConfigError::Invalid(format!(
                "brand_gate must be within [0, 100], got {}",
                self.brand_gate
            )));
        }

        for (name, weight) in self.weights.iter() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "weight {} must be non-negative, got {}",
                    name, weight
                )));
            }
        }
        if self.weights.total() > 1.0 + 1e-9 {
            return Err(ConfigError::Invalid(format!(
                "structural weights sum to {}, more than 1.0",
                self.weights.total()
            )));
        }
        if self.structural_share + self.price_share > 1.0 + 1e-9 {
            return Err(ConfigError::Invalid(
                "structural_share + price_share exceeds 1.0".into(),
            ));
        }

        Ok(())
    }
}
