//! Match scoring and result models.

use serde::{Deserialize, Serialize};

use crate::config::StructuralWeights;

use super::{CatalogEntry, RequestLine};

/// Breakdown of the structural comparison of two parsed names (each 0-100).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StructuralBreakdown {
    pub brand1: u8,
    pub brand2: u8,
    pub brand3: u8,
    pub form: u8,
    pub numbering: u8,
    pub dosage: u8,
    pub tail: u8,
}

impl StructuralBreakdown {
    /// Weighted sum of the partial scores, not yet rounded.
    pub fn weighted_score(&self, weights: &StructuralWeights) -> f64 {
        f64::from(self.brand1) * weights.brand1
            + f64::from(self.brand2) * weights.brand2
            + f64::from(self.brand3) * weights.brand3
            + f64::from(self.form) * weights.form
            + f64::from(self.numbering) * weights.numbering
            + f64::from(self.dosage) * weights.dosage
            + f64::from(self.tail) * weights.tail
    }
}

/// Full score of one candidate against one order line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CandidateScore {
    /// Partial scores; `None` when the primary brand gate rejected the pair
    pub breakdown: Option<StructuralBreakdown>,
    /// Primary brand similarity, always computed
    pub brand1: u8,
    /// Weighted structural score (0-100)
    pub structural: u8,
    /// Price similarity (0-100)
    pub price: u8,
    /// Structural and price scores blended (0-100)
    pub combined: u8,
}

impl CandidateScore {
    /// Whether the primary brand gate rejected the pair.
    pub fn is_brand_gated(&self) -> bool {
        self.breakdown.is_none()
    }
}

/// Outcome of the best-match search for one order line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum MatchOutcome {
    /// The line had no name; nothing was compared
    EmptyName,
    /// The department group had no catalog entries
    NoCandidates,
    /// Candidates existed but none scored above zero
    NoMatch,
    /// Best candidate found
    Matched(CatalogEntry),
}

/// Result of matching one order line. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchResult {
    /// 1-based position of the line in the processed batch
    pub line_number: usize,
    /// The order line as received
    pub request: RequestLine,
    /// Search outcome
    pub outcome: MatchOutcome,
    /// Combined score of the best candidate (0 when unmatched)
    pub score: u8,
    /// Other entries sharing the matched name but with a different code
    pub related: Vec<CatalogEntry>,
    /// Whether the matched name is on the reference list
    pub in_reference_list: bool,
}

impl MatchResult {
    /// Build a result for a line that produced no match.
    pub fn unmatched(line_number: usize, request: RequestLine, outcome: MatchOutcome) -> Self {
        Self {
            line_number,
            request,
            outcome,
            score: 0,
            related: Vec::new(),
            in_reference_list: false,
        }
    }

    /// The selected catalog entry, if any.
    pub fn best_entry(&self) -> Option<&CatalogEntry> {
        match &self.outcome {
            MatchOutcome::Matched(entry) => Some(entry),
            _ => None,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.best_entry().is_some()
    }

    /// Whether the ordered quantity exceeds the matched entry's monthly sales.
    pub fn exceeds_sales_rate(&self) -> bool {
        self.best_entry()
            .map(|entry| entry.is_oversold_by(self.request.quantity))
            .unwrap_or(false)
    }
}
