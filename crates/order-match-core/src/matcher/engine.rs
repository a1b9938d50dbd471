//! Structural and combined scoring, best-of-N candidate search.
//!
//! Scoring weights (defaults, see [`MatchConfig`]):
//! - Primary brand: 20% (and a gate: below 70 the structural score is 0)
//! - Secondary brand: 10%
//! - Tertiary brand: 5%
//! - Form: 10%
//! - Pack numbering: 10%
//! - Dosage: 20%
//! - Tail: 15%
//!
//! The combined score blends the structural score (80%) with the price score (20%).

use tracing::{debug, info, warn};

use crate::config::MatchConfig;
use crate::models::{
    CandidateScore, CatalogEntry, MatchOutcome, MatchResult, ParsedName, ReferenceNames,
    RequestLine, StructuralBreakdown,
};

use super::compare::{compare_dosages, compare_prices, ratio, round_score, weighted_ratio};
use super::decomposer::NameDecomposer;
use super::related::RelatedLookup;
use super::MatcherResult;

/// Scores order lines against catalog entries.
#[derive(Debug, Clone, Default)]
pub struct MatchEngine {
    config: MatchConfig,
    decomposer: NameDecomposer,
}

impl MatchEngine {
    /// Create an engine with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with a custom configuration.
    pub fn with_config(config: MatchConfig) -> MatcherResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            decomposer: NameDecomposer::new(),
        })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Get the decomposer for direct access.
    pub fn decomposer(&self) -> &NameDecomposer {
        &self.decomposer
    }

    /// Decompose a raw name.
    pub fn decompose(&self, raw: &str) -> ParsedName {
        self.decomposer.decompose(raw)
    }

    /// Score two raw names with their prices.
    pub fn score_pair(
        &self,
        name_a: &str,
        price_a: Option<f64>,
        name_b: &str,
        price_b: Option<f64>,
    ) -> CandidateScore {
        let a = self.decompose(name_a);
        let b = self.decompose(name_b);
        self.score_parsed(&a, price_a, &b, price_b)
    }

    /// Combined score of two raw names with their prices.
    pub fn compare_full(
        &self,
        name_a: &str,
        price_a: Option<f64>,
        name_b: &str,
        price_b: Option<f64>,
    ) -> u8 {
        self.score_pair(name_a, price_a, name_b, price_b).combined
    }

    /// Score two already decomposed names.
    pub fn score_parsed(
        &self,
        a: &ParsedName,
        price_a: Option<f64>,
        b: &ParsedName,
        price_b: Option<f64>,
    ) -> CandidateScore {
        let brand1 = ratio(&a.brand1, &b.brand1);

        let breakdown = (brand1 >= self.config.brand_gate).then(|| StructuralBreakdown {
            brand1,
            brand2: optional_ratio(&a.brand2, &b.brand2),
            brand3: optional_ratio(&a.brand3, &b.brand3),
            form: tag_score(a.form.as_deref(), b.form.as_deref()),
            numbering: tag_score(a.numbering.as_deref(), b.numbering.as_deref()),
            dosage: compare_dosages(
                &a.dosage,
                &b.dosage,
                self.config.dosage_tolerance,
                self.config.dosage_strict_threshold,
            ),
            tail: weighted_ratio(&a.tail, &b.tail),
        });

        let structural = breakdown
            .map(|b| round_score(b.weighted_score(&self.config.weights)))
            .unwrap_or(0);
        let price = compare_prices(price_a, price_b, self.config.price_tolerance);
        let combined = round_score(
            f64::from(structural) * self.config.structural_share
                + f64::from(price) * self.config.price_share,
        );

        CandidateScore {
            breakdown,
            brand1,
            structural,
            price,
            combined,
        }
    }

    /// Find the best candidate for an order line.
    ///
    /// Candidates are scanned in the given order; entries without a name are
    /// skipped. Only a strictly greater score replaces the current best, so
    /// ties keep the earliest candidate. A best score of 0 is no match.
    pub fn best_match<'c>(
        &self,
        line: &RequestLine,
        candidates: &'c [CatalogEntry],
    ) -> Option<(&'c CatalogEntry, CandidateScore)> {
        let request = self.decompose(&line.raw_name);

        let mut best: Option<(&'c CatalogEntry, CandidateScore)> = None;
        for entry in candidates.iter().filter(|e| e.has_name()) {
            let candidate = self.decompose(&entry.name);
            let score = self.score_parsed(
                &request,
                line.declared_price,
                &candidate,
                entry.average_price,
            );
            let improves = best
                .as_ref()
                .map_or(true, |(_, current)| score.combined > current.combined);
            if improves {
                best = Some((entry, score));
            }
        }

        best.filter(|(_, score)| score.combined > 0)
    }

    /// Match one order line and enrich the result with related entries and
    /// reference membership.
    pub fn match_line(
        &self,
        line_number: usize,
        line: &RequestLine,
        candidates: &[CatalogEntry],
        related: &dyn RelatedLookup,
        reference: &ReferenceNames,
    ) -> MatchResult {
        if !line.has_name() {
            debug!(line_number, "Empty order line name");
            return MatchResult::unmatched(line_number, line.clone(), MatchOutcome::EmptyName);
        }
        if candidates.is_empty() {
            return MatchResult::unmatched(line_number, line.clone(), MatchOutcome::NoCandidates);
        }

        let Some((entry, score)) = self.best_match(line, candidates) else {
            debug!(line_number, name = %line.raw_name, "No match");
            return MatchResult::unmatched(line_number, line.clone(), MatchOutcome::NoMatch);
        };

        debug!(
            line_number,
            name = %line.raw_name,
            best = %entry.name,
            structural = score.structural,
            price = score.price,
            combined = score.combined,
            "Matched order line"
        );

        let related_entries = related.related_entries(entry).unwrap_or_else(|e| {
            warn!(code = %entry.code, error = %e, "Related entry lookup failed");
            Vec::new()
        });

        MatchResult {
            line_number,
            request: line.clone(),
            outcome: MatchOutcome::Matched(entry.clone()),
            score: score.combined,
            related: related_entries,
            in_reference_list: reference.contains(&entry.name),
        }
    }

    /// Match every line of a batch. Line numbers start at 1.
    pub fn match_batch(
        &self,
        lines: &[RequestLine],
        candidates: &[CatalogEntry],
        related: &dyn RelatedLookup,
        reference: &ReferenceNames,
    ) -> Vec<MatchResult> {
        info!(
            lines = lines.len(),
            candidates = candidates.len(),
            "Matching order lines"
        );
        if candidates.is_empty() {
            warn!("No catalog entries to match against");
        }

        let results: Vec<MatchResult> = lines
            .iter()
            .enumerate()
            .map(|(i, line)| self.match_line(i + 1, line, candidates, related, reference))
            .collect();

        info!(
            matched = results.iter().filter(|r| r.is_matched()).count(),
            total = results.len(),
            "Matching finished"
        );
        results
    }
}

/// Similarity of optional brand slots; two empty slots agree.
fn optional_ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() && b.is_empty() {
        100
    } else {
        ratio(a, b)
    }
}

/// Exact agreement of optional tags; two missing tags agree.
fn tag_score(a: Option<&str>, b: Option<&str>) -> u8 {
    if a == b {
        100
    } else {
        0
    }
}
