//! Systemic-gap selection and deterministic priority ranking
//!
//! A gap is systemic when it recurs in at least `min_articles` distinct
//! articles. Systemic gaps are scored by frequency times weighted-average
//! severity, then ranked under a total order (score desc, article count
//! desc, canonical key asc) so the same aggregate set always produces the
//! same sequence.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::aggregate::AggregatedGap;
use crate::config::SeverityWeights;

/// An aggregated gap that passed the recurrence threshold, with its
/// computed priority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemicGap {
    /// Underlying aggregate
    pub gap: AggregatedGap,
    /// `article_count * weighted_average_severity`
    pub priority_score: f64,
    /// 1-based position after the deterministic sort
    pub priority_rank: usize,
}

/// Select every aggregate meeting the recurrence threshold
///
/// Preserves the aggregator's first-seen order; the final order is decided
/// by `rank_gaps`. Raising the threshold never adds gaps.
pub fn systemic_gaps(
    aggregates: &IndexMap<String, AggregatedGap>,
    min_articles: usize,
) -> Vec<AggregatedGap> {
    aggregates
        .values()
        .filter(|gap| gap.article_count() >= min_articles)
        .cloned()
        .collect()
}

/// Weighted-average severity across all occurrences of a gap
///
/// `Σ(count_s * weight_s) / article_count` — rewards gaps that are both
/// frequent and severe over gaps that are merely frequent.
pub fn severity_weight(gap: &AggregatedGap, weights: &SeverityWeights) -> f64 {
    let counts = &gap.severity_counts;
    let weighted = f64::from(counts.low) * weights.low
        + f64::from(counts.medium) * weights.medium
        + f64::from(counts.high) * weights.high;
    weighted / gap.article_count() as f64
}

/// Deterministic priority score for one gap
pub fn priority_score(gap: &AggregatedGap, weights: &SeverityWeights) -> f64 {
    gap.article_count() as f64 * severity_weight(gap, weights)
}

/// Score and rank the systemic set
///
/// Ties break first by higher raw article count, then by lexicographic
/// canonical key, guaranteeing a total order with no run-to-run
/// nondeterminism.
pub fn rank_gaps(gaps: Vec<AggregatedGap>, weights: &SeverityWeights) -> Vec<SystemicGap> {
    let mut scored: Vec<(f64, AggregatedGap)> = gaps
        .into_iter()
        .map(|gap| (priority_score(&gap, weights), gap))
        .collect();

    scored.sort_by(|(score_a, gap_a), (score_b, gap_b)| {
        score_b
            .total_cmp(score_a)
            .then_with(|| gap_b.article_count().cmp(&gap_a.article_count()))
            .then_with(|| gap_a.canonical_key.cmp(&gap_b.canonical_key))
    });

    scored
        .into_iter()
        .enumerate()
        .map(|(idx, (score, gap))| SystemicGap {
            gap,
            priority_score: score,
            priority_rank: idx + 1,
        })
        .collect()
}
