//! Cross-article gap aggregation
//!
//! Folds the full stream of per-article gap records into one mapping from
//! canonical key to `AggregatedGap`, in a single pass. Aggregate values are
//! order-independent (commutative merge); only the `occurrences` insertion
//! order reflects the input order, kept for traceability. Each run owns its
//! own aggregator exclusively, so concurrent runs never share state.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::normalize::normalize;
use crate::record::{ArticleGapRecord, Category, Severity};

/// Per-severity occurrence counts for one aggregated gap
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub low: u32,
    pub medium: u32,
    pub high: u32,
}

impl SeverityCounts {
    pub fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Low => self.low += 1,
            Severity::Medium => self.medium += 1,
            Severity::High => self.high += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.low + self.medium + self.high
    }

    /// Severity with the highest count; ties resolve toward the more
    /// severe level so the prompt never understates a gap.
    pub fn dominant(&self) -> Severity {
        if self.high >= self.medium && self.high >= self.low {
            Severity::High
        } else if self.medium >= self.low {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

/// One gap concept merged across all articles that reported it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedGap {
    /// Stable merge key from the normalizer
    pub canonical_key: String,
    /// Label of the first record that created this aggregate
    pub display_label: String,
    /// Category the key is scoped to
    pub category: Category,
    /// True if any contributing record used the hashed fallback key
    pub low_confidence: bool,
    /// Distinct article ids, in first-seen order
    pub occurrences: Vec<String>,
    /// Per-severity counts across all contributing records
    pub severity_counts: SeverityCounts,
}

impl AggregatedGap {
    /// Count of distinct articles contributing to this gap
    ///
    /// `occurrences` is deduplicated on insert, so its length is the
    /// distinct-article count.
    pub fn article_count(&self) -> usize {
        self.occurrences.len()
    }
}

/// Single-pass aggregator over the record stream
///
/// Owned exclusively by one run; consumed by `into_aggregates()` when the
/// stream is exhausted.
#[derive(Debug, Default)]
pub struct Aggregator {
    aggregates: IndexMap<String, AggregatedGap>,
    skipped_records: usize,
    low_confidence_keys: Vec<String>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record into the aggregate mapping
    ///
    /// Malformed records (empty article id or gap text) are skipped and
    /// logged; aggregation continues.
    pub fn observe(&mut self, record: &ArticleGapRecord) {
        if record.article_id.trim().is_empty() {
            tracing::warn!("skipping record with empty article_id");
            self.skipped_records += 1;
            return;
        }

        let gap = match normalize(&record.raw_gap_text, record.category) {
            Ok(gap) => gap,
            Err(err) => {
                tracing::warn!(article_id = %record.article_id, %err, "skipping malformed record");
                self.skipped_records += 1;
                return;
            }
        };

        if gap.low_confidence && !self.low_confidence_keys.contains(&gap.canonical_key) {
            self.low_confidence_keys.push(gap.canonical_key.clone());
        }

        let entry = self
            .aggregates
            .entry(gap.canonical_key.clone())
            .or_insert_with(|| AggregatedGap {
                canonical_key: gap.canonical_key,
                display_label: gap.display_label,
                category: gap.category,
                low_confidence: gap.low_confidence,
                occurrences: Vec::new(),
                severity_counts: SeverityCounts::default(),
            });

        entry.low_confidence |= gap.low_confidence;
        if !entry.occurrences.iter().any(|id| id == &record.article_id) {
            entry.occurrences.push(record.article_id.clone());
        }
        entry.severity_counts.record(record.severity);
    }

    /// Fold an entire record stream
    pub fn observe_all<'a, I>(&mut self, records: I)
    where
        I: IntoIterator<Item = &'a ArticleGapRecord>,
    {
        for record in records {
            self.observe(record);
        }
    }

    /// Number of records skipped as malformed
    pub fn skipped_records(&self) -> usize {
        self.skipped_records
    }

    /// Canonical keys that needed the hashed fallback, first-seen order
    pub fn low_confidence_keys(&self) -> &[String] {
        &self.low_confidence_keys
    }

    /// Finish the pass and hand over the aggregate mapping
    pub fn into_aggregates(self) -> IndexMap<String, AggregatedGap> {
        self.aggregates
    }
}
