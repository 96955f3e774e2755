//! Final report assembly
//!
//! Joins ranked systemic gaps with their rationales into the ordered row
//! sequence handed to the external delivery layer. Row identity for
//! idempotent re-delivery is the canonical key, which is stable across runs
//! given identical inputs; the rank may shift as new articles are added.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::aggregate::SeverityCounts;
use crate::rationale::RationaleResult;
use crate::record::Category;
use crate::scoring::SystemicGap;

/// One row of the final systemic-gap report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapReportRow {
    /// 1-based rank from the priority scorer
    pub priority_rank: usize,
    /// Display id derived from the rank, e.g. "GAP-001"
    pub row_id: String,
    /// Stable row identity across runs
    pub canonical_key: String,
    pub display_label: String,
    pub category: Category,
    pub article_count: usize,
    pub severity_breakdown: SeverityCounts,
    pub priority_score: f64,
    /// Suggested title for the article that would close this gap
    pub suggested_title: String,
    /// Absent when rationale generation failed or was skipped
    pub rationale: Option<String>,
}

/// Suggested title for a new article covering the gap
fn suggest_title(display_label: &str) -> String {
    format!("Guide: {}", display_label)
}

/// Produce the final ordered row sequence
///
/// Rows come out sorted by `priority_rank` ascending. A missing rationale
/// never blocks the row.
pub fn assemble(
    gaps: &[SystemicGap],
    rationales: &HashMap<String, RationaleResult>,
) -> Vec<GapReportRow> {
    let mut rows: Vec<GapReportRow> = gaps
        .iter()
        .map(|systemic| {
            let gap = &systemic.gap;
            GapReportRow {
                priority_rank: systemic.priority_rank,
                row_id: format!("GAP-{:03}", systemic.priority_rank),
                canonical_key: gap.canonical_key.clone(),
                display_label: gap.display_label.clone(),
                category: gap.category,
                article_count: gap.article_count(),
                severity_breakdown: gap.severity_counts,
                priority_score: systemic.priority_score,
                suggested_title: suggest_title(&gap.display_label),
                rationale: rationales
                    .get(&gap.canonical_key)
                    .map(|r| r.rationale_text.clone()),
            }
        })
        .collect();

    rows.sort_by_key(|row| row.priority_rank);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::aggregate::AggregatedGap;

    fn systemic(key: &str, rank: usize) -> SystemicGap {
        SystemicGap {
            gap: AggregatedGap {
                canonical_key: key.to_string(),
                display_label: "Api rate limits".to_string(),
                category: Category::Api,
                low_confidence: false,
                occurrences: vec!["a".to_string(), "b".to_string()],
                severity_counts: SeverityCounts { low: 0, medium: 2, high: 0 },
            },
            priority_score: 4.0,
            priority_rank: rank,
        }
    }

    #[test]
    fn test_rows_sorted_by_rank_ascending() {
        let gaps = vec![systemic("api::b", 2), systemic("api::a", 1)];
        let rows = assemble(&gaps, &HashMap::new());

        assert_eq!(rows[0].priority_rank, 1);
        assert_eq!(rows[0].canonical_key, "api::a");
        assert_eq!(rows[1].priority_rank, 2);
    }

    #[test]
    fn test_row_id_format() {
        let rows = assemble(&[systemic("api::a", 7)], &HashMap::new());
        assert_eq!(rows[0].row_id, "GAP-007");
    }

    #[test]
    fn test_rationale_joined_when_present() {
        let mut rationales = HashMap::new();
        rationales.insert(
            "api::a".to_string(),
            RationaleResult {
                canonical_key: "api::a".to_string(),
                rationale_text: "Users cannot plan around undocumented limits.".to_string(),
                generated_at: Utc::now(),
            },
        );

        let rows = assemble(&[systemic("api::a", 1), systemic("api::b", 2)], &rationales);

        assert_eq!(
            rows[0].rationale.as_deref(),
            Some("Users cannot plan around undocumented limits.")
        );
        assert!(rows[1].rationale.is_none());
    }

    #[test]
    fn test_suggested_title_derived_from_label() {
        let rows = assemble(&[systemic("api::a", 1)], &HashMap::new());
        assert_eq!(rows[0].suggested_title, "Guide: Api rate limits");
    }

    #[test]
    fn test_rows_serialize_for_delivery() {
        let rows = assemble(&[systemic("api::a", 1)], &HashMap::new());
        let json = serde_json::to_string(&rows).unwrap();
        assert!(json.contains("\"GAP-001\""));
        assert!(json.contains("\"api::a\""));
    }
}
