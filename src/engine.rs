//! Audit run orchestration
//!
//! `AuditEngine` wires the stages together: aggregate, filter, score,
//! enrich, assemble. All run state is scoped to the run itself, so
//! concurrent runs over the same corpus are fully independent. A completed
//! run always yields a best-effort report; partial rationale coverage is
//! expected and never blocks delivery.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregator;
use crate::cancellation::CancellationToken;
use crate::config::AuditConfig;
use crate::errors::Result;
use crate::rationale::{RationaleRequester, RationaleWarning, ReasoningClient};
use crate::record::ArticleGapRecord;
use crate::report::{assemble, GapReportRow};
use crate::scoring::{rank_gaps, systemic_gaps};

/// Unique identifier for one audit run
///
/// UUID v4 wrapper; fresh per run, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(uuid::Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-run diagnostics for non-fatal, per-item failures
#[derive(Debug, Clone, Default)]
pub struct RunDiagnostics {
    /// Records consumed from the input stream
    pub total_records: usize,
    /// Malformed records skipped during aggregation
    pub skipped_records: usize,
    /// Canonical keys that needed the hashed normalization fallback
    pub low_confidence_keys: Vec<String>,
    /// Per-gap rationale failures, marked for manual follow-up
    pub rationale_warnings: Vec<RationaleWarning>,
    /// True when the run was cancelled during rationale enrichment
    pub cancelled: bool,
}

/// Output of one audit run
#[derive(Debug)]
pub struct AuditReport {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Final ordered rows, sorted by priority rank ascending
    pub rows: Vec<GapReportRow>,
    pub diagnostics: RunDiagnostics,
}

/// The gap aggregation and prioritization engine
///
/// Holds the run configuration and the reasoning-service client; each call
/// to [`run`](Self::run) owns its state exclusively.
pub struct AuditEngine {
    config: AuditConfig,
    client: Arc<dyn ReasoningClient>,
}

impl AuditEngine {
    pub fn new(config: AuditConfig, client: Arc<dyn ReasoningClient>) -> Self {
        Self { config, client }
    }

    /// Execute one audit run over a record stream
    ///
    /// Configuration is validated before any record is consumed; that is
    /// the only fatal error path. Cancellation takes effect between gaps
    /// during rationale enrichment, leaving completed results intact.
    pub async fn run<I>(&self, records: I, token: &CancellationToken) -> Result<AuditReport>
    where
        I: IntoIterator<Item = ArticleGapRecord>,
    {
        self.config.validate()?;

        let run_id = RunId::new();
        let started_at = Utc::now();
        tracing::info!(%run_id, "audit run started");

        let mut total_records = 0usize;
        let mut aggregator = Aggregator::new();
        for record in records {
            total_records += 1;
            aggregator.observe(&record);
        }

        let skipped_records = aggregator.skipped_records();
        let low_confidence_keys = aggregator.low_confidence_keys().to_vec();
        let aggregates = aggregator.into_aggregates();

        let systemic = systemic_gaps(&aggregates, self.config.min_articles);
        let ranked = rank_gaps(systemic, &self.config.severity_weights);
        tracing::info!(
            %run_id,
            aggregates = aggregates.len(),
            systemic = ranked.len(),
            "aggregation complete"
        );

        let requester = RationaleRequester::new(Arc::clone(&self.client), &self.config);
        let outcome = requester.enrich(&ranked, token).await;

        let rows = assemble(&ranked, &outcome.results);

        let diagnostics = RunDiagnostics {
            total_records,
            skipped_records,
            low_confidence_keys,
            rationale_warnings: outcome.warnings,
            cancelled: outcome.cancelled,
        };

        let finished_at = Utc::now();
        tracing::info!(
            %run_id,
            rows = rows.len(),
            rationale_failures = diagnostics.rationale_warnings.len(),
            cancelled = diagnostics.cancelled,
            "audit run finished"
        );

        Ok(AuditReport {
            run_id,
            started_at,
            finished_at,
            rows,
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::errors::{AuditError, ServiceError};
    use crate::record::{Category, ContentType, Severity};

    struct StubClient;

    #[async_trait]
    impl ReasoningClient for StubClient {
        async fn generate(&self, _prompt: &str) -> std::result::Result<String, ServiceError> {
            Ok("Users cannot plan around undocumented limits.".to_string())
        }
    }

    fn record(article: &str, text: &str) -> ArticleGapRecord {
        ArticleGapRecord::new(
            article,
            Category::Api,
            ContentType::Reference,
            Severity::High,
            text,
        )
    }

    #[test]
    fn test_run_id_uniqueness() {
        assert_ne!(RunId::new(), RunId::new());
    }

    #[tokio::test]
    async fn test_invalid_config_aborts_before_processing() {
        let config = AuditConfig {
            min_articles: 0,
            ..AuditConfig::default()
        };
        let engine = AuditEngine::new(config, Arc::new(StubClient));

        let result = engine
            .run(vec![record("a", "missing error codes")], &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(AuditError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_empty_stream_yields_empty_report() {
        let engine = AuditEngine::new(AuditConfig::default(), Arc::new(StubClient));
        let report = engine.run(Vec::new(), &CancellationToken::new()).await.unwrap();

        assert!(report.rows.is_empty());
        assert_eq!(report.diagnostics.total_records, 0);
    }
}
