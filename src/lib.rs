//! Docgap — gap aggregation and prioritization engine
//!
//! Audits a help-documentation corpus by turning per-article structured gap
//! observations into a deduplicated, cross-article systemic-gap report:
//! - Normalization: canonicalize free-text gap statements into stable keys
//! - Aggregation: merge equivalent gaps across an unbounded article set
//! - Prioritization: deterministic frequency-times-severity ranking
//! - Rationale: bounded prompts to an external reasoning service

// Module declarations
pub mod aggregate;
pub mod cancellation;
pub mod config;
pub mod engine;
pub mod errors;
pub mod normalize;
pub mod rationale;
pub mod record;
pub mod report;
pub mod scoring;

// Re-export main types
pub use record::{ArticleGapRecord, Category, ContentType, Severity};

pub use normalize::{normalize, CanonicalGap};

pub use aggregate::{AggregatedGap, Aggregator, SeverityCounts};

pub use scoring::{priority_score, rank_gaps, severity_weight, systemic_gaps, SystemicGap};

pub use rationale::{
    build_prompt, RationaleOutcome, RationaleRequester, RationaleResult, RationaleWarning,
    ReasoningClient,
};

pub use report::{assemble, GapReportRow};

pub use engine::{AuditEngine, AuditReport, RunDiagnostics, RunId};

pub use config::{AuditConfig, RetryConfig, SeverityWeights};

pub use cancellation::CancellationToken;

pub use errors::{AuditError, Result, ServiceError};

/// Version of the docgap crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the engine's logging hook
pub fn init() {
    tracing::info!("Docgap engine v{}", VERSION);
}
