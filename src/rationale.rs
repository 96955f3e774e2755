//! Rationale generation via an external reasoning service
//!
//! Each systemic gap gets a bounded prompt built from exactly four fields:
//! gap label, category, affected-article count, dominant severity. The
//! service sits behind the narrow `ReasoningClient` capability trait so the
//! engine is testable with a deterministic stub. Failures are contained per
//! gap: the gap still surfaces in the report with rationale absent, marked
//! for manual follow-up in run diagnostics.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cancellation::CancellationToken;
use crate::config::{AuditConfig, RetryConfig};
use crate::errors::ServiceError;
use crate::scoring::SystemicGap;

/// Narrow capability interface to the external reasoning service
///
/// One operation: turn a bounded prompt into result text. Implementations
/// wrap a concrete provider; tests use a deterministic stub.
#[async_trait]
pub trait ReasoningClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError>;
}

/// Successfully generated rationale for one systemic gap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RationaleResult {
    pub canonical_key: String,
    pub rationale_text: String,
    pub generated_at: DateTime<Utc>,
}

/// Per-gap rationale failure, surfaced in run diagnostics only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RationaleWarning {
    pub canonical_key: String,
    pub error: ServiceError,
}

/// Result of enriching a systemic set with rationales
#[derive(Debug, Default)]
pub struct RationaleOutcome {
    /// Generated rationales, keyed by canonical key
    pub results: HashMap<String, RationaleResult>,
    /// Gaps whose rationale generation failed; marked for manual follow-up
    pub warnings: Vec<RationaleWarning>,
    /// True when enrichment stopped early on caller cancellation
    pub cancelled: bool,
}

/// Build the fixed prompt for one systemic gap
///
/// The template carries only the four allowed fields; no other free-form
/// content reaches the service, bounding its response space.
pub fn build_prompt(gap: &SystemicGap) -> String {
    format!(
        "Write one short sentence explaining why this documentation gap matters.\n\
         \n\
         Gap: {}\n\
         Category: {}\n\
         Affected articles: {}\n\
         Dominant severity: {}\n\
         \n\
         Focus only on user impact.\n\
         No explanations.\n\
         No filler.",
        gap.gap.display_label,
        gap.gap.category,
        gap.gap.article_count(),
        gap.gap.severity_counts.dominant(),
    )
}

/// Requester with per-run response cache and bounded concurrency
pub struct RationaleRequester {
    client: Arc<dyn ReasoningClient>,
    timeout: Duration,
    retry: RetryConfig,
    max_concurrency: usize,
    min_len: usize,
    max_len: usize,
}

impl RationaleRequester {
    pub fn new(client: Arc<dyn ReasoningClient>, config: &AuditConfig) -> Self {
        Self {
            client,
            timeout: config.service_timeout,
            retry: config.retry.clone(),
            max_concurrency: config.max_concurrency,
            min_len: config.min_rationale_len,
            max_len: config.max_rationale_len,
        }
    }

    /// Generate rationales for the systemic set
    ///
    /// Requests for distinct keys run concurrently up to the configured
    /// limit. Cancellation is checked between gaps, never mid-gap: chunks
    /// already dispatched run to completion and their results are kept.
    pub async fn enrich(
        &self,
        gaps: &[SystemicGap],
        token: &CancellationToken,
    ) -> RationaleOutcome {
        let mut outcome = RationaleOutcome::default();

        for chunk in gaps.chunks(self.max_concurrency.max(1)) {
            if token.is_cancelled() {
                tracing::info!("rationale enrichment cancelled between gaps");
                outcome.cancelled = true;
                break;
            }

            let mut handles = Vec::with_capacity(chunk.len());
            for gap in chunk {
                let key = gap.gap.canonical_key.clone();
                if outcome.results.contains_key(&key) {
                    tracing::debug!(%key, "rationale cache hit");
                    continue;
                }

                let client = Arc::clone(&self.client);
                let prompt = build_prompt(gap);
                let timeout = self.timeout;
                let retry = self.retry.clone();
                let bounds = (self.min_len, self.max_len);

                handles.push((
                    key,
                    tokio::spawn(async move {
                        request_with_retry(client, &prompt, timeout, &retry, bounds).await
                    }),
                ));
            }

            for (key, handle) in handles {
                let result = match handle.await {
                    Ok(result) => result,
                    Err(err) => Err(ServiceError::Transport(format!("task failed: {err}"))),
                };

                match result {
                    Ok(rationale_text) => {
                        outcome.results.insert(
                            key.clone(),
                            RationaleResult {
                                canonical_key: key,
                                rationale_text,
                                generated_at: Utc::now(),
                            },
                        );
                    }
                    Err(error) => {
                        tracing::warn!(%key, %error, "rationale generation failed");
                        outcome.warnings.push(RationaleWarning {
                            canonical_key: key,
                            error,
                        });
                    }
                }
            }
        }

        outcome
    }
}

/// Call the service with a timeout and a fixed retry budget
///
/// Retries only transient failures; malformed responses and quota
/// exhaustion fail immediately.
async fn request_with_retry(
    client: Arc<dyn ReasoningClient>,
    prompt: &str,
    timeout: Duration,
    retry: &RetryConfig,
    (min_len, max_len): (usize, usize),
) -> Result<String, ServiceError> {
    let mut attempt = 0u32;
    loop {
        let result = match tokio::time::timeout(timeout, client.generate(prompt)).await {
            Ok(inner) => inner,
            Err(_) => Err(ServiceError::Timeout(timeout.as_millis() as u64)),
        };

        let error = match result {
            Ok(text) => match validate_response(&text, min_len, max_len) {
                Ok(valid) => return Ok(valid),
                Err(err) => err,
            },
            Err(err) => err,
        };

        if !error.is_retryable() || attempt >= retry.max_retries {
            return Err(error);
        }

        let delay = backoff_delay(retry, attempt);
        tracing::debug!(attempt, ?delay, %error, "retrying reasoning service call");
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

/// Exponential backoff with optional jitter
fn backoff_delay(retry: &RetryConfig, attempt: u32) -> Duration {
    let base = retry.initial_delay.as_millis() as f64 * retry.backoff_factor.powi(attempt as i32);
    let capped = base.min(retry.max_delay.as_millis() as f64);

    let millis = if retry.jitter {
        // Scale into [0.5, 1.0) of the capped delay to spread retries out.
        capped * rand::thread_rng().gen_range(0.5..1.0)
    } else {
        capped
    };

    Duration::from_millis(millis as u64)
}

/// Validate a service response before accepting it as a rationale
fn validate_response(text: &str, min_len: usize, max_len: usize) -> Result<String, ServiceError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::MalformedResponse("empty response".to_string()));
    }

    let len = trimmed.chars().count();
    if len < min_len || len > max_len {
        return Err(ServiceError::MalformedResponse(format!(
            "response length {} outside bounds {}..={}",
            len, min_len, max_len
        )));
    }

    Ok(trimmed.to_string())
}
