//! Run configuration and validation
//!
//! Configuration is validated once, before any processing starts. A bad
//! threshold or weight table is the only class of failure that aborts a run;
//! everything downstream is contained per item.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{AuditError, Result};

/// Weight table mapping severity to its scoring weight
///
/// Must be positive and monotonic (low <= medium <= high) so that more
/// severe gaps never score below less severe ones.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeverityWeights {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for SeverityWeights {
    fn default() -> Self {
        Self {
            low: 1.0,
            medium: 2.0,
            high: 3.0,
        }
    }
}

impl SeverityWeights {
    fn validate(&self) -> Result<()> {
        if self.low <= 0.0 || self.medium <= 0.0 || self.high <= 0.0 {
            return Err(AuditError::InvalidConfig(format!(
                "severity weights must be positive, got low={} medium={} high={}",
                self.low, self.medium, self.high
            )));
        }
        if self.low > self.medium || self.medium > self.high {
            return Err(AuditError::InvalidConfig(format!(
                "severity weights must be monotonic (low <= medium <= high), \
                 got low={} medium={} high={}",
                self.low, self.medium, self.high
            )));
        }
        Ok(())
    }
}

/// Configuration for retry behavior on transient reasoning-service failures
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the initial call
    pub max_retries: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay cap
    pub max_delay: Duration,
    /// Backoff multiplier (default: 2.0 for exponential)
    pub backoff_factor: f64,
    /// Whether to add jitter to delay
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(10),
            backoff_factor: 2.0,
            jitter: true,
        }
    }
}

/// Top-level configuration for one audit run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Minimum distinct articles for a gap to count as systemic (default: 2)
    pub min_articles: usize,
    /// Severity-to-weight table used by the priority scorer
    pub severity_weights: SeverityWeights,
    /// Per-call timeout for the reasoning service
    pub service_timeout: Duration,
    /// Retry policy for transient reasoning-service failures
    pub retry: RetryConfig,
    /// Maximum rationale requests in flight at once
    pub max_concurrency: usize,
    /// Minimum accepted rationale length, in characters
    pub min_rationale_len: usize,
    /// Maximum accepted rationale length, in characters
    pub max_rationale_len: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            min_articles: 2,
            severity_weights: SeverityWeights::default(),
            service_timeout: Duration::from_secs(20),
            retry: RetryConfig::default(),
            max_concurrency: 4,
            min_rationale_len: 15,
            max_rationale_len: 160,
        }
    }
}

impl AuditConfig {
    /// Validate the configuration before processing starts
    ///
    /// This is the only fatal error path in a run: misconfiguration aborts
    /// before any record is consumed.
    pub fn validate(&self) -> Result<()> {
        if self.min_articles == 0 {
            return Err(AuditError::InvalidConfig(
                "min_articles must be at least 1".to_string(),
            ));
        }
        self.severity_weights.validate()?;
        if self.max_concurrency == 0 {
            return Err(AuditError::InvalidConfig(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.min_rationale_len > self.max_rationale_len {
            return Err(AuditError::InvalidConfig(format!(
                "rationale length bounds inverted: min={} > max={}",
                self.min_rationale_len, self.max_rationale_len
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AuditConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let config = AuditConfig {
            min_articles: 0,
            ..AuditConfig::default()
        };
        assert!(matches!(config.validate(), Err(AuditError::InvalidConfig(_))));
    }

    #[test]
    fn test_non_positive_weights_rejected() {
        let config = AuditConfig {
            severity_weights: SeverityWeights {
                low: 0.0,
                medium: 2.0,
                high: 3.0,
            },
            ..AuditConfig::default()
        };
        assert!(matches!(config.validate(), Err(AuditError::InvalidConfig(_))));
    }

    #[test]
    fn test_non_monotonic_weights_rejected() {
        let config = AuditConfig {
            severity_weights: SeverityWeights {
                low: 3.0,
                medium: 2.0,
                high: 1.0,
            },
            ..AuditConfig::default()
        };
        assert!(matches!(config.validate(), Err(AuditError::InvalidConfig(_))));
    }

    #[test]
    fn test_inverted_rationale_bounds_rejected() {
        let config = AuditConfig {
            min_rationale_len: 200,
            max_rationale_len: 160,
            ..AuditConfig::default()
        };
        assert!(matches!(config.validate(), Err(AuditError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let config = AuditConfig {
            max_concurrency: 0,
            ..AuditConfig::default()
        };
        assert!(matches!(config.validate(), Err(AuditError::InvalidConfig(_))));
    }
}
