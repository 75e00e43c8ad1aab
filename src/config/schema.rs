//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::resilience::{RetryPolicyParams, RetryPolicyParamsError};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Resiliency settings for data-store calls.
    pub sql: SqlSettings,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Retry and timeout settings for data-store calls.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SqlSettings {
    /// Retries per policy layer (transient and networking each).
    #[serde(alias = "SqlDefaultRetryCount")]
    pub sql_default_retry_count: u32,

    /// Deadline over an operation and all of its retries, in seconds.
    #[serde(alias = "SqlTimeoutPolicySeconds")]
    pub sql_timeout_policy_seconds: u64,
}

impl Default for SqlSettings {
    fn default() -> Self {
        Self {
            sql_default_retry_count: 3,
            sql_timeout_policy_seconds: 30,
        }
    }
}

impl SqlSettings {
    pub fn policy_params(&self) -> Result<RetryPolicyParams, RetryPolicyParamsError> {
        RetryPolicyParams::new(
            self.sql_default_retry_count,
            Duration::from_secs(self.sql_timeout_policy_seconds),
        )
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level or filter directive (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
