//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeout > 0, bounded retry count)
//! - Validate the log filter directive
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::AppConfig;

/// Upper bound on retries per layer. 2^30 seconds is already decades.
pub const MAX_RETRY_COUNT: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("sql_timeout_policy_seconds must be greater than zero")]
    ZeroTimeout,

    #[error("sql_default_retry_count must be at most {MAX_RETRY_COUNT} (got {0})")]
    TooManyRetries(u32),

    #[error("invalid log_level {0:?}")]
    InvalidLogLevel(String),
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.sql.sql_timeout_policy_seconds == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if config.sql.sql_default_retry_count > MAX_RETRY_COUNT {
        errors.push(ValidationError::TooManyRetries(config.sql.sql_default_retry_count));
    }
    if EnvFilter::try_new(&config.observability.log_level).is_err() {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
