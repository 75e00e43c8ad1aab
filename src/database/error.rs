//! Error types surfaced by the resilient executor.
//!
//! # Design Decisions
//! - Remote call failures propagate as the original `DbError`, never wrapped
//!   in a retry-specific error
//! - The failure category is computed on demand (`SqlError::kind`) rather than
//!   stored, so the error the caller sees is exactly what the provider raised

use std::time::Duration;

use thiserror::Error;

use crate::resilience::classifier::{classify, FailureCategory};

/// A failure reported by the data-store provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("provider error {number}: {message}")]
pub struct DbError {
    /// Provider-specific error signal.
    pub number: i32,
    /// Human-readable provider message.
    pub message: String,
}

impl DbError {
    pub fn new(number: i32, message: impl Into<String>) -> Self {
        Self {
            number,
            message: message.into(),
        }
    }
}

/// Every failure the executor can return to a caller.
#[derive(Debug, Error)]
pub enum SqlError {
    /// The remote call itself failed.
    #[error(transparent)]
    Provider(#[from] DbError),

    /// The connection factory could not produce a connection.
    /// Raised before the resiliency pipeline is entered, so never retried.
    #[error("failed to acquire connection: {0}")]
    ConnectionAcquisition(#[source] DbError),

    /// The timeout policy aborted the operation, including all of its retries.
    #[error("operation exceeded timeout of {timeout:?}")]
    TimeoutExceeded { timeout: Duration },
}

/// The tag a caller can read off any `SqlError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    TimeoutExceeded,
    Transient,
    Networking,
    Unclassified,
    ConnectionAcquisition,
}

impl SqlError {
    /// Provider error signal, for remote call failures only.
    pub fn number(&self) -> Option<i32> {
        match self {
            SqlError::Provider(err) => Some(err.number),
            _ => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SqlError::TimeoutExceeded { .. } => ErrorKind::TimeoutExceeded,
            SqlError::ConnectionAcquisition(_) => ErrorKind::ConnectionAcquisition,
            SqlError::Provider(_) => match classify(self) {
                FailureCategory::Transient => ErrorKind::Transient,
                FailureCategory::Networking => ErrorKind::Networking,
                FailureCategory::Unclassified => ErrorKind::Unclassified,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags_provider_errors_by_category() {
        assert_eq!(SqlError::from(DbError::new(1205, "deadlock")).kind(), ErrorKind::Transient);
        assert_eq!(SqlError::from(DbError::new(53, "no route")).kind(), ErrorKind::Networking);
        assert_eq!(SqlError::from(DbError::new(2627, "dup key")).kind(), ErrorKind::Unclassified);
    }

    #[test]
    fn test_kind_for_engine_errors() {
        let timeout = SqlError::TimeoutExceeded { timeout: Duration::from_secs(5) };
        assert_eq!(timeout.kind(), ErrorKind::TimeoutExceeded);
        assert_eq!(timeout.number(), None);

        // A networking signal raised during acquisition is still not classified.
        let acquisition = SqlError::ConnectionAcquisition(DbError::new(53, "no route"));
        assert_eq!(acquisition.kind(), ErrorKind::ConnectionAcquisition);
        assert_eq!(acquisition.number(), None);
    }

    #[test]
    fn test_provider_error_display_is_unwrapped() {
        let err = SqlError::from(DbError::new(1205, "chosen as deadlock victim"));
        assert_eq!(err.to_string(), "provider error 1205: chosen as deadlock victim");
    }
}
