//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Operation against an open connection:
//!     → timeouts.rs (one deadline over everything below)
//!     → retries.rs, transient policy (classifier.rs: transient table)
//!     → retries.rs, networking policy (classifier.rs: networking table)
//!     → operation
//! On a handled failure: backoff.rs computes the wait, then the layer retries
//! ```
//!
//! # Design Decisions
//! - Layers are small stateless strategies combined in an explicit
//!   outer-to-inner list (pipeline.rs)
//! - Unclassified failures are never retried
//! - Backoff is not jittered

use std::time::Duration;

use thiserror::Error;

pub mod backoff;
pub mod classifier;
pub mod pipeline;
pub mod retries;
pub mod timeouts;

pub use classifier::{classify, FailureCategory};
pub use pipeline::{Pipeline, PolicyLayer};
pub use retries::{RetryDecision, RetryPolicy};
pub use timeouts::TimeoutPolicy;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetryPolicyParamsError {
    #[error("max_timeout must be greater than zero")]
    ZeroTimeout,
}

/// Retry count and overall deadline, fixed for the lifetime of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicyParams {
    max_retries: u32,
    max_timeout: Duration,
}

impl RetryPolicyParams {
    pub fn new(max_retries: u32, max_timeout: Duration) -> Result<Self, RetryPolicyParamsError> {
        if max_timeout.is_zero() {
            return Err(RetryPolicyParamsError::ZeroTimeout);
        }
        Ok(Self {
            max_retries,
            max_timeout,
        })
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn max_timeout(&self) -> Duration {
        self.max_timeout
    }
}
