//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound the whole downstream pipeline (every attempt and every backoff
//!   wait) with a single deadline
//! - Cancel the in-flight work when the deadline passes
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; dropping the inner future cancels it
//! - `TimeoutExceeded` is distinct from provider errors and never retried

use std::future::Future;
use std::time::Duration;

use tracing::Level;

use crate::database::connection::Connection;
use crate::database::context::ExecutionContext;
use crate::database::error::SqlError;
use crate::observability::logging::LogFields;
use crate::observability::metrics;

#[derive(Debug, Clone)]
pub struct TimeoutPolicy {
    max_timeout: Duration,
}

impl TimeoutPolicy {
    pub fn new(max_timeout: Duration) -> Self {
        Self { max_timeout }
    }

    pub fn max_timeout(&self) -> Duration {
        self.max_timeout
    }

    pub async fn run<C, T, Fut>(
        &self,
        ctx: &ExecutionContext<'_, C>,
        operation: Fut,
    ) -> Result<T, SqlError>
    where
        C: Connection,
        Fut: Future<Output = Result<T, SqlError>>,
    {
        match tokio::time::timeout(self.max_timeout, operation).await {
            Ok(result) => result,
            Err(_) => {
                let err = SqlError::TimeoutExceeded {
                    timeout: self.max_timeout,
                };

                let mut fields = LogFields::new();
                fields.insert("max_timeout_seconds", self.max_timeout.as_secs_f64().to_string());
                fields.insert("operation", ctx.operation().to_string());
                fields.insert("invocation_id", ctx.invocation_id().to_string());
                ctx.logger()
                    .log(Level::WARN, "timeout policy exceeded", Some(&err), &fields);
                metrics::record_timeout();

                Err(err)
            }
        }
    }
}
