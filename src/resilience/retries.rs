//! Retry logic.
//!
//! # Responsibilities
//! - Decide whether a failure is handled by this policy (by category)
//! - Retry handled failures with exponential backoff, up to `max_retries`
//! - Emit one warn event per retry through the context's logger
//!
//! # Design Decisions
//! - The policy is stateless; the retry counter lives in the invocation's
//!   own future, so one policy is shared by any number of concurrent calls
//! - Exhausted failures propagate as the original error, unwrapped
//! - Failures outside the policy's category pass through untouched and
//!   unlogged

use std::future::Future;
use std::time::Duration;

use tracing::Level;

use crate::database::connection::Connection;
use crate::database::context::ExecutionContext;
use crate::database::error::SqlError;
use crate::observability::logging::LogFields;
use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;
use crate::resilience::classifier::{classify, table_for, FailureCategory};

/// Outcome of applying a retry policy to one failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait `delay`, then make retry number `attempt`.
    Retry { attempt: u32, delay: Duration },
    /// Handled by this policy, but the retry budget is spent.
    Exhausted,
    /// Not this policy's category.
    NotHandled,
}

/// Retries failures of a single category.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    name: &'static str,
    category: FailureCategory,
    max_retries: u32,
}

impl RetryPolicy {
    pub fn transient(max_retries: u32) -> Self {
        Self {
            name: "transient_retry_policy",
            category: FailureCategory::Transient,
            max_retries,
        }
    }

    pub fn networking(max_retries: u32) -> Self {
        Self {
            name: "networking_retry_policy",
            category: FailureCategory::Networking,
            max_retries,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn category(&self) -> FailureCategory {
        self.category
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Decide what to do with `error` after `retries` retries have already run.
    pub fn decide(&self, error: &SqlError, retries: u32) -> RetryDecision {
        if classify(error) != self.category {
            return RetryDecision::NotHandled;
        }
        if retries >= self.max_retries {
            return RetryDecision::Exhausted;
        }
        let attempt = retries + 1;
        RetryDecision::Retry {
            attempt,
            delay: calculate_backoff(attempt),
        }
    }

    /// Run `operation`, retrying it while `decide` says so.
    pub async fn run<C, T, F, Fut>(
        &self,
        ctx: &ExecutionContext<'_, C>,
        mut operation: F,
    ) -> Result<T, SqlError>
    where
        C: Connection,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SqlError>>,
    {
        let mut retries = 0;

        loop {
            let error = match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            match self.decide(&error, retries) {
                RetryDecision::Retry { attempt, delay } => {
                    self.log_retry(ctx, &error, attempt, delay);
                    metrics::record_retry(self.name);
                    tokio::time::sleep(delay).await;
                    retries = attempt;
                }
                RetryDecision::Exhausted => {
                    self.log_exhausted(ctx, &error, retries);
                    return Err(error);
                }
                RetryDecision::NotHandled => return Err(error),
            }
        }
    }

    fn log_retry<C: Connection>(
        &self,
        ctx: &ExecutionContext<'_, C>,
        error: &SqlError,
        attempt: u32,
        delay: Duration,
    ) {
        let mut fields = self.base_fields(ctx, error);
        fields.insert("attempt", attempt.to_string());
        fields.insert("attempt_seconds", delay.as_secs().to_string());

        ctx.logger().log(
            Level::WARN,
            &format!("{} exception, retrying", self.name),
            Some(error),
            &fields,
        );
    }

    fn log_exhausted<C: Connection>(
        &self,
        ctx: &ExecutionContext<'_, C>,
        error: &SqlError,
        retries: u32,
    ) {
        let mut fields = self.base_fields(ctx, error);
        fields.insert("attempts", (retries + 1).to_string());

        ctx.logger().log(
            Level::WARN,
            &format!("{} retries exhausted", self.name),
            Some(error),
            &fields,
        );
    }

    fn base_fields<C: Connection>(&self, ctx: &ExecutionContext<'_, C>, error: &SqlError) -> LogFields {
        let mut fields = LogFields::new();
        fields.insert("policy", self.name.to_string());
        fields.insert("max_retries", self.max_retries.to_string());
        fields.insert("operation", ctx.operation().to_string());
        fields.insert("invocation_id", ctx.invocation_id().to_string());

        if let Some(number) = error.number() {
            fields.insert("number", number.to_string());
            if let Some(reason) = table_for(self.category).and_then(|t| t.reason(number)) {
                fields.insert("reason", reason.to_string());
            }
        }
        if let Some(connection) = ctx.try_get_connection() {
            fields.insert("connection", connection.name().to_string());
        }
        fields
    }
}
