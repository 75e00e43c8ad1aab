//! Ordered composition of policy layers.
//!
//! ```text
//! Timeout(max_timeout)
//!     → TransientRetry(max_retries)
//!         → NetworkingRetry(max_retries)
//!             → operation
//! ```
//!
//! The timeout is outermost so it bounds all retries combined. A transient
//! retry re-enters the networking layer with a fresh retry budget.

use std::future::Future;
use std::time::Duration;

use futures_util::future::BoxFuture;

use crate::database::connection::Connection;
use crate::database::context::ExecutionContext;
use crate::database::error::SqlError;
use crate::resilience::retries::RetryPolicy;
use crate::resilience::timeouts::TimeoutPolicy;
use crate::resilience::RetryPolicyParams;

/// One decision unit in the pipeline.
#[derive(Debug, Clone)]
pub enum PolicyLayer {
    Timeout(TimeoutPolicy),
    Retry(RetryPolicy),
}

impl PolicyLayer {
    pub fn name(&self) -> &'static str {
        match self {
            PolicyLayer::Timeout(_) => "timeout_policy",
            PolicyLayer::Retry(policy) => policy.name(),
        }
    }
}

/// Immutable, shareable pipeline. Holds no per-invocation state.
#[derive(Debug, Clone)]
pub struct Pipeline {
    // Outer to inner.
    layers: Vec<PolicyLayer>,
}

impl Pipeline {
    pub fn compose(max_retries: u32, max_timeout: Duration) -> Self {
        Self {
            layers: vec![
                PolicyLayer::Timeout(TimeoutPolicy::new(max_timeout)),
                PolicyLayer::Retry(RetryPolicy::transient(max_retries)),
                PolicyLayer::Retry(RetryPolicy::networking(max_retries)),
            ],
        }
    }

    pub fn from_params(params: &RetryPolicyParams) -> Self {
        Self::compose(params.max_retries(), params.max_timeout())
    }

    pub fn layers(&self) -> &[PolicyLayer] {
        &self.layers
    }

    /// Run `call` through every layer. `call` is invoked once per attempt.
    pub async fn execute<'a, C, T, F, Fut>(
        &'a self,
        ctx: &'a ExecutionContext<'a, C>,
        call: F,
    ) -> Result<T, SqlError>
    where
        C: Connection,
        T: Send + 'a,
        F: Fn() -> Fut + Send + Sync + 'a,
        Fut: Future<Output = Result<T, SqlError>> + Send + 'a,
    {
        run_layers(&self.layers, ctx, &call).await
    }
}

fn run_layers<'a, C, T, F, Fut>(
    layers: &'a [PolicyLayer],
    ctx: &'a ExecutionContext<'a, C>,
    call: &'a F,
) -> BoxFuture<'a, Result<T, SqlError>>
where
    C: Connection,
    T: Send + 'a,
    F: Fn() -> Fut + Sync,
    Fut: Future<Output = Result<T, SqlError>> + Send + 'a,
{
    Box::pin(async move {
        match layers.split_first() {
            None => call().await,
            Some((PolicyLayer::Timeout(policy), inner)) => {
                policy.run(ctx, run_layers(inner, ctx, call)).await
            }
            Some((PolicyLayer::Retry(policy), inner)) => {
                policy.run(ctx, || run_layers(inner, ctx, call)).await
            }
        }
    })
}
