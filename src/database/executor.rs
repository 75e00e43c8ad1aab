//! Resilient executor.
//!
//! # Responsibilities
//! - Open exactly one connection per top-level call
//! - Build the execution context for that call
//! - Run the provider call through the shared pipeline
//!
//! # Design Decisions
//! - Connection acquisition happens before the pipeline; its failure is
//!   surfaced immediately and never classified or retried
//! - Every retry reuses the connection opened for the call
//! - The connection is dropped on every exit path, including timeout
//! - Settings are checked once at construction; a zero timeout is rejected

use std::sync::Arc;
use std::time::Instant;

use futures_util::future::{BoxFuture, FutureExt, TryFutureExt};
use serde::de::DeserializeOwned;

use crate::config::schema::SqlSettings;
use crate::database::command::Command;
use crate::database::connection::{Connection, ConnectionFactory, DEFAULT_SPLIT_ON};
use crate::database::context::ExecutionContext;
use crate::database::error::{DbError, SqlError};
use crate::observability::logging::{LogSink, TracingSink};
use crate::observability::metrics;
use crate::resilience::{Pipeline, RetryPolicyParamsError};

pub struct ResiliencyExecutor<F> {
    factory: F,
    logger: Arc<dyn LogSink>,
    pipeline: Pipeline,
}

impl<F: ConnectionFactory> ResiliencyExecutor<F> {
    /// Build an executor logging through `tracing`.
    ///
    /// Fails when the settings carry a zero timeout.
    pub fn new(settings: &SqlSettings, factory: F) -> Result<Self, RetryPolicyParamsError> {
        Self::with_logger(settings, factory, Arc::new(TracingSink))
    }

    pub fn with_logger(
        settings: &SqlSettings,
        factory: F,
        logger: Arc<dyn LogSink>,
    ) -> Result<Self, RetryPolicyParamsError> {
        let pipeline = Pipeline::from_params(&settings.policy_params()?);
        Ok(Self::from_pipeline(pipeline, factory, logger))
    }

    pub fn from_pipeline(pipeline: Pipeline, factory: F, logger: Arc<dyn LogSink>) -> Self {
        tracing::debug!(
            layers = ?pipeline.layers().iter().map(|l| l.name()).collect::<Vec<_>>(),
            "Resiliency pipeline composed"
        );
        Self {
            factory,
            logger,
            pipeline,
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Run `delegate` against a freshly opened connection under the pipeline.
    ///
    /// The delegate is called once per attempt with the same command and
    /// connection.
    pub async fn execute_with<T, D>(
        &self,
        command: &Command,
        operation: &str,
        delegate: D,
    ) -> Result<T, SqlError>
    where
        T: Send,
        D: for<'c> Fn(&'c Command, &'c F::Connection) -> BoxFuture<'c, Result<T, DbError>>
            + Send
            + Sync,
    {
        let start = Instant::now();

        let connection = match self.factory.create_connection().await {
            Ok(connection) => connection,
            Err(err) => {
                tracing::debug!(operation, error = %err, "Connection acquisition failed");
                metrics::record_operation(operation, "connection_failed", start);
                return Err(SqlError::ConnectionAcquisition(err));
            }
        };
        tracing::debug!(operation, connection = connection.name(), "Connection acquired");

        let ctx = ExecutionContext::new(
            &connection,
            self.logger.as_ref(),
            command.statement(),
            command.params(),
            operation,
        );

        let delegate = &delegate;
        let conn = &connection;
        let result = self
            .pipeline
            .execute(&ctx, move || delegate(command, conn).map_err(SqlError::from))
            .await;

        let outcome = if result.is_ok() { "ok" } else { "error" };
        tracing::debug!(
            operation,
            invocation_id = %ctx.invocation_id(),
            outcome,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Operation finished"
        );
        metrics::record_operation(operation, outcome, start);

        result
    }

    /// Run a command and return the number of affected rows.
    pub async fn execute(&self, command: &Command) -> Result<u64, SqlError> {
        self.execute_with(command, "execute", |cmd, conn| conn.execute(cmd).boxed())
            .await
    }

    pub async fn execute_scalar<T>(&self, command: &Command) -> Result<Option<T>, SqlError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.execute_with(command, "execute_scalar", |cmd, conn| {
            conn.execute_scalar::<T>(cmd).boxed()
        })
        .await
    }

    pub async fn query_first_or_default<T>(&self, command: &Command) -> Result<Option<T>, SqlError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.execute_with(command, "query_first_or_default", |cmd, conn| {
            conn.query_first_or_default::<T>(cmd).boxed()
        })
        .await
    }

    pub async fn query<T>(&self, command: &Command) -> Result<Vec<T>, SqlError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.execute_with(command, "query", |cmd, conn| conn.query::<T>(cmd).boxed())
            .await
    }

    /// Query rows joining two entities and fold each row into one result.
    /// `split_on` defaults to [`DEFAULT_SPLIT_ON`].
    pub async fn query_map<A, B, R, M>(
        &self,
        command: &Command,
        split_on: Option<&'static str>,
        mut map: M,
    ) -> Result<Vec<R>, SqlError>
    where
        A: DeserializeOwned + Send + 'static,
        B: DeserializeOwned + Send + 'static,
        M: FnMut(A, B) -> R,
    {
        let split_on = split_on.unwrap_or(DEFAULT_SPLIT_ON);
        let rows = self
            .execute_with(command, "query_map", |cmd, conn| {
                conn.query_split::<A, B>(cmd, split_on).boxed()
            })
            .await?;
        Ok(rows.into_iter().map(|(a, b)| map(a, b)).collect())
    }

    /// Three-way variant of [`ResiliencyExecutor::query_map`].
    pub async fn query_map3<A, B, C, R, M>(
        &self,
        command: &Command,
        split_on: Option<&'static str>,
        mut map: M,
    ) -> Result<Vec<R>, SqlError>
    where
        A: DeserializeOwned + Send + 'static,
        B: DeserializeOwned + Send + 'static,
        C: DeserializeOwned + Send + 'static,
        M: FnMut(A, B, C) -> R,
    {
        let split_on = split_on.unwrap_or(DEFAULT_SPLIT_ON);
        let rows = self
            .execute_with(command, "query_map3", |cmd, conn| {
                conn.query_split3::<A, B, C>(cmd, split_on).boxed()
            })
            .await?;
        Ok(rows.into_iter().map(|(a, b, c)| map(a, b, c)).collect())
    }
}
