//! Per-invocation execution context.
//!
//! Carries what the policy layers need to describe the operation they are
//! protecting: logger, statement, parameters, connection and operation name.
//! Read-only to every layer and never consulted for control flow.

use uuid::Uuid;

use crate::database::command::Params;
use crate::database::connection::Connection;
use crate::observability::logging::LogSink;

pub struct ExecutionContext<'a, C> {
    invocation_id: Uuid,
    operation: &'a str,
    statement: &'a str,
    params: Option<&'a Params>,
    connection: Option<&'a C>,
    logger: &'a dyn LogSink,
}

impl<'a, C: Connection> ExecutionContext<'a, C> {
    pub fn new(
        connection: &'a C,
        logger: &'a dyn LogSink,
        statement: &'a str,
        params: Option<&'a Params>,
        operation: &'a str,
    ) -> Self {
        Self {
            invocation_id: Uuid::new_v4(),
            operation,
            statement,
            params,
            connection: Some(connection),
            logger,
        }
    }

    /// A context with no connection attached, for running a pipeline directly.
    pub fn detached(
        logger: &'a dyn LogSink,
        statement: &'a str,
        params: Option<&'a Params>,
        operation: &'a str,
    ) -> Self {
        Self {
            invocation_id: Uuid::new_v4(),
            operation,
            statement,
            params,
            connection: None,
            logger,
        }
    }

    pub fn logger(&self) -> &'a dyn LogSink {
        self.logger
    }

    /// The connection the invocation runs on, for diagnostics only.
    /// Retries always reuse it; layers must never open another.
    pub fn try_get_connection(&self) -> Option<&'a C> {
        self.connection
    }

    pub fn invocation_id(&self) -> Uuid {
        self.invocation_id
    }

    pub fn operation(&self) -> &'a str {
        self.operation
    }

    pub fn statement(&self) -> &'a str {
        self.statement
    }

    pub fn params(&self) -> Option<&'a Params> {
        self.params
    }
}

impl<C> std::fmt::Debug for ExecutionContext<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("invocation_id", &self.invocation_id)
            .field("operation", &self.operation)
            .field("statement", &self.statement)
            .field("params", &self.params)
            .field("connection", &self.connection.is_some())
            .finish_non_exhaustive()
    }
}
