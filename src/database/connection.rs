//! Capabilities the executor consumes but does not implement.
//!
//! # Responsibilities
//! - `ConnectionFactory`: produce one live connection per top-level call
//! - `Connection`: run a statement and produce a count, a scalar, rows,
//!   or joined rows split into several entities
//!
//! # Design Decisions
//! - Connections are released by `Drop`, so every exit path of the executor
//!   (success, exhausted retries, timeout) closes the connection
//! - Futures are required to be `Send` so executor calls can be spawned

use std::future::Future;

use serde::de::DeserializeOwned;

use crate::database::command::Command;
use crate::database::error::DbError;

/// Column that marks where the next joined entity begins in a split query.
pub const DEFAULT_SPLIT_ON: &str = "Id";

/// Produces live connections.
pub trait ConnectionFactory: Send + Sync {
    type Connection: Connection + 'static;

    fn create_connection(&self) -> impl Future<Output = Result<Self::Connection, DbError>> + Send;
}

/// A live connection able to run commands.
pub trait Connection: Send + Sync {
    /// Label used in diagnostics only (e.g. the data source name).
    fn name(&self) -> &str {
        "connection"
    }

    /// Run a command and return the number of affected rows.
    fn execute(&self, command: &Command) -> impl Future<Output = Result<u64, DbError>> + Send;

    /// Run a command and return the first column of the first row.
    fn execute_scalar<T>(
        &self,
        command: &Command,
    ) -> impl Future<Output = Result<Option<T>, DbError>> + Send
    where
        T: DeserializeOwned + Send + 'static;

    fn query<T>(&self, command: &Command) -> impl Future<Output = Result<Vec<T>, DbError>> + Send
    where
        T: DeserializeOwned + Send + 'static;

    fn query_first_or_default<T>(
        &self,
        command: &Command,
    ) -> impl Future<Output = Result<Option<T>, DbError>> + Send
    where
        T: DeserializeOwned + Send + 'static,
    {
        let rows = self.query::<T>(command);
        async move { Ok(rows.await?.into_iter().next()) }
    }

    /// Run a command whose rows join two entities, splitting each row at `split_on`.
    fn query_split<A, B>(
        &self,
        command: &Command,
        split_on: &str,
    ) -> impl Future<Output = Result<Vec<(A, B)>, DbError>> + Send
    where
        A: DeserializeOwned + Send + 'static,
        B: DeserializeOwned + Send + 'static;

    /// Three-way variant of [`Connection::query_split`].
    fn query_split3<A, B, C>(
        &self,
        command: &Command,
        split_on: &str,
    ) -> impl Future<Output = Result<Vec<(A, B, C)>, DbError>> + Send
    where
        A: DeserializeOwned + Send + 'static,
        B: DeserializeOwned + Send + 'static,
        C: DeserializeOwned + Send + 'static;
}
