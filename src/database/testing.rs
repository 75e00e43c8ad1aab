//! Test doubles shared by the unit tests.

use std::sync::Mutex;

use serde::de::DeserializeOwned;
use tracing::Level;

use crate::database::command::Command;
use crate::database::connection::Connection;
use crate::database::error::{DbError, SqlError};
use crate::observability::logging::{LogFields, LogSink};

#[derive(Debug, Clone)]
pub struct LoggedEvent {
    pub level: Level,
    pub message: String,
    pub number: Option<i32>,
    pub fields: LogFields,
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<LoggedEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<LoggedEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl LogSink for RecordingSink {
    fn log(&self, level: Level, message: &str, error: Option<&SqlError>, fields: &LogFields) {
        self.events.lock().unwrap().push(LoggedEvent {
            level,
            message: message.to_string(),
            number: error.and_then(SqlError::number),
            fields: fields.clone(),
        });
    }
}

/// Connection type for contexts that never run a command.
pub struct NullConnection;

fn unsupported() -> DbError {
    DbError::new(-1, "null connection")
}

impl Connection for NullConnection {
    async fn execute(&self, _command: &Command) -> Result<u64, DbError> {
        Err(unsupported())
    }

    async fn execute_scalar<T>(&self, _command: &Command) -> Result<Option<T>, DbError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        Err(unsupported())
    }

    async fn query<T>(&self, _command: &Command) -> Result<Vec<T>, DbError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        Err(unsupported())
    }

    async fn query_split<A, B>(
        &self,
        _command: &Command,
        _split_on: &str,
    ) -> Result<Vec<(A, B)>, DbError>
    where
        A: DeserializeOwned + Send + 'static,
        B: DeserializeOwned + Send + 'static,
    {
        Err(unsupported())
    }

    async fn query_split3<A, B, C>(
        &self,
        _command: &Command,
        _split_on: &str,
    ) -> Result<Vec<(A, B, C)>, DbError>
    where
        A: DeserializeOwned + Send + 'static,
        B: DeserializeOwned + Send + 'static,
        C: DeserializeOwned + Send + 'static,
    {
        Err(unsupported())
    }
}
