//! Shared fakes for integration testing.
//!
//! Each command carries its own script in its parameters:
//! - `fail_with`: error numbers returned by attempts 1, 2, ... in order
//! - `always_fail`: error number returned by every attempt
//! - `latency_ms`: time each attempt takes
//! - `rows` / `scalar` / `affected`: what a successful attempt returns

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use sql_resilience::{
    Command, Connection, ConnectionFactory, DbError, LogFields, LogSink, ResiliencyExecutor,
    SqlError, SqlSettings,
};
use tracing::Level;

#[derive(Debug, Default)]
pub struct Stats {
    pub opened: AtomicU32,
    pub closed: AtomicU32,
    pub calls: AtomicU32,
    /// Attempts made on each connection, recorded when it is dropped.
    pub attempts_per_connection: Mutex<Vec<(String, u32)>>,
    pub split_on: Mutex<Vec<String>>,
}

impl Stats {
    pub fn attempts_for(&self, label: &str) -> Option<u32> {
        self.attempts_per_connection
            .lock()
            .unwrap()
            .iter()
            .find(|(l, _)| l == label)
            .map(|&(_, n)| n)
    }
}

pub struct ScriptedFactory {
    pub stats: Arc<Stats>,
    pub acquire_error: Option<DbError>,
}

impl ScriptedFactory {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(Stats::default()),
            acquire_error: None,
        }
    }

    pub fn failing(error: DbError) -> Self {
        Self {
            stats: Arc::new(Stats::default()),
            acquire_error: Some(error),
        }
    }
}

impl ConnectionFactory for ScriptedFactory {
    type Connection = FakeConnection;

    async fn create_connection(&self) -> Result<FakeConnection, DbError> {
        if let Some(err) = &self.acquire_error {
            return Err(err.clone());
        }
        let id = self.stats.opened.fetch_add(1, Ordering::SeqCst);
        Ok(FakeConnection {
            name: format!("fake-{id}"),
            label: Mutex::new(None),
            attempts: AtomicU32::new(0),
            stats: self.stats.clone(),
        })
    }
}

pub struct FakeConnection {
    name: String,
    label: Mutex<Option<String>>,
    attempts: AtomicU32,
    stats: Arc<Stats>,
}

impl FakeConnection {
    async fn attempt(&self, command: &Command) -> Result<(), DbError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) as usize;
        self.stats.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(label) = param(command, "label").and_then(Value::as_str) {
            *self.label.lock().unwrap() = Some(label.to_string());
        }

        if let Some(ms) = param(command, "latency_ms").and_then(Value::as_u64) {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }

        if let Some(number) = param(command, "always_fail").and_then(Value::as_i64) {
            return Err(DbError::new(number as i32, "scripted failure"));
        }
        let scheduled = param(command, "fail_with")
            .and_then(Value::as_array)
            .and_then(|failures| failures.get(attempt))
            .and_then(Value::as_i64);
        match scheduled {
            Some(number) => Err(DbError::new(number as i32, "scripted failure")),
            None => Ok(()),
        }
    }
}

impl Drop for FakeConnection {
    fn drop(&mut self) {
        self.stats.closed.fetch_add(1, Ordering::SeqCst);
        let label = self.label.lock().unwrap().clone().unwrap_or_else(|| self.name.clone());
        self.stats
            .attempts_per_connection
            .lock()
            .unwrap()
            .push((label, self.attempts.load(Ordering::SeqCst)));
    }
}

fn param<'a>(command: &'a Command, name: &str) -> Option<&'a Value> {
    command.params().and_then(|p| p.get(name))
}

fn decode<T: DeserializeOwned>(command: &Command, name: &str) -> Result<T, DbError> {
    let value = param(command, name).cloned().unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| DbError::new(50000, e.to_string()))
}

impl Connection for FakeConnection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, command: &Command) -> Result<u64, DbError> {
        self.attempt(command).await?;
        Ok(param(command, "affected").and_then(Value::as_u64).unwrap_or(1))
    }

    async fn execute_scalar<T>(&self, command: &Command) -> Result<Option<T>, DbError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.attempt(command).await?;
        decode(command, "scalar")
    }

    async fn query<T>(&self, command: &Command) -> Result<Vec<T>, DbError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.attempt(command).await?;
        if param(command, "rows").is_none() {
            return Ok(Vec::new());
        }
        decode(command, "rows")
    }

    async fn query_split<A, B>(&self, command: &Command, split_on: &str) -> Result<Vec<(A, B)>, DbError>
    where
        A: DeserializeOwned + Send + 'static,
        B: DeserializeOwned + Send + 'static,
    {
        self.attempt(command).await?;
        self.stats.split_on.lock().unwrap().push(split_on.to_string());
        decode(command, "rows")
    }

    async fn query_split3<A, B, C>(
        &self,
        command: &Command,
        split_on: &str,
    ) -> Result<Vec<(A, B, C)>, DbError>
    where
        A: DeserializeOwned + Send + 'static,
        B: DeserializeOwned + Send + 'static,
        C: DeserializeOwned + Send + 'static,
    {
        self.attempt(command).await?;
        self.stats.split_on.lock().unwrap().push(split_on.to_string());
        decode(command, "rows")
    }
}

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

    pub fn retries(&self) -> Vec<LoggedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.message.ends_with("exception, retrying"))
            .collect()
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

/// Executor over a fresh scripted factory, logging into a recording sink.
pub fn executor(
    max_retries: u32,
    timeout_secs: u64,
) -> (ResiliencyExecutor<ScriptedFactory>, Arc<Stats>, Arc<RecordingSink>) {
    executor_with(ScriptedFactory::new(), max_retries, timeout_secs)
}

pub fn executor_with(
    factory: ScriptedFactory,
    max_retries: u32,
    timeout_secs: u64,
) -> (ResiliencyExecutor<ScriptedFactory>, Arc<Stats>, Arc<RecordingSink>) {
    let settings = SqlSettings {
        sql_default_retry_count: max_retries,
        sql_timeout_policy_seconds: timeout_secs,
    };
    let stats = factory.stats.clone();
    let sink = Arc::new(RecordingSink::default());
    let executor = ResiliencyExecutor::with_logger(&settings, factory, sink.clone())
        .expect("test settings carry a positive timeout");
    (executor, stats, sink)
}
