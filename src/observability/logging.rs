//! Structured logging.
//!
//! # Responsibilities
//! - Define the sink policy layers log through (`LogSink`)
//! - Provide the default sink backed by `tracing`
//! - Initialize a subscriber from configuration

use std::collections::BTreeMap;
use std::fmt::Write as _;

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::schema::ObservabilityConfig;
use crate::database::error::SqlError;

/// Structured fields attached to a log event.
pub type LogFields = BTreeMap<&'static str, String>;

/// Destination for observability events raised by the resiliency pipeline.
pub trait LogSink: Send + Sync {
    fn log(&self, level: Level, message: &str, error: Option<&SqlError>, fields: &LogFields);
}

/// Keys the pipeline attaches to its events. `TracingSink` records each one
/// as its own `tracing` field; any other key is folded into `extra`.
pub const STRUCTURED_FIELDS: [&str; 11] = [
    "policy",
    "operation",
    "invocation_id",
    "connection",
    "number",
    "reason",
    "max_retries",
    "attempt",
    "attempt_seconds",
    "attempts",
    "max_timeout_seconds",
];

/// Forwards events to the active `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: Level, message: &str, error: Option<&SqlError>, fields: &LogFields) {
        let error = error.map(tracing::field::display);
        let extra = render_extra(fields);
        let extra = extra.as_deref();

        macro_rules! emit {
            ($lvl:expr) => {
                tracing::event!(
                    target: "sql_resilience",
                    $lvl,
                    error,
                    policy = field(fields, "policy"),
                    operation = field(fields, "operation"),
                    invocation_id = field(fields, "invocation_id"),
                    connection = field(fields, "connection"),
                    number = field(fields, "number"),
                    reason = field(fields, "reason"),
                    max_retries = field(fields, "max_retries"),
                    attempt = field(fields, "attempt"),
                    attempt_seconds = field(fields, "attempt_seconds"),
                    attempts = field(fields, "attempts"),
                    max_timeout_seconds = field(fields, "max_timeout_seconds"),
                    extra,
                    "{}",
                    message
                )
            };
        }

        match level {
            Level::ERROR => emit!(Level::ERROR),
            Level::WARN => emit!(Level::WARN),
            Level::INFO => emit!(Level::INFO),
            Level::DEBUG => emit!(Level::DEBUG),
            _ => emit!(Level::TRACE),
        }
    }
}

fn field<'a>(fields: &'a LogFields, key: &str) -> Option<&'a str> {
    fields.get(key).map(String::as_str)
}

/// Fields outside `STRUCTURED_FIELDS`, rendered as `key=value` pairs.
fn render_extra(fields: &LogFields) -> Option<String> {
    let extra: LogFields = fields
        .iter()
        .filter(|(key, _)| !STRUCTURED_FIELDS.contains(*key))
        .map(|(key, value)| (*key, value.clone()))
        .collect();
    (!extra.is_empty()).then(|| render_fields(&extra))
}

/// Render fields as `key=value` pairs in key order.
pub fn render_fields(fields: &LogFields) -> String {
    let mut out = String::new();
    for (i, (key, value)) in fields.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{key}={value}");
    }
    out
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("failed to install subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Install a global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    tracing::debug!(log_level = %config.log_level, "Logging initialized");
    Ok(())
}
