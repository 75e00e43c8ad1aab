//! Resilient execution of remote data-store operations.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────────────┐
//!                  │                  ResiliencyExecutor                      │
//!   caller ───────▶│  ConnectionFactory ──▶ ExecutionContext ──▶ Pipeline     │
//!                  │                                                │         │
//!                  │   ┌────────────────────────────────────────────▼──────┐  │
//!                  │   │ Timeout(max_timeout)                              │  │
//!                  │   │   ┌───────────────────────────────────────────┐   │  │
//!                  │   │   │ TransientRetry(max_retries)               │   │  │
//!                  │   │   │   ┌───────────────────────────────────┐   │   │  │
//!                  │   │   │   │ NetworkingRetry(max_retries)      │   │   │  │
//!                  │   │   │   │      → Connection (provider call) │   │   │  │
//!                  │   │   │   └───────────────────────────────────┘   │   │  │
//!                  │   │   └───────────────────────────────────────────┘   │  │
//!                  │   └───────────────────────────────────────────────────┘  │
//!   value/error ◀──│                                                          │
//!                  └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Failures are classified by provider error number (`resilience::classifier`).
//! Transient and networking failures are retried with `2^k` second backoff;
//! anything else propagates on first occurrence.

pub mod config;
pub mod database;
pub mod observability;
pub mod resilience;

pub use config::{AppConfig, SqlSettings};
pub use database::{
    Command, CommandKind, Connection, ConnectionFactory, DbError, ErrorKind, ExecutionContext,
    Params, ResiliencyExecutor, SqlError, TransactionId,
};
pub use observability::logging::{LogFields, LogSink, TracingSink};
pub use resilience::{FailureCategory, Pipeline, RetryPolicyParams, RetryPolicyParamsError};
