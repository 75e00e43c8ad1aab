//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Policy layers and executor produce:
//!     → logging.rs (LogSink events: retries, exhaustion, timeouts)
//!     → metrics.rs (counters and histograms via the `metrics` facade)
//!
//! Consumers:
//!     → tracing subscriber installed by the application (or init_logging)
//!     → whatever metrics recorder the application installs
//! ```
//!
//! # Design Decisions
//! - The sink is reached through the execution context, never through a
//!   return value, so layers stay decoupled from the operation's result type
//! - No recorder is installed here; metric calls are no-ops without one

pub mod logging;
pub mod metrics;
