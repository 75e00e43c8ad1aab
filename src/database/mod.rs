//! Database access subsystem.
//!
//! # Data Flow
//! ```text
//! caller
//!     → executor.rs (acquire one connection via ConnectionFactory)
//!     → context.rs (per-invocation ExecutionContext)
//!     → resilience::Pipeline (timeout ⊃ transient retry ⊃ networking retry)
//!     → connection.rs (Connection runs the command)
//!     → value, or error.rs SqlError (original provider error, tagged by kind)
//! ```

pub mod command;
pub mod connection;
pub mod context;
pub mod error;
pub mod executor;
#[cfg(test)]
pub(crate) mod testing;

pub use command::{Command, CommandKind, Params, TransactionId};
pub use connection::{Connection, ConnectionFactory, DEFAULT_SPLIT_ON};
pub use context::ExecutionContext;
pub use error::{DbError, ErrorKind, SqlError};
pub use executor::ResiliencyExecutor;
