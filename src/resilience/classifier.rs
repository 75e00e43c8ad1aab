//! Classification of provider error signals.
//!
//! # Responsibilities
//! - Hold the fixed signal tables (transient, networking)
//! - Map a failure to its `FailureCategory`
//!
//! # Design Decisions
//! - Tables are `static` data: never mutated, safe for unsynchronized reads
//! - Lookup order is transient, then networking; anything else is unclassified
//!   and is never retried

use crate::database::error::SqlError;

/// Semantic category of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureCategory {
    Transient,
    Networking,
    Unclassified,
}

impl FailureCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureCategory::Transient => "transient",
            FailureCategory::Networking => "networking",
            FailureCategory::Unclassified => "unclassified",
        }
    }
}

/// Reason name to provider error number.
#[derive(Debug)]
pub struct SignalTable {
    pub category: FailureCategory,
    entries: &'static [(&'static str, i32)],
}

impl SignalTable {
    pub fn contains(&self, number: i32) -> bool {
        self.entries.iter().any(|&(_, n)| n == number)
    }

    /// Reason name registered for `number`.
    pub fn reason(&self, number: i32) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|&&(_, n)| n == number)
            .map(|&(reason, _)| reason)
    }

    pub fn entries(&self) -> &'static [(&'static str, i32)] {
        self.entries
    }
}

// https://docs.microsoft.com/en-us/sql/relational-databases/errors-events/database-engine-events-and-errors
pub static TRANSIENT_SIGNALS: SignalTable = SignalTable {
    category: FailureCategory::Transient,
    entries: &[("Deadlock", 1205)],
};

pub static NETWORKING_SIGNALS: SignalTable = SignalTable {
    category: FailureCategory::Networking,
    entries: &[
        ("ServerNotFound", 258),
        ("TimeoutExpired", -2),
        ("ConnectionFailed", 53),
        ("ConnectionBroke", 0),
        ("ConnectionFailedNoResponse", 10060),
        ("PreLoginHandshakeFailed", 64),
        ("NotFound", 26),
        ("ConnectionAborted", 10053),
    ],
};

/// Category of a raw provider error number.
pub fn classify_number(number: i32) -> FailureCategory {
    [&TRANSIENT_SIGNALS, &NETWORKING_SIGNALS]
        .into_iter()
        .find(|table| table.contains(number))
        .map_or(FailureCategory::Unclassified, |table| table.category)
}

/// Category of a failure. Only provider failures carry a signal; timeouts and
/// connection acquisition failures are always unclassified.
pub fn classify(error: &SqlError) -> FailureCategory {
    error
        .number()
        .map_or(FailureCategory::Unclassified, classify_number)
}

/// The table for a retryable category.
pub fn table_for(category: FailureCategory) -> Option<&'static SignalTable> {
    match category {
        FailureCategory::Transient => Some(&TRANSIENT_SIGNALS),
        FailureCategory::Networking => Some(&NETWORKING_SIGNALS),
        FailureCategory::Unclassified => None,
    }
}
