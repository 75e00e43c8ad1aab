//! Operation descriptors handed to the executor.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Named statement parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(Map<String, Value>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a parameter.
    pub fn add(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// How the provider should interpret the statement text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CommandKind {
    #[default]
    Text,
    StoredProcedure,
    TableDirect,
}

/// Handle of a transaction the caller already owns on the provider side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub Uuid);

impl TransactionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

/// A single statement to run against the data store.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    statement: String,
    params: Option<Params>,
    transaction: Option<TransactionId>,
    command_timeout: Option<Duration>,
    kind: Option<CommandKind>,
}

impl Command {
    pub fn new(statement: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            params: None,
            transaction: None,
            command_timeout: None,
            kind: None,
        }
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_transaction(mut self, transaction: TransactionId) -> Self {
        self.transaction = Some(transaction);
        self
    }

    /// Provider-side timeout for a single attempt. Independent of the
    /// timeout policy, which bounds all attempts together.
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = Some(timeout);
        self
    }

    pub fn with_kind(mut self, kind: CommandKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn stored_procedure(self) -> Self {
        self.with_kind(CommandKind::StoredProcedure)
    }

    pub fn statement(&self) -> &str {
        &self.statement
    }

    pub fn params(&self) -> Option<&Params> {
        self.params.as_ref()
    }

    pub fn transaction(&self) -> Option<TransactionId> {
        self.transaction
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout
    }

    pub fn kind(&self) -> Option<CommandKind> {
        self.kind
    }
}
