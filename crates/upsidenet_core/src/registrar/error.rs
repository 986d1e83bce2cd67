//! Registrar error taxonomy.
//!
//! Validation variants are raised before any ledger call. `NotFound` is
//! distinct from validation so clients can tell a bad request from a missing
//! record; `AlreadyExists` likewise marks a create against an occupied key.
//! `Serialization` and `Ledger` carry backend failures verbatim.

use crate::ledger::LedgerError;
use crate::model::measurement::RecordKind;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ContractResult<T> = Result<T, ContractError>;

#[derive(Debug)]
pub enum ContractError {
    /// Wrong number of positional arguments.
    ArgumentCount {
        expected: String,
        usage: String,
        got: usize,
    },
    /// A numeric argument did not parse as a finite base-10 float.
    InvalidNumber { field: &'static str, value: String },
    EmptyIdentifier,
    NotFound { kind: RecordKind, id: String },
    /// Create targeted a key that already holds a value.
    AlreadyExists { kind: RecordKind, id: String },
    UnknownFunction(String),
    Serialization(serde_json::Error),
    Ledger(LedgerError),
}

impl ContractError {
    /// Whether the error was raised by input validation (no ledger access).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ArgumentCount { .. }
                | Self::InvalidNumber { .. }
                | Self::EmptyIdentifier
                | Self::UnknownFunction(_)
        )
    }

    /// Short stable code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ArgumentCount { .. } => "argument_count",
            Self::InvalidNumber { .. } => "invalid_number",
            Self::EmptyIdentifier => "empty_identifier",
            Self::NotFound { .. } => "not_found",
            Self::AlreadyExists { .. } => "already_exists",
            Self::UnknownFunction(_) => "unknown_function",
            Self::Serialization(_) => "serialization",
            Self::Ledger(_) => "ledger",
        }
    }
}

impl Display for ContractError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ArgumentCount {
                expected,
                usage,
                got,
            } => write!(
                f,
                "Incorrect number of arguments. Expecting {expected} ({usage}), got {got}"
            ),
            Self::InvalidNumber { field, value } => {
                write!(f, "{field} must be a number, got `{value}`")
            }
            Self::EmptyIdentifier => write!(f, "ID must not be empty"),
            Self::NotFound { kind, id } => write!(f, "{} does not exist: {id}", kind.label()),
            Self::AlreadyExists { kind, id } => {
                write!(f, "{} already exists: {id}", kind.label())
            }
            Self::UnknownFunction(name) => write!(f, "Unknown function: {name}"),
            Self::Serialization(err) => write!(f, "{err}"),
            Self::Ledger(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ContractError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serialization(err) => Some(err),
            Self::Ledger(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LedgerError> for ContractError {
    fn from(value: LedgerError) -> Self {
        Self::Ledger(value)
    }
}

impl From<serde_json::Error> for ContractError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}
