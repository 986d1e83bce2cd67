//! Transaction-context abstraction over ledger state.
//!
//! # Responsibility
//! - Define the host-provided state handle (`ChaincodeStub`) the registrar
//!   reads and writes through during one invocation.
//! - Provide in-process backends: `MemoryLedger` and `SqliteLedger`.
//!
//! # Invariants
//! - Absent keys read as `None`, never as an empty value.
//! - Range scans yield keys in ascending byte order; `start` is inclusive,
//!   `end` is exclusive, and an empty bound is unbounded.
//! - Empty keys and empty collection names are rejected on every path.
//! - A `StateQueryIterator` yields nothing after `close()`.

use crate::db::DbError;
use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory_ledger;
pub mod sqlite_ledger;

pub use memory_ledger::MemoryLedger;
pub use sqlite_ledger::{invoke_in_transaction, SqliteLedger};

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Storage-layer failure surfaced verbatim to the invoking transaction.
#[derive(Debug)]
pub enum LedgerError {
    EmptyKey,
    EmptyCollection,
    Db(DbError),
    Backend(String),
}

impl Display for LedgerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyKey => write!(f, "key must not be an empty string"),
            Self::EmptyCollection => write!(f, "collection must not be an empty string"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Backend(message) => write!(f, "{message}"),
        }
    }
}

impl Error for LedgerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for LedgerError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for LedgerError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One key/value pair produced by a range scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    pub key: String,
    pub value: Vec<u8>,
}

/// Cursor over a range scan.
///
/// Backends may hold resources behind the cursor, so callers must call
/// `close()` on every exit path. Closing twice is a no-op.
pub trait StateQueryIterator: Iterator<Item = LedgerResult<QueryResult>> {
    fn close(&mut self) -> LedgerResult<()>;
}

/// Boxed cursor returned by [`ChaincodeStub`] range scans.
pub type BoxedQueryIterator<'a> = Box<dyn StateQueryIterator + 'a>;

/// State access available to one chaincode invocation.
pub trait ChaincodeStub {
    fn get_state(&self, key: &str) -> LedgerResult<Option<Vec<u8>>>;
    fn put_state(&self, key: &str, value: &[u8]) -> LedgerResult<()>;
    fn get_state_by_range(&self, start: &str, end: &str) -> LedgerResult<BoxedQueryIterator<'_>>;

    fn get_private_data(&self, collection: &str, key: &str) -> LedgerResult<Option<Vec<u8>>>;
    fn put_private_data(&self, collection: &str, key: &str, value: &[u8]) -> LedgerResult<()>;
    fn get_private_data_by_range(
        &self,
        collection: &str,
        start: &str,
        end: &str,
    ) -> LedgerResult<BoxedQueryIterator<'_>>;

    /// Wall-clock time attributed to the current transaction.
    fn tx_timestamp(&self) -> LedgerResult<DateTime<Utc>> {
        Ok(Utc::now())
    }
}

/// Eagerly materialized scan result shared by the bundled backends.
#[derive(Debug)]
pub struct BufferedQueryIterator {
    entries: std::vec::IntoIter<QueryResult>,
    closed: bool,
}

impl BufferedQueryIterator {
    pub fn new(entries: Vec<QueryResult>) -> Self {
        Self {
            entries: entries.into_iter(),
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Iterator for BufferedQueryIterator {
    type Item = LedgerResult<QueryResult>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.closed {
            return None;
        }
        self.entries.next().map(Ok)
    }
}

impl StateQueryIterator for BufferedQueryIterator {
    fn close(&mut self) -> LedgerResult<()> {
        self.closed = true;
        self.entries = Vec::new().into_iter();
        Ok(())
    }
}

pub(crate) fn ensure_key(key: &str) -> LedgerResult<()> {
    if key.is_empty() {
        return Err(LedgerError::EmptyKey);
    }
    Ok(())
}

pub(crate) fn ensure_collection(collection: &str) -> LedgerResult<()> {
    if collection.is_empty() {
        return Err(LedgerError::EmptyCollection);
    }
    Ok(())
}

/// Returns whether `key` falls inside the half-open scan range.
pub(crate) fn in_range(key: &str, start: &str, end: &str) -> bool {
    (start.is_empty() || key >= start) && (end.is_empty() || key < end)
}
