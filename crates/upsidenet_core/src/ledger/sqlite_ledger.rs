//! SQLite-backed ledger for local development and the CLI harness.
//!
//! # Responsibility
//! - Persist world state and private collections in a migrated SQLite file.
//! - Stage one invocation's writes in a SQLite transaction so a rejected
//!   invocation leaves nothing behind.
//!
//! # Invariants
//! - Range scans order by `key` with SQLite's BINARY collation, which matches
//!   byte-wise string ordering.
//! - Only successful outcomes are committed.

use super::{
    ensure_collection, ensure_key, BoxedQueryIterator, BufferedQueryIterator, ChaincodeStub,
    LedgerResult, QueryResult,
};
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};

const STATE_RANGE_SQL: &str = "SELECT key, value
FROM world_state
WHERE (?1 = '' OR key >= ?1)
  AND (?2 = '' OR key < ?2)
ORDER BY key ASC;";

const PRIVATE_RANGE_SQL: &str = "SELECT key, value
FROM private_data
WHERE collection = ?1
  AND (?2 = '' OR key >= ?2)
  AND (?3 = '' OR key < ?3)
ORDER BY key ASC;";

/// `ChaincodeStub` over a connection opened with [`crate::db::open_db`].
pub struct SqliteLedger<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLedger<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

fn parse_entry_row(row: &Row<'_>) -> rusqlite::Result<QueryResult> {
    Ok(QueryResult {
        key: row.get(0)?,
        value: row.get(1)?,
    })
}

impl ChaincodeStub for SqliteLedger<'_> {
    fn get_state(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        ensure_key(key)?;
        let value = self
            .conn
            .query_row(
                "SELECT value FROM world_state WHERE key = ?1;",
                [key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put_state(&self, key: &str, value: &[u8]) -> LedgerResult<()> {
        ensure_key(key)?;
        self.conn.execute(
            "INSERT INTO world_state (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
            params![key, value],
        )?;
        Ok(())
    }

    fn get_state_by_range(&self, start: &str, end: &str) -> LedgerResult<BoxedQueryIterator<'_>> {
        let mut stmt = self.conn.prepare(STATE_RANGE_SQL)?;
        let entries = stmt
            .query_map(params![start, end], parse_entry_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Box::new(BufferedQueryIterator::new(entries)))
    }

    fn get_private_data(&self, collection: &str, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        ensure_collection(collection)?;
        ensure_key(key)?;
        let value = self
            .conn
            .query_row(
                "SELECT value FROM private_data WHERE collection = ?1 AND key = ?2;",
                params![collection, key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put_private_data(&self, collection: &str, key: &str, value: &[u8]) -> LedgerResult<()> {
        ensure_collection(collection)?;
        ensure_key(key)?;
        self.conn.execute(
            "INSERT INTO private_data (collection, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(collection, key) DO UPDATE SET value = excluded.value;",
            params![collection, key, value],
        )?;
        Ok(())
    }

    fn get_private_data_by_range(
        &self,
        collection: &str,
        start: &str,
        end: &str,
    ) -> LedgerResult<BoxedQueryIterator<'_>> {
        ensure_collection(collection)?;
        let mut stmt = self.conn.prepare(PRIVATE_RANGE_SQL)?;
        let entries = stmt
            .query_map(params![collection, start, end], parse_entry_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Box::new(BufferedQueryIterator::new(entries)))
    }
}

/// Decides whether an invocation outcome may be committed.
pub trait TransactionOutcome {
    fn should_commit(&self) -> bool;
}

impl<T, E> TransactionOutcome for Result<T, E> {
    fn should_commit(&self) -> bool {
        self.is_ok()
    }
}

/// Runs `invocation` against a ledger view scoped to one SQLite transaction.
///
/// The transaction commits when the outcome reports success and rolls back
/// otherwise. Ledger-level failures to begin or commit are returned as `Err`;
/// the invocation's own outcome is returned untouched inside `Ok`.
pub fn invoke_in_transaction<T, F>(conn: &mut Connection, invocation: F) -> LedgerResult<T>
where
    T: TransactionOutcome,
    F: FnOnce(&SqliteLedger<'_>) -> T,
{
    let tx = conn.transaction()?;
    let outcome = invocation(&SqliteLedger::new(&tx));

    if outcome.should_commit() {
        tx.commit()?;
        debug!("event=ledger_tx module=ledger status=committed");
    } else {
        tx.rollback()?;
        warn!("event=ledger_tx module=ledger status=rolled_back");
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::{invoke_in_transaction, SqliteLedger};
    use crate::db::open_db_in_memory;
    use crate::ledger::{ChaincodeStub, LedgerError};

    #[test]
    fn state_roundtrip_and_overwrite() {
        let conn = open_db_in_memory().unwrap();
        let ledger = SqliteLedger::new(&conn);

        assert!(ledger.get_state("k").unwrap().is_none());
        ledger.put_state("k", b"one").unwrap();
        ledger.put_state("k", b"two").unwrap();
        assert_eq!(ledger.get_state("k").unwrap().unwrap(), b"two");
    }

    #[test]
    fn private_range_is_scoped_to_collection() {
        let conn = open_db_in_memory().unwrap();
        let ledger = SqliteLedger::new(&conn);
        ledger.put_private_data("a", "k2", b"2").unwrap();
        ledger.put_private_data("a", "k1", b"1").unwrap();
        ledger.put_private_data("b", "k0", b"0").unwrap();

        let keys: Vec<String> = ledger
            .get_private_data_by_range("a", "", "")
            .unwrap()
            .map(|entry| entry.unwrap().key)
            .collect();
        assert_eq!(keys, vec!["k1", "k2"]);
    }

    #[test]
    fn failed_outcome_rolls_back_writes() {
        let mut conn = open_db_in_memory().unwrap();

        let outcome = invoke_in_transaction(&mut conn, |ledger| {
            ledger.put_state("staged", b"x")?;
            Err::<(), LedgerError>(LedgerError::Backend("rejected".to_string()))
        })
        .unwrap();
        assert!(outcome.is_err());

        let ledger = SqliteLedger::new(&conn);
        assert!(ledger.get_state("staged").unwrap().is_none());
    }

    #[test]
    fn successful_outcome_commits_writes() {
        let mut conn = open_db_in_memory().unwrap();

        invoke_in_transaction(&mut conn, |ledger| ledger.put_state("kept", b"x"))
            .unwrap()
            .unwrap();

        let ledger = SqliteLedger::new(&conn);
        assert_eq!(ledger.get_state("kept").unwrap().unwrap(), b"x");
    }
}
