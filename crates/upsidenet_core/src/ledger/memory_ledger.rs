//! In-process ledger backed by ordered maps.
//!
//! Writes are visible to later reads on the same instance immediately; there
//! is no staging or commit phase.

use super::{
    ensure_collection, ensure_key, in_range, BoxedQueryIterator, BufferedQueryIterator,
    ChaincodeStub, LedgerResult, QueryResult,
};
use chrono::{DateTime, Utc};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

type KeySpace = BTreeMap<String, Vec<u8>>;

/// `ChaincodeStub` over in-memory world state and private collections.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    world_state: RefCell<KeySpace>,
    private_data: RefCell<BTreeMap<String, KeySpace>>,
    pinned_time: Cell<Option<DateTime<Utc>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `tx_timestamp()` return `at` until unpinned with `None`.
    pub fn pin_tx_timestamp(&self, at: Option<DateTime<Utc>>) {
        self.pinned_time.set(at);
    }

    /// Number of keys in the public world state.
    pub fn state_len(&self) -> usize {
        self.world_state.borrow().len()
    }

    /// Number of keys in one private collection.
    pub fn private_len(&self, collection: &str) -> usize {
        self.private_data
            .borrow()
            .get(collection)
            .map_or(0, BTreeMap::len)
    }
}

fn scan(space: &KeySpace, start: &str, end: &str) -> Vec<QueryResult> {
    space
        .iter()
        .filter(|(key, _)| in_range(key, start, end))
        .map(|(key, value)| QueryResult {
            key: key.clone(),
            value: value.clone(),
        })
        .collect()
}

impl ChaincodeStub for MemoryLedger {
    fn get_state(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        ensure_key(key)?;
        Ok(self.world_state.borrow().get(key).cloned())
    }

    fn put_state(&self, key: &str, value: &[u8]) -> LedgerResult<()> {
        ensure_key(key)?;
        self.world_state
            .borrow_mut()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get_state_by_range(&self, start: &str, end: &str) -> LedgerResult<BoxedQueryIterator<'_>> {
        let entries = scan(&self.world_state.borrow(), start, end);
        Ok(Box::new(BufferedQueryIterator::new(entries)))
    }

    fn get_private_data(&self, collection: &str, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        ensure_collection(collection)?;
        ensure_key(key)?;
        Ok(self
            .private_data
            .borrow()
            .get(collection)
            .and_then(|space| space.get(key))
            .cloned())
    }

    fn put_private_data(&self, collection: &str, key: &str, value: &[u8]) -> LedgerResult<()> {
        ensure_collection(collection)?;
        ensure_key(key)?;
        self.private_data
            .borrow_mut()
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get_private_data_by_range(
        &self,
        collection: &str,
        start: &str,
        end: &str,
    ) -> LedgerResult<BoxedQueryIterator<'_>> {
        ensure_collection(collection)?;
        let entries = self
            .private_data
            .borrow()
            .get(collection)
            .map(|space| scan(space, start, end))
            .unwrap_or_default();
        Ok(Box::new(BufferedQueryIterator::new(entries)))
    }

    fn tx_timestamp(&self) -> LedgerResult<DateTime<Utc>> {
        Ok(self.pinned_time.get().unwrap_or_else(Utc::now))
    }
}
