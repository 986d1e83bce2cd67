//! Full-partition scans rendered as `[{"Key": ..., "Record": ...}]`.
//!
//! # Invariants
//! - The backend cursor is closed on every exit path, including iteration
//!   errors and early returns.
//! - Output order is the backend's key order.
//! - Stored records are embedded verbatim; bytes that are not JSON are
//!   embedded as a JSON string so the array stays well-formed.

use super::error::ContractResult;
use crate::ledger::{BoxedQueryIterator, LedgerResult, QueryResult};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// Closes the wrapped cursor when dropped unless [`ScanGuard::finish`] ran.
pub(crate) struct ScanGuard<'a> {
    iter: BoxedQueryIterator<'a>,
    closed: bool,
}

impl<'a> ScanGuard<'a> {
    pub(crate) fn new(iter: BoxedQueryIterator<'a>) -> Self {
        Self {
            iter,
            closed: false,
        }
    }

    /// Closes the cursor and reports the backend's close result.
    pub(crate) fn finish(mut self) -> LedgerResult<()> {
        self.closed = true;
        self.iter.close()
    }
}

impl Iterator for ScanGuard<'_> {
    type Item = LedgerResult<QueryResult>;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(err) = self.iter.close() {
            warn!("event=scan_close module=registrar status=error error={err}");
        }
    }
}

#[derive(Serialize)]
struct KeyedRecord<'a> {
    #[serde(rename = "Key")]
    key: &'a str,
    #[serde(rename = "Record")]
    record: Box<RawValue>,
}

#[derive(Deserialize)]
struct DocTypeProbe {
    #[serde(rename = "docType")]
    doc_type: Option<String>,
}

/// Returns whether `value` is a JSON object whose `docType` equals `doc_type`.
///
/// Non-JSON and non-object values never match.
pub(crate) fn has_doc_type(value: &[u8], doc_type: &str) -> bool {
    serde_json::from_slice::<DocTypeProbe>(value)
        .ok()
        .and_then(|probe| probe.doc_type)
        .is_some_and(|found| found == doc_type)
}

/// Drains `scan` into a JSON array, keeping entries accepted by `keep`.
///
/// Returns the payload and the number of entries written.
pub(crate) fn collect_records<F>(mut scan: ScanGuard<'_>, keep: F) -> ContractResult<(Vec<u8>, usize)>
where
    F: Fn(&QueryResult) -> bool,
{
    let mut entries = Vec::new();
    for item in scan.by_ref() {
        let entry = item?;
        if keep(&entry) {
            entries.push(entry);
        }
    }
    scan.finish()?;

    let mut records = Vec::with_capacity(entries.len());
    for entry in &entries {
        records.push(KeyedRecord {
            key: entry.key.as_str(),
            record: embed_record(&entry.value)?,
        });
    }

    Ok((serde_json::to_vec(&records)?, records.len()))
}

fn embed_record(value: &[u8]) -> ContractResult<Box<RawValue>> {
    if let Ok(text) = std::str::from_utf8(value) {
        if let Ok(raw) = RawValue::from_string(text.to_string()) {
            return Ok(raw);
        }
    }
    Ok(serde_json::value::to_raw_value(&String::from_utf8_lossy(value))?)
}

#[cfg(test)]
mod tests {
    use super::{collect_records, has_doc_type, ScanGuard};
    use crate::ledger::{BufferedQueryIterator, QueryResult};

    fn entry(key: &str, value: &str) -> QueryResult {
        QueryResult {
            key: key.to_string(),
            value: value.as_bytes().to_vec(),
        }
    }

    #[test]
    fn doc_type_probe_skips_malformed_values() {
        assert!(has_doc_type(br#"{"docType":"a","x":1}"#, "a"));
        assert!(!has_doc_type(br#"{"docType":"b"}"#, "a"));
        assert!(!has_doc_type(br#"{"x":1}"#, "a"));
        assert!(!has_doc_type(b"not json", "a"));
        assert!(!has_doc_type(b"[1,2]", "a"));
        assert!(!has_doc_type(b"", "a"));
    }

    #[test]
    fn records_are_embedded_verbatim_with_escaped_keys() {
        let scan = ScanGuard::new(Box::new(BufferedQueryIterator::new(vec![
            entry("k\"1", r#"{"a":1}"#),
            entry("k2", "plain text"),
        ])));

        let (payload, count) = collect_records(scan, |_| true).unwrap();
        assert_eq!(count, 2);
        assert_eq!(
            String::from_utf8(payload).unwrap(),
            r#"[{"Key":"k\"1","Record":{"a":1}},{"Key":"k2","Record":"plain text"}]"#
        );
    }

    #[test]
    fn empty_scan_renders_empty_array() {
        let scan = ScanGuard::new(Box::new(BufferedQueryIterator::new(Vec::new())));
        let (payload, count) = collect_records(scan, |_| true).unwrap();
        assert_eq!(payload, b"[]");
        assert_eq!(count, 0);
    }
}
