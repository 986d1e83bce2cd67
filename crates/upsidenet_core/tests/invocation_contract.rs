use std::cell::{Cell, RefCell};
use std::rc::Rc;
use upsidenet_core::ledger::{BoxedQueryIterator, LedgerResult, StateQueryIterator};
use upsidenet_core::{
    AssetRegistrar, ChaincodeStub, ContractError, Function, LedgerError, MemoryLedger,
    QueryResult,
};

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

/// Cursor that yields scripted items and records how often it was closed.
struct ScriptedIterator {
    items: std::vec::IntoIter<LedgerResult<QueryResult>>,
    closes: Rc<Cell<usize>>,
}

impl Iterator for ScriptedIterator {
    type Item = LedgerResult<QueryResult>;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next()
    }
}

impl StateQueryIterator for ScriptedIterator {
    fn close(&mut self) -> LedgerResult<()> {
        self.closes.set(self.closes.get() + 1);
        Ok(())
    }
}

/// Stub whose scans and writes can be made to fail.
#[derive(Default)]
struct FaultyStub {
    scan_items: RefCell<Vec<LedgerResult<QueryResult>>>,
    closes: Rc<Cell<usize>>,
    fail_writes: bool,
    writes: Cell<usize>,
}

impl FaultyStub {
    fn with_scan(items: Vec<LedgerResult<QueryResult>>) -> Self {
        Self {
            scan_items: RefCell::new(items),
            ..Self::default()
        }
    }

    fn iterator(&self) -> BoxedQueryIterator<'_> {
        Box::new(ScriptedIterator {
            items: self.scan_items.take().into_iter(),
            closes: Rc::clone(&self.closes),
        })
    }

    fn write(&self) -> LedgerResult<()> {
        if self.fail_writes {
            return Err(LedgerError::Backend("disk quota exceeded".to_string()));
        }
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

impl ChaincodeStub for FaultyStub {
    fn get_state(&self, _key: &str) -> LedgerResult<Option<Vec<u8>>> {
        Err(LedgerError::Backend("peer unavailable".to_string()))
    }

    fn put_state(&self, _key: &str, _value: &[u8]) -> LedgerResult<()> {
        self.write()
    }

    fn get_state_by_range(&self, _start: &str, _end: &str) -> LedgerResult<BoxedQueryIterator<'_>> {
        Ok(self.iterator())
    }

    fn get_private_data(&self, _collection: &str, _key: &str) -> LedgerResult<Option<Vec<u8>>> {
        Ok(None)
    }

    fn put_private_data(&self, _collection: &str, _key: &str, _value: &[u8]) -> LedgerResult<()> {
        self.write()
    }

    fn get_private_data_by_range(
        &self,
        _collection: &str,
        _start: &str,
        _end: &str,
    ) -> LedgerResult<BoxedQueryIterator<'_>> {
        Ok(self.iterator())
    }
}

fn entry(key: &str, value: &str) -> LedgerResult<QueryResult> {
    Ok(QueryResult {
        key: key.to_string(),
        value: value.as_bytes().to_vec(),
    })
}

#[test]
fn unknown_function_is_rejected_with_its_name() {
    let ledger = MemoryLedger::new();
    let response = AssetRegistrar::default().invoke(&ledger, "deleteEverything", &[]);

    assert!(!response.is_ok());
    assert_eq!(response.message, "Unknown function: deleteEverything");
    assert_eq!(ledger.state_len(), 0);
}

#[test]
fn init_succeeds_with_empty_payload_and_no_writes() {
    let ledger = MemoryLedger::new();
    let response = AssetRegistrar::default().init(&ledger);

    assert!(response.is_ok());
    assert!(response.payload.is_empty());
    assert_eq!(ledger.state_len(), 0);
}

#[test]
fn read_requires_exactly_one_identifier() {
    let ledger = MemoryLedger::new();
    let registrar = AssetRegistrar::default();

    for function in ["readDimensionalEnergy", "readEnvironmentalControl"] {
        let none = registrar.invoke(&ledger, function, &[]);
        assert!(none.message.contains("Expecting 1"), "{}", none.message);

        let extra = registrar.invoke(&ledger, function, &args(&["a", "b"]));
        assert!(!extra.is_ok());

        let empty = registrar.invoke(&ledger, function, &args(&[""]));
        assert!(!empty.is_ok());
    }
}

#[test]
fn list_functions_ignore_extra_arguments() {
    let ledger = MemoryLedger::new();
    let registrar = AssetRegistrar::default();

    for function in ["getAllDimensionalEnergy", "getAllEnvironmentalControl"] {
        let response = registrar.invoke(&ledger, function, &args(&["ignored"]));
        assert!(response.is_ok(), "{}", response.message);
        assert_eq!(response.payload, b"[]");
    }
}

#[test]
fn scan_cursor_is_closed_after_successful_listing() {
    let stub = FaultyStub::with_scan(vec![entry("k1", r#"{"docType":"dimensionalEnergy"}"#)]);
    let payload = AssetRegistrar::default()
        .execute(&stub, Function::GetAllDimensionalEnergy, &[])
        .unwrap();

    assert_eq!(
        String::from_utf8(payload).unwrap(),
        r#"[{"Key":"k1","Record":{"docType":"dimensionalEnergy"}}]"#
    );
    assert_eq!(stub.closes.get(), 1);
}

#[test]
fn scan_cursor_is_closed_when_iteration_fails() {
    let stub = FaultyStub::with_scan(vec![
        entry("env_1", r#"{"docType":"environmentalControl"}"#),
        Err(LedgerError::Backend("cursor expired".to_string())),
        entry("env_2", r#"{"docType":"environmentalControl"}"#),
    ]);

    let err = AssetRegistrar::default()
        .execute(&stub, Function::GetAllEnvironmentalControl, &[])
        .unwrap_err();

    assert!(matches!(err, ContractError::Ledger(LedgerError::Backend(_))));
    assert_eq!(err.to_string(), "cursor expired");
    assert_eq!(stub.closes.get(), 1);
}

#[test]
fn backend_failures_propagate_verbatim() {
    let stub = FaultyStub {
        fail_writes: true,
        ..FaultyStub::default()
    };
    let registrar = AssetRegistrar::default();

    let create = registrar.invoke(
        &stub,
        "initDimensionalEnergy",
        &args(&["Hawkins", "42.5", "13.1", "SensorA"]),
    );
    assert!(!create.is_ok());
    assert_eq!(create.message, "disk quota exceeded");

    let read = registrar.invoke(&stub, "readEnvironmentalControl", &args(&["env_1"]));
    assert_eq!(read.message, "peer unavailable");
}

#[test]
fn validation_failures_never_reach_the_backend() {
    let stub = FaultyStub::default();
    let registrar = AssetRegistrar::default();

    let response = registrar.invoke(
        &stub,
        "initEnvironmentalControl",
        &args(&["Lab", "warm", "55", "1013", "Ops"]),
    );
    assert!(!response.is_ok());
    assert!(response.message.contains("temperature"));
    assert_eq!(stub.writes.get(), 0);
}
