//! Asset registrar: validation, record construction and ledger pass-through.
//!
//! # Responsibility
//! - Create/read/list private dimensional-energy measurements in the
//!   configured private collection.
//! - Create/read/list public environmental-control records in world state.
//! - Route named invocations to those operations (`dispatch`).
//!
//! # Invariants
//! - Input validation completes before the first ledger call.
//! - Each create performs exactly one ledger write, and only to a vacant
//!   key; records are never overwritten.
//! - The registrar holds configuration only; all state lives behind the
//!   `ChaincodeStub` passed to each call.
//! - Log lines carry identifiers and counts, never readings or locations.

use crate::config::RegistrarConfig;
use crate::ledger::ChaincodeStub;
use crate::model::measurement::{
    generated_id, DimensionalEnergyMeasurement, EnvironmentalControlData, RecordKind,
};
use log::{debug, info};

pub mod dispatch;
pub mod error;
pub mod request;
mod scan;

pub use dispatch::{Function, Response};
pub use error::{ContractError, ContractResult};
pub use request::{parse_read_id, DimensionalEnergyRequest, EnvironmentalControlRequest};

use scan::{collect_records, has_doc_type, ScanGuard};

/// Stateless registrar bound to one deployment configuration.
#[derive(Debug, Clone, Default)]
pub struct AssetRegistrar {
    config: RegistrarConfig,
}

impl AssetRegistrar {
    pub fn new(config: RegistrarConfig) -> Self {
        Self { config }
    }

    /// Stores a private measurement and returns its identifier.
    ///
    /// # Errors
    /// - `ContractError::AlreadyExists` when the collection already holds
    ///   `id`; nothing is written.
    /// - `ContractError::Serialization` / `ContractError::Ledger` from the
    ///   backend, unchanged.
    pub fn create_dimensional_energy<S>(
        &self,
        stub: &S,
        request: &DimensionalEnergyRequest,
    ) -> ContractResult<String>
    where
        S: ChaincodeStub + ?Sized,
    {
        let recorded_at = stub.tx_timestamp()?;
        let id = request
            .id
            .clone()
            .unwrap_or_else(|| generated_id(RecordKind::DimensionalEnergy.id_prefix(), recorded_at));

        let record = DimensionalEnergyMeasurement::new(
            id.as_str(),
            request.location.as_str(),
            request.energy_level,
            request.frequency,
            request.recorded_by.as_str(),
            recorded_at,
        );
        let existing = stub.get_private_data(self.config.private_collection(), &id)?;
        ensure_vacant(existing, RecordKind::DimensionalEnergy, &id)?;

        let bytes = serde_json::to_vec(&record)?;
        stub.put_private_data(self.config.private_collection(), &id, &bytes)?;

        info!(
            "event=record_create module=registrar status=ok kind={} collection={} id={}",
            record.doc_type,
            self.config.private_collection(),
            id
        );
        Ok(id)
    }

    /// Returns the stored bytes of one private measurement.
    ///
    /// # Errors
    /// - `ContractError::NotFound` when the collection has no such key.
    pub fn read_dimensional_energy<S>(&self, stub: &S, id: &str) -> ContractResult<Vec<u8>>
    where
        S: ChaincodeStub + ?Sized,
    {
        let value = stub.get_private_data(self.config.private_collection(), id)?;
        found_or_not_found(value, RecordKind::DimensionalEnergy, id)
    }

    /// Lists every entry of the private collection.
    pub fn list_dimensional_energy<S>(&self, stub: &S) -> ContractResult<Vec<u8>>
    where
        S: ChaincodeStub + ?Sized,
    {
        let collection = self.config.private_collection();
        let scan = ScanGuard::new(stub.get_private_data_by_range(collection, "", "")?);
        let (payload, count) = collect_records(scan, |_| true)?;

        debug!(
            "event=record_list module=registrar status=ok kind={} count={count}",
            RecordKind::DimensionalEnergy.doc_type()
        );
        Ok(payload)
    }

    /// Stores a public environmental-control record and returns its
    /// identifier.
    ///
    /// Any occupied key is rejected with `ContractError::AlreadyExists`,
    /// whatever `docType` it holds; world state is shared with other
    /// contracts.
    pub fn create_environmental_control<S>(
        &self,
        stub: &S,
        request: &EnvironmentalControlRequest,
    ) -> ContractResult<String>
    where
        S: ChaincodeStub + ?Sized,
    {
        let recorded_at = stub.tx_timestamp()?;
        let id = request.id.clone().unwrap_or_else(|| {
            generated_id(RecordKind::EnvironmentalControl.id_prefix(), recorded_at)
        });

        let record = EnvironmentalControlData::new(
            id.as_str(),
            request.location.as_str(),
            request.readings,
            request.recorded_by.as_str(),
            recorded_at,
        );
        ensure_vacant(stub.get_state(&id)?, RecordKind::EnvironmentalControl, &id)?;

        let bytes = serde_json::to_vec(&record)?;
        stub.put_state(&id, &bytes)?;

        info!(
            "event=record_create module=registrar status=ok kind={} collection=world_state id={}",
            record.doc_type, id
        );
        Ok(id)
    }

    /// Returns the stored bytes under `id` in world state.
    ///
    /// The key is not checked against `docType`; world state is shared and a
    /// read returns whatever the key holds.
    pub fn read_environmental_control<S>(&self, stub: &S, id: &str) -> ContractResult<Vec<u8>>
    where
        S: ChaincodeStub + ?Sized,
    {
        let value = stub.get_state(id)?;
        found_or_not_found(value, RecordKind::EnvironmentalControl, id)
    }

    /// Lists world-state entries tagged `environmentalControl`.
    ///
    /// Other record types and malformed values in the shared keyspace are
    /// skipped.
    pub fn list_environmental_control<S>(&self, stub: &S) -> ContractResult<Vec<u8>>
    where
        S: ChaincodeStub + ?Sized,
    {
        let doc_type = RecordKind::EnvironmentalControl.doc_type();
        let scan = ScanGuard::new(stub.get_state_by_range("", "")?);
        let (payload, count) = collect_records(scan, |entry| has_doc_type(&entry.value, doc_type))?;

        debug!("event=record_list module=registrar status=ok kind={doc_type} count={count}");
        Ok(payload)
    }
}

fn ensure_vacant(existing: Option<Vec<u8>>, kind: RecordKind, id: &str) -> ContractResult<()> {
    match existing {
        Some(bytes) if !bytes.is_empty() => Err(ContractError::AlreadyExists {
            kind,
            id: id.to_string(),
        }),
        _ => Ok(()),
    }
}

fn found_or_not_found(
    value: Option<Vec<u8>>,
    kind: RecordKind,
    id: &str,
) -> ContractResult<Vec<u8>> {
    match value {
        Some(bytes) if !bytes.is_empty() => Ok(bytes),
        _ => Err(ContractError::NotFound {
            kind,
            id: id.to_string(),
        }),
    }
}
