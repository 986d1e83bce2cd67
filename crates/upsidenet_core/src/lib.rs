//! Chaincode logic for the UpsideNet measurement ledger.
//!
//! Private dimensional-energy measurements go to a private data collection;
//! public environmental-control records go to the shared world state. All
//! storage is reached through the `ChaincodeStub` handed to each invocation.

pub mod config;
pub mod db;
pub mod ledger;
pub mod logging;
pub mod model;
pub mod registrar;

pub use config::{ConfigError, IdentifierMode, RegistrarConfig, DEFAULT_PRIVATE_COLLECTION};
pub use ledger::{
    invoke_in_transaction, ChaincodeStub, LedgerError, LedgerResult, MemoryLedger, QueryResult,
    SqliteLedger, StateQueryIterator,
};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::measurement::{
    DimensionalEnergyMeasurement, EnvironmentalControlData, EnvironmentalReadings, RecordKind,
};
pub use registrar::{
    AssetRegistrar, ContractError, ContractResult, DimensionalEnergyRequest,
    EnvironmentalControlRequest, Function, Response,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
