//! Named-function routing and the peer response envelope.
//!
//! # Invariants
//! - Function names and positional argument orders are the client wire
//!   contract; renaming a variant's string breaks deployed clients.
//! - Every invocation produces exactly one `Response`; errors never panic.

use super::error::{ContractError, ContractResult};
use super::request::{parse_read_id, DimensionalEnergyRequest, EnvironmentalControlRequest};
use super::AssetRegistrar;
use crate::config::IdentifierMode;
use crate::ledger::sqlite_ledger::TransactionOutcome;
use crate::ledger::ChaincodeStub;
use crate::logging::sanitize_message;
use log::{info, warn};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Instant;

/// Peer status code for a successful invocation.
pub const OK: i32 = 200;
/// Peer status code for a rejected invocation.
pub const ERROR: i32 = 500;

const MAX_LOGGED_FUNCTION_CHARS: usize = 64;

/// Chaincode functions exposed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    InitDimensionalEnergy,
    InitEnvironmentalControl,
    ReadDimensionalEnergy,
    ReadEnvironmentalControl,
    GetAllDimensionalEnergy,
    GetAllEnvironmentalControl,
}

impl Function {
    pub const ALL: [Function; 6] = [
        Self::InitDimensionalEnergy,
        Self::InitEnvironmentalControl,
        Self::ReadDimensionalEnergy,
        Self::ReadEnvironmentalControl,
        Self::GetAllDimensionalEnergy,
        Self::GetAllEnvironmentalControl,
    ];

    /// Wire name sent by client SDKs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InitDimensionalEnergy => "initDimensionalEnergy",
            Self::InitEnvironmentalControl => "initEnvironmentalControl",
            Self::ReadDimensionalEnergy => "readDimensionalEnergy",
            Self::ReadEnvironmentalControl => "readEnvironmentalControl",
            Self::GetAllDimensionalEnergy => "getAllDimensionalEnergy",
            Self::GetAllEnvironmentalControl => "getAllEnvironmentalControl",
        }
    }
}

impl FromStr for Function {
    type Err = ContractError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|function| function.as_str() == name)
            .ok_or_else(|| ContractError::UnknownFunction(name.to_string()))
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Peer response returned to the host platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: i32,
    pub message: String,
    pub payload: Vec<u8>,
}

impl Response {
    pub fn success(payload: Vec<u8>) -> Self {
        Self {
            status: OK,
            message: String::new(),
            payload,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ERROR,
            message: message.into(),
            payload: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == OK
    }
}

impl From<ContractResult<Vec<u8>>> for Response {
    fn from(value: ContractResult<Vec<u8>>) -> Self {
        match value {
            Ok(payload) => Self::success(payload),
            Err(err) => Self::error(err.to_string()),
        }
    }
}

impl TransactionOutcome for Response {
    fn should_commit(&self) -> bool {
        self.is_ok()
    }
}

impl AssetRegistrar {
    /// Instantiation hook. Writes nothing.
    pub fn init<S>(&self, _stub: &S) -> Response
    where
        S: ChaincodeStub + ?Sized,
    {
        info!(
            "event=chaincode_init module=registrar status=ok collection={} id_mode={}",
            self.config.private_collection(),
            self.config.identifier_mode()
        );
        Response::success(Vec::new())
    }

    /// Routes one invocation by function name.
    pub fn invoke<S>(&self, stub: &S, function: &str, args: &[String]) -> Response
    where
        S: ChaincodeStub + ?Sized,
    {
        let started_at = Instant::now();
        let logged_name = loggable_function_name(function);
        let result = function
            .parse::<Function>()
            .and_then(|function| self.execute(stub, function, args));

        match &result {
            Ok(payload) => info!(
                "event=invoke module=registrar status=ok function={logged_name} payload_bytes={} duration_ms={}",
                payload.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=invoke module=registrar status=error function={logged_name} error_code={} duration_ms={}",
                err.code(),
                started_at.elapsed().as_millis()
            ),
        }

        Response::from(result)
    }

    /// Runs a resolved function and returns its payload.
    ///
    /// Create payloads are the record identifier in generated mode and empty
    /// in caller-supplied mode. List operations ignore extra arguments.
    pub fn execute<S>(&self, stub: &S, function: Function, args: &[String]) -> ContractResult<Vec<u8>>
    where
        S: ChaincodeStub + ?Sized,
    {
        let mode = self.config.identifier_mode();
        match function {
            Function::InitDimensionalEnergy => {
                let request = DimensionalEnergyRequest::from_args(args, mode)?;
                let id = self.create_dimensional_energy(stub, &request)?;
                Ok(create_payload(mode, id))
            }
            Function::InitEnvironmentalControl => {
                let request = EnvironmentalControlRequest::from_args(args, mode)?;
                let id = self.create_environmental_control(stub, &request)?;
                Ok(create_payload(mode, id))
            }
            Function::ReadDimensionalEnergy => {
                self.read_dimensional_energy(stub, parse_read_id(args)?)
            }
            Function::ReadEnvironmentalControl => {
                self.read_environmental_control(stub, parse_read_id(args)?)
            }
            Function::GetAllDimensionalEnergy => self.list_dimensional_energy(stub),
            Function::GetAllEnvironmentalControl => self.list_environmental_control(stub),
        }
    }
}

/// Single-token form of a client-supplied function name for `key=value` logs.
fn loggable_function_name(name: &str) -> String {
    sanitize_message(name, MAX_LOGGED_FUNCTION_CHARS).replace([' ', '\t'], "_")
}

fn create_payload(mode: IdentifierMode, id: String) -> Vec<u8> {
    match mode {
        IdentifierMode::Generated => id.into_bytes(),
        IdentifierMode::CallerSupplied => Vec::new(),
    }
}
