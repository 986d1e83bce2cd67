//! Deployment configuration for the asset registrar.
//!
//! # Responsibility
//! - Name the private data collection shared by the consuming organizations.
//! - Select how create operations obtain record identifiers.
//!
//! # Invariants
//! - `private_collection` is never empty after construction.
//! - Changing either value after records exist splits the ledger view; both
//!   are part of the client-facing contract.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Collection name agreed with the organizations allowed to read the
/// private measurements.
pub const DEFAULT_PRIVATE_COLLECTION: &str = "collectionDimensionalEnergy";

/// How create operations obtain the identifier of a new record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentifierMode {
    /// Registrar derives `<prefix>_<nanos>` and returns it as the payload.
    #[default]
    Generated,
    /// Caller passes the identifier as the first argument; payload is empty.
    CallerSupplied,
}

impl IdentifierMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Generated => "generated",
            Self::CallerSupplied => "caller-supplied",
        }
    }
}

impl FromStr for IdentifierMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "generated" => Ok(Self::Generated),
            "caller-supplied" | "caller_supplied" | "caller" => Ok(Self::CallerSupplied),
            other => Err(ConfigError::UnsupportedIdentifierMode(other.to_string())),
        }
    }
}

impl Display for IdentifierMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyCollection,
    UnsupportedIdentifierMode(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCollection => write!(f, "private collection name cannot be empty"),
            Self::UnsupportedIdentifierMode(value) => write!(
                f,
                "unsupported identifier mode `{value}`; expected generated|caller-supplied"
            ),
        }
    }
}

impl Error for ConfigError {}

/// Immutable registrar settings resolved at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrarConfig {
    private_collection: String,
    identifier_mode: IdentifierMode,
}

impl RegistrarConfig {
    /// Validates and builds a configuration.
    ///
    /// # Errors
    /// - `ConfigError::EmptyCollection` when the trimmed name is empty.
    pub fn new(
        private_collection: impl Into<String>,
        identifier_mode: IdentifierMode,
    ) -> Result<Self, ConfigError> {
        let private_collection = private_collection.into().trim().to_string();
        if private_collection.is_empty() {
            return Err(ConfigError::EmptyCollection);
        }
        Ok(Self {
            private_collection,
            identifier_mode,
        })
    }

    pub fn private_collection(&self) -> &str {
        &self.private_collection
    }

    pub fn identifier_mode(&self) -> IdentifierMode {
        self.identifier_mode
    }
}

impl Default for RegistrarConfig {
    fn default() -> Self {
        Self {
            private_collection: DEFAULT_PRIVATE_COLLECTION.to_string(),
            identifier_mode: IdentifierMode::default(),
        }
    }
}
