//! Measurement records and their JSON layout.
//!
//! # Responsibility
//! - Describe the private dimensional-energy record and the public
//!   environmental-control record.
//! - Derive write-time metadata (RFC-3339 timestamp, generated identifier).
//!
//! # Invariants
//! - Serialized field names and order match the persisted ledger layout:
//!   `docType, id, location, <readings>, timestamp, recordedBy`.
//! - `radiationLevel` reads back as `0.0` when absent from stored JSON.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// `docType` tag of [`DimensionalEnergyMeasurement`].
pub const DIMENSIONAL_ENERGY_DOC_TYPE: &str = "dimensionalEnergy";
/// `docType` tag of [`EnvironmentalControlData`].
pub const ENVIRONMENTAL_CONTROL_DOC_TYPE: &str = "environmentalControl";

/// Identifier prefix for generated dimensional-energy ids.
pub const DIMENSIONAL_ENERGY_ID_PREFIX: &str = "energy";
/// Identifier prefix for generated environmental-control ids.
pub const ENVIRONMENTAL_CONTROL_ID_PREFIX: &str = "env";

/// The two record kinds managed by the registrar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Private; lives in the configured private data collection.
    DimensionalEnergy,
    /// Public; lives in the shared world state next to unrelated keys.
    EnvironmentalControl,
}

impl RecordKind {
    /// Persisted `docType` tag.
    pub fn doc_type(self) -> &'static str {
        match self {
            Self::DimensionalEnergy => DIMENSIONAL_ENERGY_DOC_TYPE,
            Self::EnvironmentalControl => ENVIRONMENTAL_CONTROL_DOC_TYPE,
        }
    }

    /// Prefix used for generated identifiers.
    pub fn id_prefix(self) -> &'static str {
        match self {
            Self::DimensionalEnergy => DIMENSIONAL_ENERGY_ID_PREFIX,
            Self::EnvironmentalControl => ENVIRONMENTAL_CONTROL_ID_PREFIX,
        }
    }

    /// Human-readable label used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::DimensionalEnergy => "Dimensional energy",
            Self::EnvironmentalControl => "Environmental control",
        }
    }
}

/// Private measurement, stored only in the configured private collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionalEnergyMeasurement {
    pub doc_type: String,
    pub id: String,
    pub location: String,
    pub energy_level: f64,
    pub frequency: f64,
    /// RFC-3339, assigned by the registrar.
    pub timestamp: String,
    pub recorded_by: String,
}

impl DimensionalEnergyMeasurement {
    /// Builds a record stamped at `recorded_at`.
    pub fn new(
        id: impl Into<String>,
        location: impl Into<String>,
        energy_level: f64,
        frequency: f64,
        recorded_by: impl Into<String>,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            doc_type: DIMENSIONAL_ENERGY_DOC_TYPE.to_string(),
            id: id.into(),
            location: location.into(),
            energy_level,
            frequency,
            timestamp: format_timestamp(recorded_at),
            recorded_by: recorded_by.into(),
        }
    }
}

/// Public measurement, stored in the shared world state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalControlData {
    pub doc_type: String,
    pub id: String,
    pub location: String,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    #[serde(default)]
    pub radiation_level: f64,
    pub timestamp: String,
    pub recorded_by: String,
}

/// Numeric readings carried by an environmental-control record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentalReadings {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    /// Auxiliary reading; `None` is stored as `0.0`.
    pub radiation_level: Option<f64>,
}

impl EnvironmentalControlData {
    /// Builds a record stamped at `recorded_at`.
    pub fn new(
        id: impl Into<String>,
        location: impl Into<String>,
        readings: EnvironmentalReadings,
        recorded_by: impl Into<String>,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            doc_type: ENVIRONMENTAL_CONTROL_DOC_TYPE.to_string(),
            id: id.into(),
            location: location.into(),
            temperature: readings.temperature,
            humidity: readings.humidity,
            pressure: readings.pressure,
            radiation_level: readings.radiation_level.unwrap_or(0.0),
            timestamp: format_timestamp(recorded_at),
            recorded_by: recorded_by.into(),
        }
    }
}

/// Formats a write-time timestamp as RFC-3339 with second precision.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Derives an identifier such as `energy_1718000000123456789`.
///
/// Uniqueness only holds while no two invocations share a nanosecond; the
/// caller-supplied identifier mode exists for deployments that need more.
pub fn generated_id(prefix: &str, at: DateTime<Utc>) -> String {
    // Out of i64 range only after year 2262; fall back to micros scaled up.
    let nanos = at
        .timestamp_nanos_opt()
        .unwrap_or_else(|| at.timestamp_micros().saturating_mul(1_000));
    format!("{prefix}_{nanos}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 12, 30, 15).unwrap()
    }

    #[test]
    fn energy_record_serializes_in_ledger_field_order() {
        let record =
            DimensionalEnergyMeasurement::new("e1", "Hawkins", 42.5, 13.1, "SensorA", fixed_time());
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"docType":"dimensionalEnergy","id":"e1","location":"Hawkins","energyLevel":42.5,"frequency":13.1,"timestamp":"2024-03-09T12:30:15Z","recordedBy":"SensorA"}"#
        );
    }

    #[test]
    fn environmental_record_defaults_radiation_to_zero() {
        let readings = EnvironmentalReadings {
            temperature: 21.0,
            humidity: 55.0,
            pressure: 1013.0,
            radiation_level: None,
        };
        let record = EnvironmentalControlData::new("env1", "Lab", readings, "Ops", fixed_time());
        assert_eq!(record.radiation_level, 0.0);
        assert_eq!(record.doc_type, ENVIRONMENTAL_CONTROL_DOC_TYPE);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["radiationLevel"], serde_json::json!(0.0));
        assert_eq!(value["recordedBy"], "Ops");
    }

    #[test]
    fn environmental_record_without_radiation_field_still_parses() {
        let stored = r#"{"docType":"environmentalControl","id":"env1","location":"Lab","temperature":1.0,"humidity":2.0,"pressure":3.0,"timestamp":"2024-03-09T12:30:15Z","recordedBy":"Ops"}"#;
        let parsed: EnvironmentalControlData = serde_json::from_str(stored).unwrap();
        assert_eq!(parsed.radiation_level, 0.0);
    }

    #[test]
    fn generated_id_uses_prefix_and_nanoseconds() {
        let at = fixed_time();
        let id = generated_id(DIMENSIONAL_ENERGY_ID_PREFIX, at);
        assert_eq!(id, format!("energy_{}", at.timestamp_nanos_opt().unwrap()));
    }

    #[test]
    fn timestamp_is_rfc3339_utc() {
        let text = format_timestamp(fixed_time());
        assert_eq!(text, "2024-03-09T12:30:15Z");
        assert!(DateTime::parse_from_rfc3339(&text).is_ok());
    }
}
