//! Positional-argument parsing for create and read operations.
//!
//! # Invariants
//! - Argument order is part of the client contract and must not change.
//! - Parsing never touches the ledger; every failure here leaves state
//!   untouched.

use super::error::{ContractError, ContractResult};
use crate::config::IdentifierMode;
use crate::model::measurement::EnvironmentalReadings;

const ENERGY_USAGE: &str = "location, energyLevel, frequency, recordedBy";
const ENVIRONMENT_USAGE: &str =
    "location, temperature, humidity, pressure, [radiationLevel], recordedBy";

/// Validated input of `initDimensionalEnergy`.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionalEnergyRequest {
    /// `None` in generated-identifier mode.
    pub id: Option<String>,
    pub location: String,
    pub energy_level: f64,
    pub frequency: f64,
    pub recorded_by: String,
}

impl DimensionalEnergyRequest {
    /// Parses `[id,] location, energyLevel, frequency, recordedBy`.
    pub fn from_args(args: &[String], mode: IdentifierMode) -> ContractResult<Self> {
        let (id, fields) = split_identifier(args, mode, &[4], ENERGY_USAGE)?;
        Ok(Self {
            id,
            location: fields[0].clone(),
            energy_level: parse_number("energyLevel", &fields[1])?,
            frequency: parse_number("frequency", &fields[2])?,
            recorded_by: fields[3].clone(),
        })
    }
}

/// Validated input of `initEnvironmentalControl`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentalControlRequest {
    /// `None` in generated-identifier mode.
    pub id: Option<String>,
    pub location: String,
    pub readings: EnvironmentalReadings,
    pub recorded_by: String,
}

impl EnvironmentalControlRequest {
    /// Parses `[id,] location, temperature, humidity, pressure,
    /// [radiationLevel,] recordedBy`.
    pub fn from_args(args: &[String], mode: IdentifierMode) -> ContractResult<Self> {
        let (id, fields) = split_identifier(args, mode, &[5, 6], ENVIRONMENT_USAGE)?;
        let radiation_level = if fields.len() == 6 {
            Some(parse_number("radiationLevel", &fields[4])?)
        } else {
            None
        };
        let readings = EnvironmentalReadings {
            temperature: parse_number("temperature", &fields[1])?,
            humidity: parse_number("humidity", &fields[2])?,
            pressure: parse_number("pressure", &fields[3])?,
            radiation_level,
        };
        Ok(Self {
            id,
            location: fields[0].clone(),
            readings,
            recorded_by: fields[fields.len() - 1].clone(),
        })
    }
}

/// Parses the single `ID` argument of read operations.
pub fn parse_read_id(args: &[String]) -> ContractResult<&str> {
    match args {
        [id] if id.is_empty() => Err(ContractError::EmptyIdentifier),
        [id] => Ok(id.as_str()),
        _ => Err(ContractError::ArgumentCount {
            expected: "1".to_string(),
            usage: "ID".to_string(),
            got: args.len(),
        }),
    }
}

/// Splits off the leading identifier (caller-supplied mode) and checks arity
/// of the remaining record fields against `field_counts`.
fn split_identifier<'a>(
    args: &'a [String],
    mode: IdentifierMode,
    field_counts: &[usize],
    usage: &str,
) -> ContractResult<(Option<String>, &'a [String])> {
    let offset = match mode {
        IdentifierMode::Generated => 0,
        IdentifierMode::CallerSupplied => 1,
    };
    let field_count = args.len().checked_sub(offset);
    if !field_count.is_some_and(|count| field_counts.contains(&count)) {
        return Err(arity_error(mode, field_counts, usage, args.len()));
    }

    let (id, fields) = args.split_at(offset);
    let id = match id.first() {
        Some(value) if value.is_empty() => return Err(ContractError::EmptyIdentifier),
        Some(value) => Some(value.clone()),
        None => None,
    };
    Ok((id, fields))
}

fn arity_error(
    mode: IdentifierMode,
    field_counts: &[usize],
    usage: &str,
    got: usize,
) -> ContractError {
    let (offset, usage) = match mode {
        IdentifierMode::Generated => (0, usage.to_string()),
        IdentifierMode::CallerSupplied => (1, format!("id, {usage}")),
    };
    let expected = field_counts
        .iter()
        .map(|count| (count + offset).to_string())
        .collect::<Vec<_>>()
        .join(" or ");
    ContractError::ArgumentCount {
        expected,
        usage,
        got,
    }
}

fn parse_number(field: &'static str, raw: &str) -> ContractResult<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ContractError::InvalidNumber {
            field,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn energy_request_parses_generated_mode_args() {
        let request = DimensionalEnergyRequest::from_args(
            &args(&["Hawkins", "42.5", "13.1", "SensorA"]),
            IdentifierMode::Generated,
        )
        .unwrap();
        assert_eq!(request.id, None);
        assert_eq!(request.location, "Hawkins");
        assert_eq!(request.energy_level, 42.5);
        assert_eq!(request.frequency, 13.1);
        assert_eq!(request.recorded_by, "SensorA");
    }

    #[test]
    fn energy_request_takes_leading_id_in_caller_mode() {
        let request = DimensionalEnergyRequest::from_args(
            &args(&["e-1", "Hawkins", "1", "2", "SensorA"]),
            IdentifierMode::CallerSupplied,
        )
        .unwrap();
        assert_eq!(request.id.as_deref(), Some("e-1"));
        assert_eq!(request.location, "Hawkins");
    }

    #[test]
    fn arity_message_lists_expected_count_and_usage() {
        let err = DimensionalEnergyRequest::from_args(
            &args(&["Hawkins", "1"]),
            IdentifierMode::CallerSupplied,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Incorrect number of arguments. Expecting 5 (id, location, energyLevel, frequency, recordedBy), got 2"
        );
    }

    #[test]
    fn environment_request_accepts_optional_radiation() {
        let without = EnvironmentalControlRequest::from_args(
            &args(&["Lab", "21.0", "55.0", "1013.0", "Ops"]),
            IdentifierMode::Generated,
        )
        .unwrap();
        assert_eq!(without.readings.radiation_level, None);
        assert_eq!(without.recorded_by, "Ops");

        let with = EnvironmentalControlRequest::from_args(
            &args(&["Lab", "21.0", "55.0", "1013.0", "0.3", "Ops"]),
            IdentifierMode::Generated,
        )
        .unwrap();
        assert_eq!(with.readings.radiation_level, Some(0.3));
        assert_eq!(with.recorded_by, "Ops");
    }

    #[test]
    fn environment_arity_error_mentions_both_counts() {
        let err = EnvironmentalControlRequest::from_args(&args(&[]), IdentifierMode::Generated)
            .unwrap_err();
        assert!(err.to_string().contains("Expecting 5 or 6"));
        assert!(err.is_validation());
    }

    #[test]
    fn non_numeric_and_non_finite_values_name_the_field() {
        let err = EnvironmentalControlRequest::from_args(
            &args(&["Lab", "21.0", "wet", "1013.0", "Ops"]),
            IdentifierMode::Generated,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ContractError::InvalidNumber { field: "humidity", ref value } if value == "wet"
        ));

        let err = DimensionalEnergyRequest::from_args(
            &args(&["Hawkins", "NaN", "1", "SensorA"]),
            IdentifierMode::Generated,
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("energyLevel must be a number"));
    }

    #[test]
    fn empty_caller_id_is_rejected() {
        let err = DimensionalEnergyRequest::from_args(
            &args(&["", "Hawkins", "1", "2", "SensorA"]),
            IdentifierMode::CallerSupplied,
        )
        .unwrap_err();
        assert!(matches!(err, ContractError::EmptyIdentifier));
    }

    #[test]
    fn read_id_requires_exactly_one_non_empty_argument() {
        assert_eq!(parse_read_id(&args(&["x"])).unwrap(), "x");
        assert!(matches!(
            parse_read_id(&args(&[])),
            Err(ContractError::ArgumentCount { got: 0, .. })
        ));
        assert!(matches!(
            parse_read_id(&args(&["a", "b"])),
            Err(ContractError::ArgumentCount { got: 2, .. })
        ));
        assert!(matches!(
            parse_read_id(&args(&[""])),
            Err(ContractError::EmptyIdentifier)
        ));
    }
}
