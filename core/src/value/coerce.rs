use super::ScalarType;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use sieveql::Value;
use std::num::{IntErrorKind, ParseIntError};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    #[error("invalid format '{value}' for type {target:?}")]
    InvalidFormat { value: String, target: ScalarType },
    #[error("numeric overflow: '{value}' cannot fit in {target:?}")]
    Overflow { value: String, target: ScalarType },
}

/// Accepted time layouts, tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    /// `2024-01-02T03:04:05Z`
    Rfc3339,
    /// `2024-01-02T03:04:05.123456789+02:00`
    Rfc3339Nano,
    /// `2024-01-02 03:04:05`
    DateTime,
    /// `2024-01-02`
    Date,
}

pub const TIME_FORMATS: [TimeFormat; 4] = [TimeFormat::Rfc3339, TimeFormat::Rfc3339Nano, TimeFormat::DateTime, TimeFormat::Date];

impl TimeFormat {
    pub fn accepts(self, raw: &str) -> bool {
        match self {
            TimeFormat::Rfc3339 => !has_fraction(raw) && DateTime::parse_from_rfc3339(raw).is_ok(),
            TimeFormat::Rfc3339Nano => has_fraction(raw) && DateTime::parse_from_rfc3339(raw).is_ok(),
            TimeFormat::DateTime => NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").is_ok(),
            TimeFormat::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok(),
        }
    }

    /// First accepted layout matching `raw`.
    pub fn detect(raw: &str) -> Option<TimeFormat> { TIME_FORMATS.into_iter().find(|format| format.accepts(raw)) }
}

fn has_fraction(raw: &str) -> bool { raw.contains('.') }

/// Converts one raw argument into a typed value.
pub fn coerce(raw: &str, target: ScalarType) -> Result<Value, CoercionError> {
    match target {
        ScalarType::Text | ScalarType::Enum => Ok(Value::Text(raw.to_owned())),
        ScalarType::Bool => match raw {
            "1" | "on" | "true" | "yes" => Ok(Value::Bool(true)),
            "0" | "off" | "false" | "no" => Ok(Value::Bool(false)),
            _ => Err(invalid(raw, target)),
        },
        ScalarType::I8 => signed::<i8>(raw, target),
        ScalarType::I16 => signed::<i16>(raw, target),
        ScalarType::I32 => signed::<i32>(raw, target),
        ScalarType::I64 => signed::<i64>(raw, target),
        ScalarType::U8 => unsigned::<u8>(raw, target),
        ScalarType::U16 => unsigned::<u16>(raw, target),
        ScalarType::U32 => unsigned::<u32>(raw, target),
        ScalarType::U64 => unsigned::<u64>(raw, target),
        ScalarType::F32 | ScalarType::F64 => float(raw, target),
        ScalarType::Time => match TimeFormat::detect(raw) {
            Some(_) => Ok(Value::Time(raw.to_owned())),
            None => Err(invalid(raw, target)),
        },
    }
}

/// Coerces every argument or none: the first failure fails the batch.
pub fn coerce_all(raws: &[String], target: ScalarType) -> Result<Vec<Value>, CoercionError> { raws.iter().map(|raw| coerce(raw, target)).collect() }

fn signed<T>(raw: &str, target: ScalarType) -> Result<Value, CoercionError>
where T: FromStr<Err = ParseIntError> + Into<i64> {
    raw.parse::<T>().map(|n| Value::Int(n.into())).map_err(|e| int_error(raw, target, &e))
}

fn unsigned<T>(raw: &str, target: ScalarType) -> Result<Value, CoercionError>
where T: FromStr<Err = ParseIntError> + Into<u64> {
    raw.parse::<T>().map(|n| Value::UInt(n.into())).map_err(|e| int_error(raw, target, &e))
}

fn int_error(raw: &str, target: ScalarType, e: &ParseIntError) -> CoercionError {
    match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => CoercionError::Overflow { value: raw.to_owned(), target },
        _ => invalid(raw, target),
    }
}

// NaN and infinities are rejected; finite literals too large for the width overflow.
fn float(raw: &str, target: ScalarType) -> Result<Value, CoercionError> {
    let value: f64 = raw.parse().map_err(|_| invalid(raw, target))?;
    let lowered = raw.to_ascii_lowercase();
    if lowered.contains("inf") || lowered.contains("nan") {
        return Err(invalid(raw, target));
    }
    let fits = match target {
        ScalarType::F32 => (value as f32).is_finite(),
        _ => value.is_finite(),
    };
    if !fits {
        return Err(CoercionError::Overflow { value: raw.to_owned(), target });
    }
    Ok(Value::Float(value))
}

fn invalid(raw: &str, target: ScalarType) -> CoercionError { CoercionError::InvalidFormat { value: raw.to_owned(), target } }
