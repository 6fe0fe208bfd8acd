//! SQLite value type conversions

use base64::Engine as _;
use sieveql::Value;

/// SQLite value wrapper for type mapping
#[derive(Debug, Clone, PartialEq)]
pub enum SqliteValue {
    Text(String),
    Integer(i64),
    Real(f64),
    Blob(Vec<u8>),
    Null,
}

impl SqliteValue {
    /// Convert to a rusqlite parameter value
    pub fn to_sql(&self) -> rusqlite::types::Value {
        match self {
            SqliteValue::Text(s) => rusqlite::types::Value::Text(s.clone()),
            SqliteValue::Integer(i) => rusqlite::types::Value::Integer(*i),
            SqliteValue::Real(f) => rusqlite::types::Value::Real(*f),
            SqliteValue::Blob(b) => rusqlite::types::Value::Blob(b.clone()),
            SqliteValue::Null => rusqlite::types::Value::Null,
        }
    }

    /// JSON form of a result cell. Blobs become standard base64 strings.
    pub fn into_json(self) -> serde_json::Value {
        match self {
            SqliteValue::Text(s) => serde_json::Value::String(s),
            SqliteValue::Integer(i) => serde_json::Value::from(i),
            // NaN and infinities have no JSON form
            SqliteValue::Real(f) => serde_json::Number::from_f64(f).map(serde_json::Value::Number).unwrap_or(serde_json::Value::Null),
            SqliteValue::Blob(b) => serde_json::Value::String(base64::engine::general_purpose::STANDARD.encode(b)),
            SqliteValue::Null => serde_json::Value::Null,
        }
    }
}

/// SQLite integers are 64-bit signed, so a `Value::UInt` above `i64::MAX` binds as `Real`. It then
/// compares the way SQLite stores such numbers, with `f64` precision: `$eq` on two large unsigned values
/// that differ only below that precision cannot tell them apart.
impl From<Value> for SqliteValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Text(s) | Value::Time(s) => SqliteValue::Text(s),
            Value::Bool(b) => SqliteValue::Integer(if b { 1 } else { 0 }),
            Value::Int(i) => SqliteValue::Integer(i),
            Value::UInt(u) => match i64::try_from(u) {
                Ok(i) => SqliteValue::Integer(i),
                Err(_) => SqliteValue::Real(u as f64),
            },
            Value::Float(f) => SqliteValue::Real(f),
        }
    }
}

impl From<&Value> for SqliteValue {
    fn from(value: &Value) -> Self { value.clone().into() }
}

/// Convert rusqlite Value to our SqliteValue
impl From<rusqlite::types::Value> for SqliteValue {
    fn from(value: rusqlite::types::Value) -> Self {
        match value {
            rusqlite::types::Value::Null => SqliteValue::Null,
            rusqlite::types::Value::Integer(i) => SqliteValue::Integer(i),
            rusqlite::types::Value::Real(f) => SqliteValue::Real(f),
            rusqlite::types::Value::Text(s) => SqliteValue::Text(s),
            rusqlite::types::Value::Blob(b) => SqliteValue::Blob(b),
        }
    }
}
