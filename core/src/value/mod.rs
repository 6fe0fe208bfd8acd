//! Data types of filterable fields.
//!
//! A field's [`DataType`] comes from an explicit override when one is registered, otherwise from its
//! [`StorageKind`]. Fields whose type resolves to [`DataType::Unsupported`] can be projected but never
//! filtered, searched or sorted.
mod coerce;

pub use coerce::{coerce, coerce_all, CoercionError, TimeFormat, TIME_FORMATS};
pub use sieveql::Value;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Text,
    /// Text restricted to a fixed set of labels by the host; filtered like text.
    Enum,
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    /// Validated string in one of the accepted time layouts.
    Time,
}

impl ScalarType {
    pub fn is_text_like(self) -> bool { matches!(self, ScalarType::Text | ScalarType::Enum) }

    /// Types that range operators accept.
    pub fn is_orderable(self) -> bool { !matches!(self, ScalarType::Enum | ScalarType::Bool) }
}

/// How a column is physically stored, as declared at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageKind {
    Text,
    Bool,
    /// Signed integer of the given bit width.
    Int(u8),
    UInt(u8),
    Float(u8),
    Time,
    Json,
    Bytes,
}

impl StorageKind {
    /// Scalar type inferred from the storage kind and bit width.
    pub fn scalar_type(self) -> Option<ScalarType> {
        Some(match self {
            StorageKind::Text => ScalarType::Text,
            StorageKind::Bool => ScalarType::Bool,
            StorageKind::Int(8) => ScalarType::I8,
            StorageKind::Int(16) => ScalarType::I16,
            StorageKind::Int(32) => ScalarType::I32,
            StorageKind::Int(64) => ScalarType::I64,
            StorageKind::UInt(8) => ScalarType::U8,
            StorageKind::UInt(16) => ScalarType::U16,
            StorageKind::UInt(32) => ScalarType::U32,
            StorageKind::UInt(64) => ScalarType::U64,
            StorageKind::Float(32) => ScalarType::F32,
            StorageKind::Float(64) => ScalarType::F64,
            StorageKind::Time => ScalarType::Time,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Scalar(ScalarType),
    /// Array whose elements coerce as the given scalar type.
    Array(ScalarType),
    Unsupported,
}

impl DataType {
    pub fn resolve(explicit: Option<ScalarType>, storage: StorageKind, is_array: bool) -> DataType {
        match (explicit.or_else(|| storage.scalar_type()), is_array) {
            (Some(scalar), false) => DataType::Scalar(scalar),
            (Some(scalar), true) => DataType::Array(scalar),
            (None, _) => DataType::Unsupported,
        }
    }

    pub fn is_supported(&self) -> bool { !matches!(self, DataType::Unsupported) }

    pub fn is_array(&self) -> bool { matches!(self, DataType::Array(_)) }

    /// The scalar type, or the element type of an array.
    pub fn element(&self) -> Option<ScalarType> {
        match self {
            DataType::Scalar(scalar) | DataType::Array(scalar) => Some(*scalar),
            DataType::Unsupported => None,
        }
    }

    pub fn scalar(&self) -> Option<ScalarType> {
        match self {
            DataType::Scalar(scalar) => Some(*scalar),
            _ => None,
        }
    }
}
