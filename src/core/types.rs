use std::fmt;

use crate::common::error::ConversionError;

/// Column types an entity field can be declared with.
///
/// The adapter never creates tables, so the type is only used to coerce
/// driver values into the shape a field setter expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,

    /// 64-bit floating point number.
    Float64,

    /// UTF-8 text.
    Text,

    /// Boolean, usually stored as 0/1 by the database.
    Bool,

    /// Raw bytes.
    Blob,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Int64 => write!(f, "Integer"),
            DataType::Float64 => write!(f, "Float"),
            DataType::Text => write!(f, "String"),
            DataType::Bool => write!(f, "Boolean"),
            DataType::Blob => write!(f, "Blob"),
        }
    }
}

/// A value bound into a statement or read back from a result row.
///
/// `Null` doubles as "field not set" when values are extracted from an entity.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum Value {
    /// A 64-bit signed integer value.
    Int64(i64),

    /// A 64-bit floating point number.
    Float64(f64),

    /// A UTF-8 text string.
    Text(String),

    /// A boolean value (true/false).
    Bool(bool),

    /// Raw bytes.
    Blob(Vec<u8>),

    /// Represents a NULL value (absence of data).
    Null,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int64(i) => write!(f, "{i}"),
            Value::Float64(fl) => write!(f, "{fl}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Blob(bytes) => write!(f, "<{} bytes>", bytes.len()),
            Value::Null => write!(f, "NULL"),
        }
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The type name used in conversion errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int64(_) => "Integer",
            Value::Float64(_) => "Float",
            Value::Text(_) => "String",
            Value::Bool(_) => "Boolean",
            Value::Blob(_) => "Blob",
            Value::Null => "Null",
        }
    }

    /// Converts a driver value into the representation a column of
    /// `data_type` holds.
    ///
    /// Databases without a native boolean hand back integers, and integer
    /// literals come back for float columns, so both are widened here. Any
    /// other mismatch is returned unchanged and left for the field setter to
    /// reject.
    pub fn coerce(self, data_type: DataType) -> Value {
        match (self, data_type) {
            (Value::Int64(i), DataType::Bool) => Value::Bool(i != 0),
            (Value::Int64(i), DataType::Float64) => Value::Float64(i as f64),
            (Value::Bool(b), DataType::Int64) => Value::Int64(i64::from(b)),
            (value, _) => value,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int64(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int64(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float64(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Conversion from a [`Value`] into a Rust field type.
///
/// Implemented for the scalar types entities store, and for `Option<T>` where
/// `NULL` becomes `None`.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, ConversionError>;
}

fn mismatch(expected: &'static str, value: &Value) -> ConversionError {
    ConversionError {
        expected,
        found: value.type_name(),
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Int64(i) => Ok(i),
            Value::Bool(b) => Ok(i64::from(b)),
            other => Err(mismatch("Integer", &other)),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        let wide = i64::from_value(value)?;
        i32::try_from(wide).map_err(|_| ConversionError {
            expected: "32-bit Integer",
            found: "out of range Integer",
        })
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Float64(f) => Ok(f),
            Value::Int64(i) => Ok(i as f64),
            other => Err(mismatch("Float", &other)),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Bool(b) => Ok(b),
            Value::Int64(i) => Ok(i != 0),
            other => Err(mismatch("Boolean", &other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(mismatch("String", &other)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Blob(bytes) => Ok(bytes),
            Value::Text(s) => Ok(s.into_bytes()),
            other => Err(mismatch("Blob", &other)),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        Ok(value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
