use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::vector::{BitVector, Vector, decode_f32, decode_i8};

/// Values that can be bound to a positional `?` placeholder.
///
/// ```rust
/// use sqlvec::prelude::*;
///
/// let params = vec![
///     Value::Int(1),
///     Value::Text("alice".into()),
///     Value::Vector(Vector::float32([0.1, 0.2, 0.3, 0.4])),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean, bound as integer 0/1
    Bool(bool),
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Fixed-width vector, bound as a blob
    Vector(Vector),
    /// Binary data
    Blob(Vec<u8>),
}

impl Value {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident via $conv:expr),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant($conv(value))
                }
            }
        )*
    };
}

value_from! {
    bool => Bool via std::convert::identity,
    i64 => Int via std::convert::identity,
    i32 => Int via i64::from,
    u32 => Int via i64::from,
    f64 => Float via std::convert::identity,
    String => Text via std::convert::identity,
    &str => Text via str::to_owned,
    Vec<u8> => Blob via std::convert::identity,
    &[u8] => Blob via <[u8]>::to_vec,
    Vector => Vector via std::convert::identity,
    Vec<f32> => Vector via Vector::Float32,
    Vec<i8> => Vector via Vector::Int8,
    BitVector => Vector via Vector::Bit,
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Native storage class of a result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Integer,
    Float,
    Text,
    Blob,
    Null,
}

impl From<rusqlite::types::Type> for ColumnType {
    fn from(ty: rusqlite::types::Type) -> Self {
        match ty {
            rusqlite::types::Type::Integer => ColumnType::Integer,
            rusqlite::types::Type::Real => ColumnType::Float,
            rusqlite::types::Type::Text => ColumnType::Text,
            rusqlite::types::Type::Blob => ColumnType::Blob,
            rusqlite::types::Type::Null => ColumnType::Null,
        }
    }
}

/// A decoded, non-null column value. NULL columns are absent from a [`crate::Row`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl ColumnValue {
    #[must_use]
    pub fn column_type(&self) -> ColumnType {
        match self {
            ColumnValue::Integer(_) => ColumnType::Integer,
            ColumnValue::Float(_) => ColumnType::Float,
            ColumnValue::Text(_) => ColumnType::Text,
            ColumnValue::Blob(_) => ColumnType::Blob,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        if let ColumnValue::Integer(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    /// Float value; integers widen so `distance`-style columns read uniformly.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ColumnValue::Float(value) => Some(*value),
            #[allow(clippy::cast_precision_loss)]
            ColumnValue::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self.as_int() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let ColumnValue::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let ColumnValue::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Decode a `float[N]` blob.
    ///
    /// # Errors
    /// Returns [`crate::SqlVecError::InvalidVector`] if the blob is not a whole number of floats.
    pub fn as_f32_vector(&self) -> Option<Result<Vec<f32>>> {
        self.as_blob().map(decode_f32)
    }

    #[must_use]
    pub fn as_i8_vector(&self) -> Option<Vec<i8>> {
        self.as_blob().map(decode_i8)
    }

    /// Decode a `bit[N]` blob, keeping the first `dimensions` bits.
    ///
    /// # Errors
    /// Returns [`crate::SqlVecError::InvalidVector`] if the blob is too short.
    pub fn as_bit_vector(&self, dimensions: usize) -> Option<Result<BitVector>> {
        self.as_blob()
            .map(|blob| BitVector::from_bytes(blob, dimensions))
    }
}
