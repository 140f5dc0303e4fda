use rusqlite::ToSql;
use rusqlite::types::{ToSqlOutput, ValueRef};

use crate::types::Value;

/// Bind-side half of the value codec.
///
/// Text and blobs are handed to the engine as borrowed slices; `rusqlite` binds
/// them with `SQLITE_TRANSIENT`, so the engine copies before the call returns
/// and nothing here has to outlive the bind.
impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Bool(b) => ToSqlOutput::Borrowed(ValueRef::Integer(i64::from(*b))),
            Value::Int(i) => ToSqlOutput::Borrowed(ValueRef::Integer(*i)),
            Value::Float(f) => ToSqlOutput::Borrowed(ValueRef::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Blob(bytes) => ToSqlOutput::Borrowed(ValueRef::Blob(bytes)),
            Value::Vector(vector) => {
                ToSqlOutput::Owned(rusqlite::types::Value::Blob(vector.to_blob()))
            }
        })
    }
}

/// Build a `Vec<Value>` from heterogeneous expressions.
///
/// ```rust
/// use sqlvec::{params, Value, Vector};
///
/// let p = params![1, "two", 3.0, Vector::float32([0.1, 0.2])];
/// assert_eq!(p[1], Value::Text("two".into()));
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($value)),+]
    };
}
