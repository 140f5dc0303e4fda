use std::sync::Arc;

use rusqlite::types::ValueRef;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{ColumnType, ColumnValue};

use super::row::{Columns, Row};

/// How result column types are resolved while materializing rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnTyping {
    /// Read each column's native type once, from the first row, and decode every
    /// later row of the same execution as that type.
    ///
    /// A column whose storage class changes between rows is coerced the way
    /// the engine's typed column accessors coerce; a column first observed as
    /// NULL stays absent for the whole result.
    #[default]
    FirstRow,
    /// Read the native type tag on every row.
    EveryRow,
}

/// Column metadata captured from the first stepped row.
#[derive(Debug)]
pub(crate) struct ColumnPlan {
    columns: Arc<Columns>,
    types: Vec<ColumnType>,
}

impl ColumnPlan {
    pub(crate) fn capture(row: &rusqlite::Row<'_>) -> Result<Self> {
        let stmt: &rusqlite::Statement<'_> = row.as_ref();
        let count = stmt.column_count();
        let mut names = Vec::with_capacity(count);
        let mut types = Vec::with_capacity(count);
        for idx in 0..count {
            names.push(stmt.column_name(idx)?.to_owned());
            types.push(ColumnType::from(row.get_ref(idx)?.data_type()));
        }
        Ok(Self {
            columns: Arc::new(Columns::new(names)),
            types,
        })
    }

    pub(crate) fn materialize(&self, row: &rusqlite::Row<'_>, typing: ColumnTyping) -> Result<Row> {
        let mut values = Vec::with_capacity(self.types.len());
        for (idx, pinned) in self.types.iter().enumerate() {
            let raw = row.get_ref(idx)?;
            let value = match typing {
                ColumnTyping::FirstRow => decode_as(*pinned, raw),
                ColumnTyping::EveryRow => decode_as(raw.data_type().into(), raw),
            };
            values.push(value);
        }
        Ok(Row::new(Arc::clone(&self.columns), values))
    }
}

/// Decode `raw` as `ty`. NULL (either pinned or observed) is always absent.
pub(crate) fn decode_as(ty: ColumnType, raw: ValueRef<'_>) -> Option<ColumnValue> {
    if matches!(raw, ValueRef::Null) {
        return None;
    }
    match ty {
        ColumnType::Null => None,
        ColumnType::Integer => Some(ColumnValue::Integer(coerce_int(raw))),
        ColumnType::Float => Some(ColumnValue::Float(coerce_float(raw))),
        ColumnType::Text => Some(ColumnValue::Text(coerce_text(raw))),
        ColumnType::Blob => Some(ColumnValue::Blob(coerce_blob(raw))),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn coerce_int(raw: ValueRef<'_>) -> i64 {
    match raw {
        ValueRef::Integer(i) => i,
        ValueRef::Real(f) => f as i64,
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => leading_int(bytes),
        ValueRef::Null => 0,
    }
}

#[allow(clippy::cast_precision_loss)]
fn coerce_float(raw: ValueRef<'_>) -> f64 {
    match raw {
        ValueRef::Integer(i) => i as f64,
        ValueRef::Real(f) => f,
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            let text = String::from_utf8_lossy(bytes);
            text.trim()
                .parse::<f64>()
                .unwrap_or_else(|_| leading_int(bytes) as f64)
        }
        ValueRef::Null => 0.0,
    }
}

fn coerce_text(raw: ValueRef<'_>) -> String {
    match raw {
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => format_real(f),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        ValueRef::Null => String::new(),
    }
}

fn coerce_blob(raw: ValueRef<'_>) -> Vec<u8> {
    match raw {
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => bytes.to_vec(),
        ValueRef::Integer(_) | ValueRef::Real(_) => coerce_text(raw).into_bytes(),
        ValueRef::Null => Vec::new(),
    }
}

// Integer prefix of a text value, 0 when there is none.
fn leading_int(bytes: &[u8]) -> i64 {
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim_start();
    let sign_len = usize::from(text.starts_with(['-', '+']));
    let digits = text[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    text[..sign_len + digits].parse().unwrap_or(0)
}

// Engine text form of a real: 15 significant digits, trailing zeros dropped but
// at least one digit after the point, exponent form outside 1e-4..1e15.
fn format_real(value: f64) -> String {
    if value.is_infinite() {
        return if value > 0.0 { "Inf" } else { "-Inf" }.to_owned();
    }
    if value.is_nan() {
        return "NaN".to_owned();
    }
    if value == 0.0 {
        return "0.0".to_owned();
    }

    let scientific = format!("{value:.14e}");
    let (mantissa, exp) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let digits = digits.trim_end_matches('0');
    let sign = if value < 0.0 { "-" } else { "" };

    if !(-4..15).contains(&exp) {
        let (lead, rest) = digits.split_at(1);
        let rest = if rest.is_empty() { "0" } else { rest };
        let exp_sign = if exp < 0 { '-' } else { '+' };
        return format!("{sign}{lead}.{rest}e{exp_sign}{:02}", exp.unsigned_abs());
    }

    if exp < 0 {
        let zeros = "0".repeat(exp.unsigned_abs() as usize - 1);
        return format!("{sign}0.{zeros}{digits}");
    }
    let int_len = exp as usize + 1;
    if digits.len() > int_len {
        let (int, frac) = digits.split_at(int_len);
        format!("{sign}{int}.{frac}")
    } else {
        format!("{sign}{digits:0<int_len$}.0")
    }
}
