//! Row iteration and materialization.
//!
//! [`collect_rows`] steps a bound statement to completion. Column names and
//! native type tags are captured once, after the first successful step, and
//! reused for every later row of the same execution.

mod plan;
mod row;

pub use plan::ColumnTyping;
pub use row::{Columns, Row};

pub(crate) use plan::ColumnPlan;

use crate::error::Result;

/// Step `rows` until the engine reports done, materializing each row.
///
/// # Errors
/// Returns the translated engine error of the first failing step.
pub(crate) fn collect_rows(rows: &mut rusqlite::Rows<'_>, typing: ColumnTyping) -> Result<Vec<Row>> {
    let mut plan: Option<ColumnPlan> = None;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        if plan.is_none() {
            plan = Some(ColumnPlan::capture(row)?);
        }
        if let Some(plan) = &plan {
            out.push(plan.materialize(row, typing)?);
        }
    }
    Ok(out)
}

/// Step `rows` until done, discarding any produced rows.
///
/// # Errors
/// Returns the translated engine error of the first failing step.
pub(crate) fn drain_rows(rows: &mut rusqlite::Rows<'_>) -> Result<()> {
    while rows.next()?.is_some() {}
    Ok(())
}
