//! Prepared-statement lifecycle.
//!
//! A [`PreparedStatement`] only exists once compilation, the placeholder count
//! check and every bind have succeeded. The native handle is finalized when
//! the value drops, so every early return above releases it, and the
//! consuming `execute`/`query` methods release it exactly once after stepping.

use tracing::{error, trace};

use crate::error::{Result, SqlVecError};
use crate::results::{ColumnTyping, Row, collect_rows, drain_rows};
use crate::types::Value;

pub(crate) struct PreparedStatement<'conn> {
    stmt: rusqlite::Statement<'conn>,
}

impl<'conn> PreparedStatement<'conn> {
    /// Compile `sql` and bind `params` in 1-based positional order.
    ///
    /// # Errors
    /// - [`SqlVecError::Sqlite`] if compilation or a bind fails, with the engine diagnostic.
    /// - [`SqlVecError::ParameterCount`] if `params.len()` differs from the placeholder
    ///   count; nothing is bound in that case.
    pub(crate) fn prepare(
        conn: &'conn rusqlite::Connection,
        sql: &str,
        params: &[Value],
    ) -> Result<Self> {
        trace!(sql, params = params.len(), "preparing statement");
        let mut stmt = conn.prepare(sql)?;

        let expected = stmt.parameter_count();
        if expected != params.len() {
            error!(
                sql,
                expected,
                supplied = params.len(),
                "parameter count does not match statement placeholders"
            );
            return Err(SqlVecError::ParameterCount {
                expected,
                supplied: params.len(),
            });
        }

        for (idx, value) in params.iter().enumerate() {
            stmt.raw_bind_parameter(idx + 1, value)?;
        }
        Ok(Self { stmt })
    }

    /// Step to completion, ignoring any rows.
    pub(crate) fn execute(mut self) -> Result<()> {
        let mut rows = self.stmt.raw_query();
        drain_rows(&mut rows)
    }

    /// Step to completion, materializing every row.
    pub(crate) fn query(mut self, typing: ColumnTyping) -> Result<Vec<Row>> {
        let mut rows = self.stmt.raw_query();
        collect_rows(&mut rows, typing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnValue;
    use rusqlite::ffi;

    fn conn() -> rusqlite::Connection {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT NOT NULL);")
            .unwrap();
        conn
    }

    #[test]
    fn compile_failure_carries_diagnostic() {
        let conn = conn();
        let err = PreparedStatement::prepare(&conn, "SELEC 1", &[])
            .err()
            .unwrap();
        assert_eq!(err.primary_code(), Some(ffi::SQLITE_ERROR));
        assert!(err.message().unwrap_or_default().contains("syntax error"));
    }

    #[test]
    fn unknown_table_is_compile_failure() {
        let conn = conn();
        let err = PreparedStatement::prepare(&conn, "SELECT * FROM missing", &[])
            .err()
            .unwrap();
        assert!(err.message().unwrap_or_default().contains("no such table"));
    }

    #[test]
    fn count_mismatch_fails_before_binding() {
        let conn = conn();
        let err = PreparedStatement::prepare(&conn, "SELECT ?", &[])
            .err()
            .unwrap();
        assert!(matches!(
            err,
            SqlVecError::ParameterCount {
                expected: 1,
                supplied: 0
            }
        ));

        let err = PreparedStatement::prepare(&conn, "SELECT 1", &[Value::Int(1)])
            .err()
            .unwrap();
        assert!(err.is_contract_violation());
    }

    #[test]
    fn bind_failure_is_translated() {
        let conn = conn();
        let _ = conn.set_limit(rusqlite::limits::Limit::SQLITE_LIMIT_LENGTH, 8);
        let err = PreparedStatement::prepare(&conn, "SELECT ?", &[Value::Text("x".repeat(64))])
            .err()
            .unwrap();
        assert_eq!(err.primary_code(), Some(ffi::SQLITE_TOOBIG));
    }

    #[test]
    fn step_failure_is_translated() {
        let conn = conn();
        let insert = "INSERT INTO t (id, name) VALUES (?, ?)";
        PreparedStatement::prepare(&conn, insert, &[Value::Int(1), Value::from("a")])
            .unwrap()
            .execute()
            .unwrap();
        let err = PreparedStatement::prepare(&conn, insert, &[Value::Int(1), Value::from("b")])
            .unwrap()
            .execute()
            .unwrap_err();
        assert_eq!(err.primary_code(), Some(ffi::SQLITE_CONSTRAINT));
    }

    #[test]
    fn every_exit_path_finalizes() {
        let conn = conn();
        let _ = PreparedStatement::prepare(&conn, "SELEC 1", &[]);
        let _ = PreparedStatement::prepare(&conn, "SELECT ?", &[]);
        let _ = PreparedStatement::prepare(&conn, "SELECT 1", &[])
            .unwrap()
            .query(ColumnTyping::FirstRow);
        let insert = "INSERT INTO t (id, name) VALUES (?, ?)";
        PreparedStatement::prepare(&conn, insert, &[Value::Int(1), Value::from("a")])
            .unwrap()
            .execute()
            .unwrap();
        let step = PreparedStatement::prepare(&conn, insert, &[Value::Int(1), Value::from("b")])
            .unwrap()
            .execute()
            .unwrap_err();
        assert_eq!(step.primary_code(), Some(ffi::SQLITE_CONSTRAINT));

        let _ = conn.set_limit(rusqlite::limits::Limit::SQLITE_LIMIT_LENGTH, 8);
        let bind = PreparedStatement::prepare(&conn, "SELECT ?", &[Value::Text("x".repeat(64))])
            .err()
            .unwrap();
        assert_eq!(bind.primary_code(), Some(ffi::SQLITE_TOOBIG));

        // sqlite3_close refuses while any statement is still alive.
        conn.close().map_err(|(_, err)| err).unwrap();
    }

    #[test]
    fn query_materializes_rows() {
        let conn = conn();
        conn.execute_batch("INSERT INTO t VALUES (1, 'a'), (2, 'b');")
            .unwrap();
        let rows = PreparedStatement::prepare(&conn, "SELECT id, name FROM t WHERE id >= ?", &[
            Value::Int(2),
        ])
        .unwrap()
        .query(ColumnTyping::FirstRow)
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name"), Some(&ColumnValue::Text("b".into())));
    }
}
