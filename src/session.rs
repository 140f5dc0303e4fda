use tracing::debug;

use crate::error::Result;
use crate::results::{ColumnTyping, Row};
use crate::statement::PreparedStatement;
use crate::transaction::{self, TransactionMode};
use crate::types::Value;

/// Synchronous access to one native handle.
///
/// A `Session` is handed to closures passed to [`crate::Connection::transaction`]
/// and [`crate::Connection::with_session`]; it only lives for the duration of that
/// call, on the connection's worker thread.
pub struct Session<'conn> {
    conn: &'conn rusqlite::Connection,
    typing: ColumnTyping,
}

impl<'conn> Session<'conn> {
    pub(crate) fn new(conn: &'conn rusqlite::Connection, typing: ColumnTyping) -> Self {
        Self { conn, typing }
    }

    /// Prepare, bind and step `sql` to completion; returns the connection's
    /// modified-row count afterwards.
    ///
    /// Only a single statement is compiled. Text after the first `;` is still
    /// compiled to reject it, so a script whose later statements depend on earlier
    /// ones fails on those dependencies. Scripts belong in [`Session::execute_batch`].
    ///
    /// # Errors
    /// Returns the translated engine error, or [`crate::SqlVecError::ParameterCount`].
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<usize> {
        PreparedStatement::prepare(self.conn, sql, params)?.execute()?;
        Ok(self.modified_row_count())
    }

    /// Run a script of `;`-separated statements without parameters.
    ///
    /// # Errors
    /// Returns the translated error of the first failing statement.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        Ok(self.conn.execute_batch(sql)?)
    }

    /// Prepare, bind and materialize every row of `sql`. Single statement only, as
    /// for [`Session::execute`].
    ///
    /// # Errors
    /// Returns the translated engine error, or [`crate::SqlVecError::ParameterCount`].
    pub fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        PreparedStatement::prepare(self.conn, sql, params)?.query(self.typing)
    }

    /// First row of `sql`, if any.
    ///
    /// # Errors
    /// Same as [`Session::query`].
    pub fn query_row(&self, sql: &str, params: &[Value]) -> Result<Option<Row>> {
        Ok(self.query(sql, params)?.into_iter().next())
    }

    /// Run `body` between `BEGIN <mode>` and `COMMIT`, rolling back if it fails.
    ///
    /// # Errors
    /// Returns the body's error unchanged (after rolling back), or the error from
    /// `BEGIN`/`COMMIT`. Nesting surfaces the engine's "within a transaction" error.
    pub fn transaction<T, F>(&self, mode: TransactionMode, body: F) -> Result<T>
    where
        F: FnOnce(&Session<'_>) -> Result<T>,
    {
        transaction::run(self, mode, body)
    }

    /// Rowid of the most recent successful insert on this connection.
    #[must_use]
    pub fn last_inserted_id(&self) -> i64 {
        self.conn.last_insert_rowid()
    }

    /// Rows changed by the most recent INSERT/UPDATE/DELETE on this connection.
    #[must_use]
    pub fn modified_row_count(&self) -> usize {
        usize::try_from(self.conn.changes()).unwrap_or(usize::MAX)
    }

    /// False while a transaction is open.
    #[must_use]
    pub fn is_autocommit(&self) -> bool {
        self.conn.is_autocommit()
    }

    /// `vec_version()` of the loaded vector extension; `None` if it cannot be queried.
    #[must_use]
    pub fn version(&self) -> Option<String> {
        self.scalar_text("SELECT vec_version()")
    }

    /// `vec_debug()` build details of the vector extension; `None` if it cannot be queried.
    #[must_use]
    pub fn build_info(&self) -> Option<String> {
        self.scalar_text("SELECT vec_debug()")
    }

    fn scalar_text(&self, sql: &str) -> Option<String> {
        match self.query_row(sql, &[]) {
            Ok(row) => row.and_then(|row| {
                row.get_by_index(0)
                    .and_then(|value| value.as_text())
                    .map(str::to_owned)
            }),
            Err(err) => {
                debug!(sql, error = %err, "extension introspection failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnValue;

    #[test]
    fn execute_reports_modified_rows_and_rowid() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let session = Session::new(&conn, ColumnTyping::FirstRow);
        session
            .execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, v INTEGER);")
            .unwrap();
        session
            .execute("INSERT INTO t (v) VALUES (?), (?), (?)", &[
                Value::Int(1),
                Value::Int(2),
                Value::Int(3),
            ])
            .unwrap();
        assert_eq!(session.last_inserted_id(), 3);
        let changed = session
            .execute("UPDATE t SET v = v + 1 WHERE v >= ?", &[Value::Int(2)])
            .unwrap();
        assert_eq!(changed, 2);
        assert_eq!(session.modified_row_count(), 2);
    }

    #[test]
    fn scripts_run_through_execute_batch_only() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let session = Session::new(&conn, ColumnTyping::FirstRow);
        let script = "CREATE TABLE t (v INTEGER); INSERT INTO t VALUES (1);";

        assert!(session.execute(script, &[]).is_err());
        assert!(session.query("SELECT 1; SELECT 2", &[]).is_err());

        session.execute_batch(script).unwrap();
        let row = session.query_row("SELECT COUNT(*) AS n FROM t", &[]).unwrap();
        assert_eq!(row.and_then(|r| r.get("n").and_then(ColumnValue::as_int)), Some(1));
    }

    #[test]
    fn text_pinned_real_matches_engine_cast() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let session = Session::new(&conn, ColumnTyping::FirstRow);
        let rows = session
            .query("SELECT 'x' AS v, 'x' AS engine UNION ALL SELECT 1.0 / 3, CAST(1.0 / 3 AS TEXT)", &[])
            .unwrap();
        assert_eq!(rows[1].get("v"), Some(&ColumnValue::Text("0.333333333333333".into())));
        assert_eq!(rows[1].get("v"), rows[1].get("engine"));
    }

    #[test]
    fn duplicate_column_names_resolve_to_last() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let session = Session::new(&conn, ColumnTyping::FirstRow);

        let row = session.query_row("SELECT 1 AS a, 2 AS a", &[]).unwrap().unwrap();
        assert_eq!(row.get("a"), Some(&ColumnValue::Integer(2)));
        assert_eq!(row.len(), 1);
        assert_eq!(serde_json::to_value(&row).unwrap(), serde_json::json!({ "a": 2 }));

        let row = session.query_row("SELECT 1 AS a, NULL AS a", &[]).unwrap().unwrap();
        assert_eq!(row.get("a"), None);
        assert_eq!(row.len(), 0);
        assert_eq!(serde_json::to_value(&row).unwrap(), serde_json::json!({}));
    }

    #[test]
    fn wide_integers_survive_binding() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let session = Session::new(&conn, ColumnTyping::FirstRow);
        let big = i64::from(i32::MAX) * 4 + 3;
        let row = session
            .query_row("SELECT ? AS n", &[Value::Int(big)])
            .unwrap()
            .unwrap();
        assert_eq!(row.get("n"), Some(&ColumnValue::Integer(big)));
    }

    #[test]
    fn first_row_typing_pins_column_types() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let session = Session::new(&conn, ColumnTyping::FirstRow);
        let sql = "SELECT 1 AS v UNION ALL SELECT 2.5 UNION ALL SELECT NULL";
        let rows = session.query(sql, &[]).unwrap();
        assert_eq!(rows[0].get("v"), Some(&ColumnValue::Integer(1)));
        assert_eq!(rows[1].get("v"), Some(&ColumnValue::Integer(2)));
        assert_eq!(rows[2].get("v"), None);

        let session = Session::new(&conn, ColumnTyping::EveryRow);
        let rows = session.query(sql, &[]).unwrap();
        assert_eq!(rows[1].get("v"), Some(&ColumnValue::Float(2.5)));
    }

    #[test]
    fn failed_introspection_is_absent() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let session = Session::new(&conn, ColumnTyping::FirstRow);
        assert_eq!(session.scalar_text("SELECT no_such_function()"), None);
        assert_eq!(session.scalar_text("SELECT 'v1'"), Some("v1".to_owned()));
    }
}
