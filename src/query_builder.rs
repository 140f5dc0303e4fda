use crate::error::Result;
use crate::results::Row;
use crate::types::Value;
use crate::worker::Connection;

/// Fluent builder for a single statement on a [`Connection`].
///
/// ```no_run
/// # use sqlvec::prelude::*;
/// # async fn demo(conn: &Connection) -> Result<()> {
/// let nearest = conn
///     .sql("SELECT rowid, distance FROM items WHERE embedding MATCH ? AND k = ?")
///     .bind(Vector::float32(vec![0.3, 0.3, 0.3, 0.3]))
///     .bind(3)
///     .fetch_all()
///     .await?;
/// # let _ = nearest;
/// # Ok(())
/// # }
/// ```
pub struct QueryBuilder<'conn> {
    conn: &'conn Connection,
    sql: String,
    params: Vec<Value>,
}

impl<'conn> QueryBuilder<'conn> {
    pub(crate) fn new(conn: &'conn Connection, sql: &str) -> Self {
        Self {
            conn,
            sql: sql.to_owned(),
            params: Vec::new(),
        }
    }

    /// Append one positional parameter.
    #[must_use]
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self
    }

    /// Append several positional parameters.
    #[must_use]
    pub fn params(mut self, params: impl IntoIterator<Item = Value>) -> Self {
        self.params.extend(params);
        self
    }

    /// Run the statement and return the modified-row count.
    ///
    /// # Errors
    /// See [`Connection::execute`].
    pub async fn execute(self) -> Result<usize> {
        self.conn.worker_execute(self.sql, self.params).await
    }

    /// Run the statement and materialize every row.
    ///
    /// # Errors
    /// See [`Connection::query`].
    pub async fn fetch_all(self) -> Result<Vec<Row>> {
        self.conn.worker_query(self.sql, self.params).await
    }

    /// Run the statement and keep only the first row.
    ///
    /// # Errors
    /// See [`Connection::query`].
    pub async fn fetch_optional(self) -> Result<Option<Row>> {
        Ok(self.fetch_all().await?.into_iter().next())
    }
}
