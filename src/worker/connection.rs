use std::fmt;
use std::sync::Arc;

use crate::config::{Location, OpenOptions};
use crate::error::Result;
use crate::query_builder::QueryBuilder;
use crate::results::Row;
use crate::session::Session;
use crate::transaction::TransactionMode;
use crate::types::Value;

use super::manager::Worker;

/// Handle to one database, served by a dedicated worker thread.
///
/// Clones share the same worker, so operations submitted through any clone are
/// run one at a time in submission order. Different connections are fully
/// independent.
#[derive(Clone)]
pub struct Connection {
    worker: Arc<Worker>,
}

impl Connection {
    /// Open (creating if needed) a read/write database.
    ///
    /// # Errors
    /// Returns [`crate::SqlVecError`] if the engine cannot open `location` or the
    /// worker thread cannot be spawned.
    pub async fn open(location: impl Into<Location>) -> Result<Self> {
        Self::open_with(OpenOptions::new(location)).await
    }

    /// Open an existing database read-only.
    ///
    /// # Errors
    /// Returns [`crate::SqlVecError`] if the database does not exist or cannot be opened.
    pub async fn open_readonly(location: impl Into<Location>) -> Result<Self> {
        Self::open_with(OpenOptions::builder(location).readonly(true).finish()).await
    }

    /// Open with explicit [`OpenOptions`].
    ///
    /// # Errors
    /// Returns [`crate::SqlVecError::ConfigError`] for invalid options, otherwise any
    /// open failure reported by the engine.
    pub async fn open_with(options: OpenOptions) -> Result<Self> {
        options.validate()?;
        let worker = Worker::spawn(options).await?;
        Ok(Self {
            worker: Arc::new(worker),
        })
    }

    /// Prepare, bind and step `sql`; returns the modified-row count.
    ///
    /// `sql` must be one statement. Multi-statement scripts go through
    /// [`Connection::execute_batch`].
    ///
    /// # Errors
    /// Returns the translated engine error, [`crate::SqlVecError::ParameterCount`],
    /// or [`crate::SqlVecError::ConnectionError`] once the connection is closed.
    pub async fn execute(&self, sql: &str, params: &[Value]) -> Result<usize> {
        self.worker_execute(sql.to_owned(), params.to_vec()).await
    }

    /// Run a `;`-separated script without parameters.
    ///
    /// # Errors
    /// Returns the error of the first failing statement.
    pub async fn execute_batch(&self, sql: &str) -> Result<()> {
        self.worker.execute_batch(sql.to_owned()).await
    }

    /// Prepare, bind and materialize every row of `sql`. One statement only.
    ///
    /// # Errors
    /// Same as [`Connection::execute`].
    pub async fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        self.worker_query(sql.to_owned(), params.to_vec()).await
    }

    /// First row of `sql`, if any.
    ///
    /// # Errors
    /// Same as [`Connection::query`].
    pub async fn query_row(&self, sql: &str, params: &[Value]) -> Result<Option<Row>> {
        Ok(self.query(sql, params).await?.into_iter().next())
    }

    pub(crate) async fn worker_execute(&self, sql: String, params: Vec<Value>) -> Result<usize> {
        self.worker.execute(sql, params).await
    }

    pub(crate) async fn worker_query(&self, sql: String, params: Vec<Value>) -> Result<Vec<Row>> {
        self.worker.query(sql, params).await
    }

    /// Start a fluent query.
    #[must_use]
    pub fn sql<'conn>(&'conn self, sql: &str) -> QueryBuilder<'conn> {
        QueryBuilder::new(self, sql)
    }

    /// Rowid of the most recent successful insert.
    ///
    /// # Errors
    /// Only fails once the connection is closed.
    pub async fn last_inserted_id(&self) -> Result<i64> {
        self.worker.last_inserted_id().await
    }

    /// Rows changed by the most recent INSERT/UPDATE/DELETE.
    ///
    /// # Errors
    /// Only fails once the connection is closed.
    pub async fn modified_row_count(&self) -> Result<usize> {
        self.worker.modified_row_count().await
    }

    /// `vec_version()`, or `None` if the extension cannot be queried.
    ///
    /// # Errors
    /// Only fails once the connection is closed.
    pub async fn version(&self) -> Result<Option<String>> {
        self.worker.version().await
    }

    /// `vec_debug()`, or `None` if the extension cannot be queried.
    ///
    /// # Errors
    /// Only fails once the connection is closed.
    pub async fn build_info(&self) -> Result<Option<String>> {
        self.worker.build_info().await
    }

    /// Run `body` inside `BEGIN <mode>` ... `COMMIT` as one task on the worker.
    ///
    /// Any error from `body` rolls the transaction back and is returned as-is.
    /// Nothing else on this connection runs until the bracket has finished.
    ///
    /// ```no_run
    /// # use sqlvec::prelude::*;
    /// # async fn demo(conn: &Connection) -> Result<()> {
    /// conn.transaction(TransactionMode::Immediate, |tx| {
    ///     tx.execute("INSERT INTO items (name) VALUES (?)", &params!["a"])?;
    ///     tx.execute("INSERT INTO items (name) VALUES (?)", &params!["b"])
    /// })
    /// .await?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    /// Returns the body's error, or a `BEGIN`/`COMMIT` failure.
    pub async fn transaction<F, T>(&self, mode: TransactionMode, body: F) -> Result<T>
    where
        F: FnOnce(&Session<'_>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.worker
            .with_session(move |session| session.transaction(mode, body))
            .await
    }

    /// Run synchronous logic against the worker's [`Session`] without a transaction.
    ///
    /// # Errors
    /// Returns whatever `body` returns, or a connection error.
    pub async fn with_session<F, T>(&self, body: F) -> Result<T>
    where
        F: FnOnce(&Session<'_>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.worker.with_session(body).await
    }

    /// Close the native handle after every previously queued operation.
    ///
    /// Later operations through any clone fail with
    /// [`crate::SqlVecError::ConnectionError`].
    ///
    /// # Errors
    /// Returns the engine error if the handle refuses to close; it stays open then.
    pub async fn close(self) -> Result<()> {
        self.worker.close().await
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("worker", &self.worker.id())
            .finish()
    }
}
