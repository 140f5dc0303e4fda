//! Typed async access to SQLite with the `sqlite-vec` vector search extension.
//!
//! Call [`initialize`] once at startup, then open a [`Connection`]. Every
//! connection owns its native handle on a dedicated worker thread; statements
//! are prepared, bound, stepped and finalized there, and results come back as
//! owned [`Row`]s.
//!
//! ```no_run
//! use sqlvec::prelude::*;
//!
//! # async fn demo() -> Result<()> {
//! initialize()?;
//! let conn = Connection::open(":memory:").await?;
//! conn.execute_batch("CREATE VIRTUAL TABLE items USING vec0(embedding float[4])")
//!     .await?;
//! conn.execute(
//!     "INSERT INTO items (rowid, embedding) VALUES (?, ?)",
//!     &params![1, Vector::float32(vec![0.1, 0.1, 0.1, 0.1])],
//! )
//! .await?;
//! let rows = conn
//!     .query(
//!         "SELECT rowid, distance FROM items WHERE embedding MATCH ? ORDER BY distance LIMIT 3",
//!         &params![Vector::float32(vec![0.1, 0.1, 0.1, 0.1])],
//!     )
//!     .await?;
//! # let _ = rows;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod extension;
pub mod params;
pub mod prelude;
pub mod query_builder;
pub mod results;
pub mod session;
mod statement;
pub mod transaction;
pub mod types;
pub mod vector;
mod worker;

pub use config::{Location, OpenOptions, OpenOptionsBuilder};
pub use error::{Result, SqlVecError, check_status};
pub use extension::initialize;
pub use query_builder::QueryBuilder;
pub use results::{ColumnTyping, Columns, Row};
pub use session::Session;
pub use transaction::TransactionMode;
pub use types::{ColumnType, ColumnValue, Value};
pub use vector::{BitVector, Vector};
pub use worker::Connection;
