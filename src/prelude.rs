//! Convenient imports for common functionality.

pub use crate::config::{Location, OpenOptions};
pub use crate::error::{Result, SqlVecError};
pub use crate::extension::initialize;
pub use crate::params;
pub use crate::results::{ColumnTyping, Row};
pub use crate::session::Session;
pub use crate::transaction::TransactionMode;
pub use crate::types::{ColumnType, ColumnValue, Value};
pub use crate::vector::{BitVector, Vector};
pub use crate::worker::Connection;
