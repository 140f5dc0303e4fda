use std::ffi::c_int;

use rusqlite::ffi;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T, E = SqlVecError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum SqlVecError {
    /// Non-success status returned by the engine, with the diagnostic text read
    /// from the handle at the point of failure (when a handle was available).
    #[error("SQLite error {code}: {}", describe(.code, .message.as_deref()))]
    Sqlite { code: c_int, message: Option<String> },

    /// The caller supplied a different number of parameters than the statement
    /// declares placeholders for. No value was bound.
    #[error("parameter count mismatch: statement expects {expected}, {supplied} supplied")]
    ParameterCount { expected: usize, supplied: usize },

    #[error("Invalid vector payload: {0}")]
    InvalidVector(String),

    /// Wrapper-level failure that carries no native status code.
    #[error(transparent)]
    Driver(rusqlite::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),
}

impl SqlVecError {
    /// Build a status error from a native result code.
    #[must_use]
    pub fn from_status(code: c_int, message: Option<String>) -> Self {
        SqlVecError::Sqlite { code, message }
    }

    /// Native (extended) result code, when the error came from the engine.
    #[must_use]
    pub fn code(&self) -> Option<c_int> {
        match self {
            SqlVecError::Sqlite { code, .. } => Some(*code),
            SqlVecError::Driver(rusqlite::Error::SqliteFailure(err, _)) => Some(err.extended_code),
            _ => None,
        }
    }

    /// Primary result code (low byte of the extended code).
    #[must_use]
    pub fn primary_code(&self) -> Option<c_int> {
        self.code().map(|code| code & 0xff)
    }

    /// Diagnostic message captured from the engine, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            SqlVecError::Sqlite { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// True for caller defects (as opposed to runtime or environmental failures).
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, SqlVecError::ParameterCount { .. })
    }
}

impl From<rusqlite::Error> for SqlVecError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(native, message) => {
                SqlVecError::from_status(native.extended_code, message)
            }
            other => SqlVecError::Driver(other),
        }
    }
}

/// Translate a raw native status into `Ok(())` or a typed error.
///
/// `SQLITE_OK`, `SQLITE_ROW` and `SQLITE_DONE` are success. On failure the
/// `message` closure is invoked immediately, before anything else can touch the
/// handle and overwrite its diagnostic state.
///
/// # Errors
/// Returns [`SqlVecError::Sqlite`] for any code outside the success set.
pub fn check_status<F>(code: c_int, message: F) -> Result<()>
where
    F: FnOnce() -> Option<String>,
{
    match code {
        ffi::SQLITE_OK | ffi::SQLITE_ROW | ffi::SQLITE_DONE => Ok(()),
        _ => Err(SqlVecError::from_status(code, message())),
    }
}

fn describe(code: &c_int, message: Option<&str>) -> String {
    match message {
        Some(message) => message.to_owned(),
        None => ffi::Error::new(*code).to_string(),
    }
}
