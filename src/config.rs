use std::fmt;
use std::path::Path;
use std::time::Duration;

use rusqlite::OpenFlags;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SqlVecError};
use crate::results::ColumnTyping;
use crate::worker::Connection;

/// Where a database lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Location {
    /// Private in-memory database (`:memory:`).
    #[default]
    InMemory,
    /// Private on-disk database removed when closed (empty filename).
    Temporary,
    /// Filesystem path or `file:` URI, passed to the engine verbatim.
    Uri(String),
}

impl Location {
    #[must_use]
    pub fn path(path: impl AsRef<Path>) -> Self {
        Location::Uri(path.as_ref().to_string_lossy().into_owned())
    }

    /// Filename handed to the engine.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Location::InMemory => ":memory:",
            Location::Temporary => "",
            Location::Uri(uri) => uri,
        }
    }
}

impl From<&str> for Location {
    fn from(value: &str) -> Self {
        match value {
            ":memory:" => Location::InMemory,
            "" => Location::Temporary,
            other => Location::Uri(other.to_owned()),
        }
    }
}

impl From<String> for Location {
    fn from(value: String) -> Self {
        match value.as_str() {
            ":memory:" | "" => Location::from(value.as_str()),
            _ => Location::Uri(value),
        }
    }
}

impl From<Location> for String {
    fn from(value: Location) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Temporary => f.write_str("<temporary>"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Options for opening a [`Connection`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenOptions {
    pub location: Location,
    pub readonly: bool,
    pub busy_timeout_ms: Option<u64>,
    pub column_typing: ColumnTyping,
}

impl OpenOptions {
    #[must_use]
    pub fn new(location: impl Into<Location>) -> Self {
        Self {
            location: location.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn builder(location: impl Into<Location>) -> OpenOptionsBuilder {
        OpenOptionsBuilder::new(location)
    }

    /// Read/write/create, or read-only; always full-mutex and URI-aware.
    #[must_use]
    pub fn flags(&self) -> OpenFlags {
        let access = if self.readonly {
            OpenFlags::SQLITE_OPEN_READ_ONLY
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE
        };
        access | OpenFlags::SQLITE_OPEN_FULL_MUTEX | OpenFlags::SQLITE_OPEN_URI
    }

    /// Reject combinations the engine would accept but that can never be useful.
    ///
    /// # Errors
    /// Returns [`SqlVecError::ConfigError`] for a read-only private database.
    pub fn validate(&self) -> Result<()> {
        if self.readonly && matches!(self.location, Location::InMemory | Location::Temporary) {
            return Err(SqlVecError::ConfigError(format!(
                "{} database cannot be opened read-only",
                self.location
            )));
        }
        Ok(())
    }

    /// Open the native handle. Called on the connection's worker thread.
    pub(crate) fn open_native(&self) -> Result<rusqlite::Connection> {
        let conn = rusqlite::Connection::open_with_flags(self.location.as_str(), self.flags())?;
        if let Some(ms) = self.busy_timeout_ms {
            conn.busy_timeout(Duration::from_millis(ms))?;
        }
        Ok(conn)
    }

    /// Open a connection with these options.
    ///
    /// # Errors
    /// Returns [`SqlVecError`] if validation or the native open fails.
    pub async fn open(self) -> Result<Connection> {
        Connection::open_with(self).await
    }
}

/// Fluent builder for [`OpenOptions`].
#[derive(Debug, Clone)]
pub struct OpenOptionsBuilder {
    opts: OpenOptions,
}

impl OpenOptionsBuilder {
    #[must_use]
    pub fn new(location: impl Into<Location>) -> Self {
        Self {
            opts: OpenOptions::new(location),
        }
    }

    #[must_use]
    pub fn readonly(mut self, readonly: bool) -> Self {
        self.opts.readonly = readonly;
        self
    }

    #[must_use]
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.opts.busy_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    #[must_use]
    pub fn column_typing(mut self, typing: ColumnTyping) -> Self {
        self.opts.column_typing = typing;
        self
    }

    #[must_use]
    pub fn finish(self) -> OpenOptions {
        self.opts
    }

    /// Build the options and open a connection.
    ///
    /// # Errors
    /// Returns [`SqlVecError`] if validation or the native open fails.
    pub async fn open(self) -> Result<Connection> {
        self.finish().open().await
    }
}
