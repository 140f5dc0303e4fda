use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::session::Session;

/// When the enclosing transaction acquires its database lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum TransactionMode {
    /// Lock on first read/write inside the transaction.
    #[default]
    Deferred,
    /// Take the write lock at `BEGIN`.
    Immediate,
    /// Take an exclusive lock at `BEGIN`.
    Exclusive,
}

impl TransactionMode {
    #[must_use]
    pub fn begin_sql(self) -> &'static str {
        match self {
            TransactionMode::Deferred => "BEGIN DEFERRED TRANSACTION",
            TransactionMode::Immediate => "BEGIN IMMEDIATE TRANSACTION",
            TransactionMode::Exclusive => "BEGIN EXCLUSIVE TRANSACTION",
        }
    }
}

/// Bracket `body` with `BEGIN <mode>` and `COMMIT`, rolling back on any error.
///
/// A failing body (or a failing `COMMIT`) triggers `ROLLBACK`; the rollback's own
/// outcome is discarded so the caller always sees the original error. Beginning
/// while a transaction is already open fails with the engine's own error.
pub(crate) fn run<T, F>(session: &Session<'_>, mode: TransactionMode, body: F) -> Result<T>
where
    F: FnOnce(&Session<'_>) -> Result<T>,
{
    session.execute(mode.begin_sql(), &[])?;

    let outcome = body(session).and_then(|value| {
        session.execute("COMMIT", &[])?;
        Ok(value)
    });

    if outcome.is_err() && !session.is_autocommit() {
        if let Err(rollback_err) = session.execute("ROLLBACK", &[]) {
            debug!(error = %rollback_err, "rollback failed; surfacing original error");
        }
    }
    outcome
}
