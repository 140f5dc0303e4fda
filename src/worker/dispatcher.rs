use std::sync::mpsc::Receiver;

use tracing::{debug, warn};

use crate::results::ColumnTyping;
use crate::session::Session;

use super::channel::Command;

/// Serve commands until shutdown, a successful close, or every sender is gone.
pub(super) fn run_worker(
    mut conn: rusqlite::Connection,
    typing: ColumnTyping,
    receiver: &Receiver<Command>,
) {
    while let Ok(command) = receiver.recv() {
        match command {
            Command::Shutdown => break,
            Command::Close { respond_to } => match conn.close() {
                Ok(()) => {
                    debug!("SQLite handle closed");
                    let _ = respond_to.send(Ok(()));
                    return;
                }
                Err((still_open, err)) => {
                    warn!(error = %err, "SQLite handle refused to close");
                    conn = still_open;
                    let _ = respond_to.send(Err(err.into()));
                }
            },
            command => dispatch(&Session::new(&conn, typing), command),
        }
    }
}

// A failed send means the caller stopped waiting; the work has already run.
fn dispatch(session: &Session<'_>, command: Command) {
    match command {
        Command::Execute {
            sql,
            params,
            respond_to,
        } => {
            let _ = respond_to.send(session.execute(&sql, &params));
        }
        Command::ExecuteBatch { sql, respond_to } => {
            let _ = respond_to.send(session.execute_batch(&sql));
        }
        Command::Query {
            sql,
            params,
            respond_to,
        } => {
            let _ = respond_to.send(session.query(&sql, &params));
        }
        Command::LastInsertedId { respond_to } => {
            let _ = respond_to.send(Ok(session.last_inserted_id()));
        }
        Command::ModifiedRowCount { respond_to } => {
            let _ = respond_to.send(Ok(session.modified_row_count()));
        }
        Command::Version { respond_to } => {
            let _ = respond_to.send(Ok(session.version()));
        }
        Command::BuildInfo { respond_to } => {
            let _ = respond_to.send(Ok(session.build_info()));
        }
        Command::WithSession {
            callback,
            respond_to,
        } => {
            let _ = respond_to.send(callback(session));
        }
        Command::Close { .. } | Command::Shutdown => {}
    }
}
