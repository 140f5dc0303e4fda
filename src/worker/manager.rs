use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::thread;

use tokio::sync::oneshot;
use tracing::debug;

use crate::config::OpenOptions;
use crate::error::{Result, SqlVecError};
use crate::results::Row;
use crate::session::Session;
use crate::types::Value;

use super::channel::{BoxedCallback, Command};
use super::dispatcher::run_worker;

static NEXT_WORKER_ID: AtomicU64 = AtomicU64::new(1);

pub(super) struct Worker {
    sender: Sender<Command>,
    id: u64,
}

impl Worker {
    /// Start the worker thread and open the native handle on it.
    ///
    /// Resolves once the open has succeeded or failed; on failure the thread
    /// has already exited and no worker exists.
    pub(super) async fn spawn(options: OpenOptions) -> Result<Self> {
        let id = NEXT_WORKER_ID.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::channel::<Command>();
        let (ready_tx, ready_rx) = oneshot::channel::<Result<()>>();

        thread::Builder::new()
            .name(format!("sqlvec-worker-{id}"))
            .spawn(move || {
                let conn = match options.open_native() {
                    Ok(conn) => conn,
                    Err(err) => {
                        debug!(worker = id, location = %options.location, error = %err, "SQLite open failed");
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };
                debug!(worker = id, location = %options.location, readonly = options.readonly, "SQLite worker started");
                let _ = ready_tx.send(Ok(()));
                run_worker(conn, options.column_typing, &receiver);
                debug!(worker = id, "SQLite worker stopped");
            })
            .map_err(|err| {
                SqlVecError::ConnectionError(format!("failed to spawn SQLite worker thread: {err}"))
            })?;

        ready_rx
            .await
            .map_err(|_| connection_error("SQLite worker exited while opening"))??;
        Ok(Self { sender, id })
    }

    pub(super) fn id(&self) -> u64 {
        self.id
    }

    fn send_command(&self, command: Command) -> Result<()> {
        self.sender
            .send(command)
            .map_err(|_| connection_error("SQLite worker closed"))
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T>>) -> Command,
        drop_message: &'static str,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.send_command(build(tx))?;
        rx.await.map_err(|_| connection_error(drop_message))?
    }

    pub(super) async fn execute(&self, sql: String, params: Vec<Value>) -> Result<usize> {
        self.request(
            |respond_to| Command::Execute {
                sql,
                params,
                respond_to,
            },
            "SQLite worker dropped while executing statement",
        )
        .await
    }

    pub(super) async fn execute_batch(&self, sql: String) -> Result<()> {
        self.request(
            |respond_to| Command::ExecuteBatch { sql, respond_to },
            "SQLite worker dropped while executing batch",
        )
        .await
    }

    pub(super) async fn query(&self, sql: String, params: Vec<Value>) -> Result<Vec<Row>> {
        self.request(
            |respond_to| Command::Query {
                sql,
                params,
                respond_to,
            },
            "SQLite worker dropped while executing query",
        )
        .await
    }

    pub(super) async fn last_inserted_id(&self) -> Result<i64> {
        self.request(
            |respond_to| Command::LastInsertedId { respond_to },
            "SQLite worker dropped while reading last rowid",
        )
        .await
    }

    pub(super) async fn modified_row_count(&self) -> Result<usize> {
        self.request(
            |respond_to| Command::ModifiedRowCount { respond_to },
            "SQLite worker dropped while reading change count",
        )
        .await
    }

    pub(super) async fn version(&self) -> Result<Option<String>> {
        self.request(
            |respond_to| Command::Version { respond_to },
            "SQLite worker dropped while reading extension version",
        )
        .await
    }

    pub(super) async fn build_info(&self) -> Result<Option<String>> {
        self.request(
            |respond_to| Command::BuildInfo { respond_to },
            "SQLite worker dropped while reading extension build info",
        )
        .await
    }

    pub(super) async fn close(&self) -> Result<()> {
        self.request(
            |respond_to| Command::Close { respond_to },
            "SQLite worker dropped while closing",
        )
        .await
    }

    pub(super) async fn with_session<F, R>(&self, func: F) -> Result<R>
    where
        F: FnOnce(&Session<'_>) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let callback: BoxedCallback = Box::new(move |session| {
            func(session).map(|value| Box::new(value) as Box<dyn std::any::Any + Send>)
        });
        self.send_command(Command::WithSession {
            callback,
            respond_to: tx,
        })?;
        match rx.await {
            Ok(Ok(payload)) => payload.downcast::<R>().map(|boxed| *boxed).map_err(|_| {
                SqlVecError::ExecutionError("SQLite worker response downcast failure".into())
            }),
            Ok(Err(err)) => Err(err),
            Err(_) => Err(connection_error(
                "SQLite worker dropped while running session callback",
            )),
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        let _ = self.sender.send(Command::Shutdown);
    }
}

fn connection_error(message: &str) -> SqlVecError {
    SqlVecError::ConnectionError(message.into())
}
