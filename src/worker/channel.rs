use std::any::Any;

use tokio::sync::oneshot;

use crate::error::Result;
use crate::results::Row;
use crate::session::Session;
use crate::types::Value;

pub(super) type BoxedResponse = Result<Box<dyn Any + Send>>;
pub(super) type BoxedCallback = Box<dyn FnOnce(&Session<'_>) -> BoxedResponse + Send>;

pub(super) enum Command {
    Execute {
        sql: String,
        params: Vec<Value>,
        respond_to: oneshot::Sender<Result<usize>>,
    },
    ExecuteBatch {
        sql: String,
        respond_to: oneshot::Sender<Result<()>>,
    },
    Query {
        sql: String,
        params: Vec<Value>,
        respond_to: oneshot::Sender<Result<Vec<Row>>>,
    },
    LastInsertedId {
        respond_to: oneshot::Sender<Result<i64>>,
    },
    ModifiedRowCount {
        respond_to: oneshot::Sender<Result<usize>>,
    },
    Version {
        respond_to: oneshot::Sender<Result<Option<String>>>,
    },
    BuildInfo {
        respond_to: oneshot::Sender<Result<Option<String>>>,
    },
    WithSession {
        callback: BoxedCallback,
        respond_to: oneshot::Sender<BoxedResponse>,
    },
    Close {
        respond_to: oneshot::Sender<Result<()>>,
    },
    Shutdown,
}
