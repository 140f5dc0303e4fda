//! Connection actor.
//!
//! Each [`Connection`] owns one native handle on a dedicated thread. Callers
//! send commands over a channel and await the reply, so every operation on a
//! connection runs to completion before the next one starts, in submission
//! order. Dropping a pending future only discards its reply; the command still
//! runs on the worker.

mod channel;
mod connection;
mod dispatcher;
mod manager;

pub use connection::Connection;
