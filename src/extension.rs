//! Process-wide registration of the sqlite-vec extension.

use std::ffi::{c_char, c_int};
use std::sync::OnceLock;

use rusqlite::ffi::{sqlite3, sqlite3_api_routines, sqlite3_auto_extension};
use sqlite_vec::sqlite3_vec_init;
use tracing::debug;

use crate::error::{Result, check_status};

type ExtensionEntryPoint =
    unsafe extern "C" fn(*mut sqlite3, *mut *mut c_char, *const sqlite3_api_routines) -> c_int;

static REGISTERED: OnceLock<c_int> = OnceLock::new();

/// Register the vector extension so every connection opened afterwards has
/// `vec0`, `vec_version()` and the distance functions available.
///
/// Call once at startup before opening any [`crate::Connection`]. Later calls
/// return the outcome of the first registration without touching the engine.
///
/// # Errors
/// Returns [`crate::SqlVecError::Sqlite`] if the engine refuses the registration.
pub fn initialize() -> Result<()> {
    let rc = *REGISTERED.get_or_init(|| {
        let rc = register();
        debug!(rc, "registered sqlite-vec auto extension");
        rc
    });
    check_status(rc, || Some("failed to register sqlite-vec".to_owned()))
}

#[allow(unsafe_code)]
fn register() -> c_int {
    // SAFETY: sqlite3_vec_init has the extension entry point ABI; the engine
    // only invokes it with valid handles while opening a connection.
    unsafe {
        sqlite3_auto_extension(Some(std::mem::transmute::<*const (), ExtensionEntryPoint>(
            sqlite3_vec_init as *const (),
        )))
    }
}
