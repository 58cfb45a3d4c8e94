//! SQLite backend for the rollcall guest directory.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. That thread executes one call
//! at a time, which is what serializes concurrent mutations.

mod attendance;
mod encode;
mod import;
mod schema;
mod search;
mod stats;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteDirectory;
