//! Error type for `rollcall-store-sqlite`.

use rollcall_core::guest::GuestId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// The operation referenced a guest id that does not exist.
  #[error("guest not found: {0}")]
  GuestNotFound(GuestId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
