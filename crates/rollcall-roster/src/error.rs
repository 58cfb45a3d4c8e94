//! Error types for the rollcall-roster codec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("CSV error: {0}")]
  Csv(#[from] csv::Error),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("roster has no {0} column")]
  MissingColumn(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
