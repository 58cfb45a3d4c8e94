//! Error types for `rollcall-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown toggle action: {0:?} (expected \"in\" or \"out\")")]
  InvalidAction(String),

  #[error("unknown import mode: {0:?} (expected \"replace\" or \"append\")")]
  InvalidImportMode(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
