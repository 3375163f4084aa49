//! Error types for `brief-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid case label {label:?}: {reason}")]
  InvalidLabel { label: String, reason: &'static str },

  #[error("{kind} must not be empty")]
  EmptyName { kind: &'static str },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
