//! Error types for brief-tex.

use std::{path::PathBuf, process::ExitStatus, time::Duration};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] brief_core::Error),

  #[error("invalid pattern: {0}")]
  Regex(#[from] regex::Error),

  #[error("malformed brief document: {0}")]
  Parse(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("tex program not found: {0}")]
  ProgramNotFound(String),

  #[error("{program} exited with {status}: {stderr}")]
  Compile { program: String, status: ExitStatus, stderr: String },

  #[error("{program} did not finish within {after:?}")]
  Timeout { program: String, after: Duration },

  /// The program exited cleanly but the PDF is not where it should be.
  #[error("no pdf produced at {}", .0.display())]
  MissingOutput(PathBuf),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
