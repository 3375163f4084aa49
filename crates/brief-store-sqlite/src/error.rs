//! Error type for `brief-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] brief_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("case not found: {0}")]
  CaseNotFound(String),

  #[error("subject not found: {0}")]
  SubjectNotFound(i64),

  #[error("opinion not found: {0}")]
  OpinionNotFound(i64),

  #[error("course not found: {0}")]
  CourseNotFound(String),

  #[error("a case labelled {0:?} already exists")]
  DuplicateLabel(String),

  #[error("course {0:?} already exists")]
  DuplicateCourse(String),

  #[error("subject {0:?} already exists")]
  DuplicateSubject(String),

  /// The subject is still linked to at least one case.
  #[error("subject {id} is referenced by {cases} case(s); unlink it first")]
  SubjectReferenced { id: i64, cases: usize },

  /// The opinion is still linked to at least one case.
  #[error("opinion {id} is referenced by {cases} case(s); unlink it first")]
  OpinionReferenced { id: i64, cases: usize },

  #[error("course {name:?} is still used by {cases} case(s)")]
  CourseInUse { name: String, cases: usize },

  /// `PRAGMA foreign_key_check` reported dangling references after a restore.
  #[error("restored data has {0} foreign-key violation(s)")]
  IntegrityViolations(usize),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
