//! Catalog entities that cases refer to: courses, subjects and opinions.
//!
//! Each is stored once and shared by many cases. Subjects and opinions are
//! linked through association tables; a course is a plain foreign key on the
//! case row.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Course ──────────────────────────────────────────────────────────────────

/// A class a case is filed under, e.g. "Torts". Unique by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
  pub name: String,
}

// ─── Subject ─────────────────────────────────────────────────────────────────

/// A legal topic tag, e.g. "Negligence". Unique by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
  /// Assigned by the store on insert.
  pub id:   i64,
  pub name: String,
}

// ─── Opinion ─────────────────────────────────────────────────────────────────

/// An authored opinion text (majority, concurrence, dissent).
///
/// Opinions are unique by id only; two rows may carry the same author and
/// text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opinion {
  pub id:     i64,
  pub author: String,
  pub text:   String,
}

impl Opinion {
  /// The `"author: text"` form used by the aggregated details view and by the
  /// rendered document.
  pub fn line(&self) -> String { format!("{}: {}", self.author, self.text) }
}

/// Input to [`crate::store::BriefStore::add_opinion`] and
/// [`crate::store::BriefStore::update_opinion`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOpinion {
  pub author: String,
  pub text:   String,
}

impl NewOpinion {
  pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
    Self { author: author.into(), text: text.into() }
  }

  /// Trim the author and reject an empty one. The text is kept verbatim.
  pub fn normalized(self) -> Result<Self> {
    Ok(Self { author: normalize_name("opinion author", &self.author)?, text: self.text })
  }
}

// ─── Names ───────────────────────────────────────────────────────────────────

/// Trim `raw` and reject it when nothing is left.
///
/// `kind` names the field in the error message ("course name", "subject
/// name", ...).
pub fn normalize_name(kind: &'static str, raw: &str) -> Result<String> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return Err(Error::EmptyName { kind });
  }
  Ok(trimmed.to_owned())
}
