//! Mapping between SQLite rows and domain types, plus SQL literal encoding
//! for dumps.
//!
//! Every read goes through the column lists defined here so that the
//! positional `row.get(n)` calls below stay in sync with the SELECTs.

use brief_core::{
  brief::{Case, CaseDetails},
  catalog::{Course, Opinion, Subject},
};
use rusqlite::{Row, types::ValueRef};

// ─── Column lists ────────────────────────────────────────────────────────────

/// Columns of `Cases` (and the leading columns of `CaseDetailsView`) in the
/// order [`case_from_row`] expects.
pub const CASE_COLUMNS: &str = "label, plaintiff, defendant, title, citation, course, \
   facts, procedure, issue, holding, principle, reasoning, notes";

const CASE_COLUMN_COUNT: usize = 13;

// ─── Row decoders ────────────────────────────────────────────────────────────

pub fn case_from_row(row: &Row<'_>) -> rusqlite::Result<Case> {
  Ok(Case {
    label:     row.get(0)?,
    plaintiff: row.get(1)?,
    defendant: row.get(2)?,
    title:     row.get(3)?,
    citation:  row.get(4)?,
    course:    row.get(5)?,
    facts:     row.get(6)?,
    procedure: row.get(7)?,
    issue:     row.get(8)?,
    holding:   row.get(9)?,
    principle: row.get(10)?,
    reasoning: row.get(11)?,
    notes:     row.get(12)?,
  })
}

/// Decode a `CaseDetailsView` row selected as `CASE_COLUMNS, subjects,
/// opinions`.
pub fn details_from_row(row: &Row<'_>) -> rusqlite::Result<CaseDetails> {
  Ok(CaseDetails {
    case:     case_from_row(row)?,
    subjects: row.get(CASE_COLUMN_COUNT)?,
    opinions: row.get(CASE_COLUMN_COUNT + 1)?,
  })
}

/// Decode `id, name` from `Subjects` or `subject_id, subject_name` from
/// `CaseSubjectsView`.
pub fn subject_from_row(row: &Row<'_>) -> rusqlite::Result<Subject> {
  Ok(Subject { id: row.get(0)?, name: row.get(1)? })
}

/// Decode `id, author, opinion_text` (or the view's equivalent columns).
pub fn opinion_from_row(row: &Row<'_>) -> rusqlite::Result<Opinion> {
  Ok(Opinion { id: row.get(0)?, author: row.get(1)?, text: row.get(2)? })
}

pub fn course_from_row(row: &Row<'_>) -> rusqlite::Result<Course> {
  Ok(Course { name: row.get(0)? })
}

// ─── SQL text ────────────────────────────────────────────────────────────────

/// Quote an identifier with double quotes, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String { format!("\"{}\"", name.replace('"', "\"\"")) }

/// Render a stored value as a SQL literal that reads back to the same value.
pub fn sql_literal(value: ValueRef<'_>) -> String {
  match value {
    ValueRef::Null => "NULL".to_owned(),
    ValueRef::Integer(i) => i.to_string(),
    ValueRef::Real(f) if f.is_finite() => format!("{f:?}"),
    ValueRef::Real(f) if f.is_sign_negative() => "-9e999".to_owned(),
    ValueRef::Real(_) => "9e999".to_owned(),
    ValueRef::Text(bytes) => {
      let text = String::from_utf8_lossy(bytes);
      format!("'{}'", text.replace('\'', "''"))
    }
    ValueRef::Blob(bytes) => format!("X'{}'", hex::encode_upper(bytes)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn literals_escape_quotes() {
    assert_eq!(sql_literal(ValueRef::Text(b"O'Brien")), "'O''Brien'");
    assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
  }

  #[test]
  fn literals_cover_every_storage_class() {
    assert_eq!(sql_literal(ValueRef::Null), "NULL");
    assert_eq!(sql_literal(ValueRef::Integer(-42)), "-42");
    assert_eq!(sql_literal(ValueRef::Real(1.5)), "1.5");
    assert_eq!(sql_literal(ValueRef::Blob(&[0xde, 0xad])), "X'DEAD'");
  }
}
