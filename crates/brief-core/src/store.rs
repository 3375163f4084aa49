//! The `BriefStore` trait.
//!
//! Implemented by storage backends (e.g. `brief-store-sqlite`). Front ends
//! (`brief-cli`) depend on this abstraction for everything except backend
//! maintenance such as dumps.

use std::{collections::BTreeMap, future::Future};

use crate::{
  brief::{Brief, Case, CaseDetails, CaseUpdate, NewBrief, NewCase},
  catalog::{Course, NewOpinion, Opinion, Subject},
};

/// Case label → case title, as consumed by citation expansion.
pub type CitationIndex = BTreeMap<String, String>;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a case-brief store backend.
///
/// Integrity rules every backend must uphold:
///
/// - a subject or opinion referenced by any case cannot be deleted;
/// - a course with cases filed under it cannot be deleted;
/// - case labels are unique;
/// - a case's title is derived from its parties and never written directly;
/// - an association pair exists at most once.
///
/// All methods return `Send` futures so the trait can be used from a
/// multi-threaded tokio runtime.
pub trait BriefStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Courses ───────────────────────────────────────────────────────────

  /// Create a course. Fails if the name is taken.
  fn add_course<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Course, Self::Error>> + Send + 'a;

  /// All courses ordered by name.
  fn list_courses(
    &self,
  ) -> impl Future<Output = Result<Vec<Course>, Self::Error>> + Send + '_;

  /// Delete a course. Fails while any case is filed under it.
  fn remove_course<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Subjects ──────────────────────────────────────────────────────────

  /// Create a subject. Fails if the name is taken.
  fn add_subject<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + 'a;

  /// Return the subject with this name, creating it if necessary.
  fn ensure_subject<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + 'a;

  fn get_subject(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + '_;

  fn find_subject<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + 'a;

  /// All subjects ordered by name.
  fn list_subjects(
    &self,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;

  /// Delete a subject. Fails while any case links to it; the caller must
  /// unlink first.
  fn delete_subject(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Opinions ──────────────────────────────────────────────────────────

  fn add_opinion(
    &self,
    input: NewOpinion,
  ) -> impl Future<Output = Result<Opinion, Self::Error>> + Send + '_;

  fn get_opinion(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Opinion>, Self::Error>> + Send + '_;

  /// All opinions ordered by author, then text.
  fn list_opinions(
    &self,
  ) -> impl Future<Output = Result<Vec<Opinion>, Self::Error>> + Send + '_;

  /// Replace an opinion's author and text in place.
  fn update_opinion(
    &self,
    id: i64,
    input: NewOpinion,
  ) -> impl Future<Output = Result<Opinion, Self::Error>> + Send + '_;

  /// Delete an opinion. Fails while any case links to it.
  fn delete_opinion(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Cases ─────────────────────────────────────────────────────────────

  /// Insert a new case. Fails on a duplicate label or an unknown course.
  fn insert_case(
    &self,
    input: NewCase,
  ) -> impl Future<Output = Result<Case, Self::Error>> + Send + '_;

  fn get_case<'a>(
    &'a self,
    label: &'a str,
  ) -> impl Future<Output = Result<Option<Case>, Self::Error>> + Send + 'a;

  /// All cases ordered by label.
  fn list_cases(
    &self,
  ) -> impl Future<Output = Result<Vec<Case>, Self::Error>> + Send + '_;

  /// Apply `update` in place and return the stored row, title recomputed.
  fn update_case<'a>(
    &'a self,
    label: &'a str,
    update: CaseUpdate,
  ) -> impl Future<Output = Result<Case, Self::Error>> + Send + 'a;

  /// Delete a case together with its association rows.
  fn delete_case<'a>(
    &'a self,
    label: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Associations ──────────────────────────────────────────────────────

  /// Link a subject to a case. Returns `false` if the pair already existed.
  fn link_subject<'a>(
    &'a self,
    label: &'a str,
    subject_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Remove a subject link. Returns `false` if there was none.
  fn unlink_subject<'a>(
    &'a self,
    label: &'a str,
    subject_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Link an opinion to a case. Returns `false` if the pair already existed.
  fn link_opinion<'a>(
    &'a self,
    label: &'a str,
    opinion_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Remove an opinion link. Returns `false` if there was none.
  fn unlink_opinion<'a>(
    &'a self,
    label: &'a str,
    opinion_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Subjects linked to a case, ordered by name.
  fn case_subjects<'a>(
    &'a self,
    label: &'a str,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + 'a;

  /// Opinions linked to a case, ordered by author, then text.
  fn case_opinions<'a>(
    &'a self,
    label: &'a str,
  ) -> impl Future<Output = Result<Vec<Opinion>, Self::Error>> + Send + 'a;

  // ── Views ─────────────────────────────────────────────────────────────

  /// The aggregated details row for one case. `None` if the case is absent.
  fn case_details<'a>(
    &'a self,
    label: &'a str,
  ) -> impl Future<Output = Result<Option<CaseDetails>, Self::Error>> + Send + 'a;

  /// Aggregated details for every case, ordered by label.
  fn list_case_details(
    &self,
  ) -> impl Future<Output = Result<Vec<CaseDetails>, Self::Error>> + Send + '_;

  /// Label → title for every case.
  fn case_titles(
    &self,
  ) -> impl Future<Output = Result<CitationIndex, Self::Error>> + Send + '_;

  // ── Whole briefs ──────────────────────────────────────────────────────

  /// Insert or update a case and replace its associations in one
  /// transaction. The course and subjects are matched by name and opinions
  /// by author and text; unknown ones are created.
  fn save_brief(
    &self,
    input: NewBrief,
  ) -> impl Future<Output = Result<Brief, Self::Error>> + Send + '_;

  /// A case with its linked subjects and opinions. `None` if absent.
  fn load_brief<'a>(
    &'a self,
    label: &'a str,
  ) -> impl Future<Output = Result<Option<Brief>, Self::Error>> + Send + 'a;
}
