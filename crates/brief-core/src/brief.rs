//! Case types: the brief itself and its read models.
//!
//! A case row is keyed by a caller-chosen label. Its title is derived from the
//! parties and is never accepted as input: [`NewCase`] and [`CaseUpdate`] have
//! no title field, and the database computes the stored column.

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  catalog::{NewOpinion, Opinion, Subject, normalize_name},
};

// ─── Title & label ───────────────────────────────────────────────────────────

/// The title of a case: `"<plaintiff> v. <defendant>"`.
///
/// Mirrors the generated `title` column in the schema; the two must agree.
pub fn case_title(plaintiff: &str, defendant: &str) -> String {
  format!("{plaintiff} v. {defendant}")
}

/// Characters that would break `\label{case:...}` or `CITE(...)` markup.
const LABEL_FORBIDDEN: &[char] = &['{', '}', '\\', '%', '#', ',', '(', ')'];

/// Check that `label` can serve as a primary key and a LaTeX label.
pub fn validate_label(label: &str) -> Result<()> {
  let reason = if label.is_empty() {
    Some("label is empty")
  } else if label.chars().any(char::is_whitespace) {
    Some("label contains whitespace")
  } else if label.contains(LABEL_FORBIDDEN) {
    Some("label contains a reserved character")
  } else {
    None
  };

  match reason {
    Some(reason) => Err(Error::InvalidLabel { label: label.to_owned(), reason }),
    None => Ok(()),
  }
}

/// File stem shared by a case's `.tex` source and compiled `.pdf`.
pub fn brief_filename(plaintiff: &str, defendant: &str) -> String {
  format!("{plaintiff}_V_{defendant}").replace(' ', "_")
}

// ─── Case ────────────────────────────────────────────────────────────────────

/// A case brief as stored, including the derived title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
  pub label:     String,
  pub plaintiff: String,
  pub defendant: String,
  /// Computed by the database from plaintiff and defendant.
  pub title:     String,
  pub citation:  String,
  pub course:    Option<String>,
  pub facts:     String,
  pub procedure: String,
  pub issue:     String,
  pub holding:   String,
  pub principle: String,
  pub reasoning: String,
  pub notes:     String,
}

impl Case {
  pub fn filename(&self) -> String { brief_filename(&self.plaintiff, &self.defendant) }
}

// ─── NewCase ─────────────────────────────────────────────────────────────────

/// Input to [`crate::store::BriefStore::insert_case`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCase {
  pub label:     String,
  pub plaintiff: String,
  pub defendant: String,
  pub citation:  String,
  pub course:    Option<String>,
  pub facts:     String,
  pub procedure: String,
  pub issue:     String,
  pub holding:   String,
  pub principle: String,
  pub reasoning: String,
  pub notes:     String,
}

impl NewCase {
  /// Convenience constructor with every free-text field empty and no course.
  pub fn new(
    label: impl Into<String>,
    plaintiff: impl Into<String>,
    defendant: impl Into<String>,
  ) -> Self {
    Self {
      label: label.into(),
      plaintiff: plaintiff.into(),
      defendant: defendant.into(),
      ..Self::default()
    }
  }

  pub fn with_course(mut self, course: impl Into<String>) -> Self {
    self.course = Some(course.into());
    self
  }

  /// Validate the label and drop a blank course.
  pub fn normalized(mut self) -> Result<Self> {
    validate_label(&self.label)?;
    self.course = normalize_course(self.course);
    Ok(self)
  }

  pub fn title(&self) -> String { case_title(&self.plaintiff, &self.defendant) }
}

fn normalize_course(course: Option<String>) -> Option<String> {
  course.and_then(|c| normalize_name("course name", &c).ok())
}

// ─── CaseUpdate ──────────────────────────────────────────────────────────────

/// A partial update applied in place. `None` leaves a column untouched.
///
/// `course` is doubly optional: `Some(None)` clears the course.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseUpdate {
  pub plaintiff: Option<String>,
  pub defendant: Option<String>,
  pub citation:  Option<String>,
  pub course:    Option<Option<String>>,
  pub facts:     Option<String>,
  pub procedure: Option<String>,
  pub issue:     Option<String>,
  pub holding:   Option<String>,
  pub principle: Option<String>,
  pub reasoning: Option<String>,
  pub notes:     Option<String>,
}

impl CaseUpdate {
  pub fn is_empty(&self) -> bool { *self == Self::default() }

  /// Drop a blank course to "no course".
  pub fn normalized(mut self) -> Self {
    self.course = self.course.map(normalize_course);
    self
  }

  /// Apply the patch to an in-memory case, recomputing the title.
  pub fn apply_to(self, case: &mut Case) {
    let Self {
      plaintiff,
      defendant,
      citation,
      course,
      facts,
      procedure,
      issue,
      holding,
      principle,
      reasoning,
      notes,
    } = self;

    fn set<T>(slot: &mut T, value: Option<T>) {
      if let Some(v) = value {
        *slot = v;
      }
    }

    set(&mut case.plaintiff, plaintiff);
    set(&mut case.defendant, defendant);
    set(&mut case.citation, citation);
    set(&mut case.course, course);
    set(&mut case.facts, facts);
    set(&mut case.procedure, procedure);
    set(&mut case.issue, issue);
    set(&mut case.holding, holding);
    set(&mut case.principle, principle);
    set(&mut case.reasoning, reasoning);
    set(&mut case.notes, notes);
    case.title = case_title(&case.plaintiff, &case.defendant);
  }
}

// ─── Read models ─────────────────────────────────────────────────────────────

/// One row of `CaseDetailsView`: the case plus its aggregated associations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseDetails {
  pub case:     Case,
  /// Subject names joined with `", "`, ordered by name. Empty when none.
  pub subjects: String,
  /// Distinct `"author: text"` lines joined with `'\n'`, ordered by author
  /// then text. Empty when none.
  pub opinions: String,
}

/// A case with its linked subjects and opinions, everything the document
/// renderer needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brief {
  pub case:     Case,
  /// Ordered by name.
  pub subjects: Vec<Subject>,
  /// Ordered by author, then text.
  pub opinions: Vec<Opinion>,
}

/// Input to [`crate::store::BriefStore::save_brief`]: a whole brief whose
/// subjects are given by name and opinions by content. Missing subjects and
/// opinions are created; existing ones are reused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBrief {
  pub case:     NewCase,
  pub subjects: Vec<String>,
  pub opinions: Vec<NewOpinion>,
}

impl NewBrief {
  /// Validate the case, trim and deduplicate subject names, and normalise
  /// opinion authors.
  pub fn normalized(self) -> Result<Self> {
    let case = self.case.normalized()?;

    let mut subjects: Vec<String> = Vec::with_capacity(self.subjects.len());
    for raw in &self.subjects {
      let name = normalize_name("subject name", raw)?;
      if !subjects.contains(&name) {
        subjects.push(name);
      }
    }

    let mut opinions: Vec<NewOpinion> = Vec::with_capacity(self.opinions.len());
    for op in self.opinions {
      let op = op.normalized()?;
      if !opinions.contains(&op) {
        opinions.push(op);
      }
    }

    Ok(Self { case, subjects, opinions })
  }
}
