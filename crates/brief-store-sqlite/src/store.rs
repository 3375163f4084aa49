//! [`SqliteStore`], the SQLite implementation of [`BriefStore`].

use std::path::Path;

use rusqlite::{Connection, OptionalExtension as _, types::Value};
use tracing::{debug, info, warn};

use brief_core::{
  brief::{Brief, Case, CaseDetails, CaseUpdate, NewBrief, NewCase},
  catalog::{Course, NewOpinion, Opinion, Subject, normalize_name},
  store::{BriefStore, CitationIndex},
};

use crate::{
  Error, Result,
  encode::{
    CASE_COLUMNS, case_from_row, course_from_row, details_from_row, opinion_from_row,
    subject_from_row,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A case-brief store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }
    debug!(path = %path.display(), "opening case store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Closure outcomes ────────────────────────────────────────────────────────
//
// Check-then-act runs inside one transaction on the database thread; these
// carry the verdict back so the async side can pick the typed error.

enum Guard {
  Deleted,
  Missing,
  Referenced(usize),
}

enum CaseWrite {
  Written(Case),
  Missing,
  Duplicate,
  UnknownCourse(String),
}

enum Link {
  Linked(bool),
  MissingCase,
  MissingTarget,
}

// ─── Synchronous helpers (run on the database thread) ────────────────────────

fn exists(conn: &Connection, sql: &str, param: impl rusqlite::ToSql) -> rusqlite::Result<bool> {
  Ok(conn.query_row(sql, [param], |_| Ok(())).optional()?.is_some())
}

fn count(conn: &Connection, sql: &str, param: impl rusqlite::ToSql) -> rusqlite::Result<usize> {
  let n: i64 = conn.query_row(sql, [param], |r| r.get(0))?;
  Ok(usize::try_from(n).unwrap_or_default())
}

fn case_exists(conn: &Connection, label: &str) -> rusqlite::Result<bool> {
  exists(conn, "SELECT 1 FROM Cases WHERE label = ?1", label)
}

fn course_exists(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
  exists(conn, "SELECT 1 FROM Courses WHERE name = ?1", name)
}

fn read_case(conn: &Connection, label: &str) -> rusqlite::Result<Option<Case>> {
  conn
    .query_row(
      &format!("SELECT {CASE_COLUMNS} FROM Cases WHERE label = ?1"),
      [label],
      case_from_row,
    )
    .optional()
}

fn read_subject_by_name(conn: &Connection, name: &str) -> rusqlite::Result<Option<Subject>> {
  conn
    .query_row("SELECT id, name FROM Subjects WHERE name = ?1", [name], subject_from_row)
    .optional()
}

fn read_case_subjects(conn: &Connection, label: &str) -> rusqlite::Result<Vec<Subject>> {
  let mut stmt = conn.prepare(
    "SELECT subject_id, subject_name FROM CaseSubjectsView
     WHERE case_label = ?1
     ORDER BY subject_name",
  )?;
  let rows = stmt.query_map([label], subject_from_row)?.collect();
  rows
}

fn read_case_opinions(conn: &Connection, label: &str) -> rusqlite::Result<Vec<Opinion>> {
  let mut stmt = conn.prepare(
    "SELECT opinion_id, opinion_author, opinion_text FROM CaseOpinionsView
     WHERE case_label = ?1
     ORDER BY opinion_author, opinion_text, opinion_id",
  )?;
  let rows = stmt.query_map([label], opinion_from_row)?.collect();
  rows
}

fn read_brief(conn: &Connection, label: &str) -> rusqlite::Result<Option<Brief>> {
  let Some(case) = read_case(conn, label)? else {
    return Ok(None);
  };
  Ok(Some(Brief {
    subjects: read_case_subjects(conn, &case.label)?,
    opinions: read_case_opinions(conn, &case.label)?,
    case,
  }))
}

/// Get-or-insert a subject by name; returns its id.
fn subject_id_for(conn: &Connection, name: &str) -> rusqlite::Result<i64> {
  if let Some(subject) = read_subject_by_name(conn, name)? {
    return Ok(subject.id);
  }
  conn.execute("INSERT INTO Subjects (name) VALUES (?1)", [name])?;
  Ok(conn.last_insert_rowid())
}

/// Get-or-insert an opinion by author and text; returns its id.
fn opinion_id_for(conn: &Connection, op: &NewOpinion) -> rusqlite::Result<i64> {
  let found: Option<i64> = conn
    .query_row(
      "SELECT id FROM Opinions WHERE author = ?1 AND opinion_text = ?2 ORDER BY id LIMIT 1",
      rusqlite::params![op.author, op.text],
      |r| r.get(0),
    )
    .optional()?;
  if let Some(id) = found {
    return Ok(id);
  }
  conn.execute(
    "INSERT INTO Opinions (author, opinion_text) VALUES (?1, ?2)",
    rusqlite::params![op.author, op.text],
  )?;
  Ok(conn.last_insert_rowid())
}

/// Insert an association pair unless it already exists.
fn link_pair(
  conn: &mut Connection,
  label: &str,
  target_id: i64,
  target_exists_sql: &str,
  insert_sql: &str,
) -> rusqlite::Result<Link> {
  let tx = conn.transaction()?;
  if !case_exists(&tx, label)? {
    return Ok(Link::MissingCase);
  }
  if !exists(&tx, target_exists_sql, target_id)? {
    return Ok(Link::MissingTarget);
  }
  let inserted = tx.execute(insert_sql, rusqlite::params![label, target_id])?;
  tx.commit()?;
  Ok(Link::Linked(inserted > 0))
}

/// Delete a catalog row after checking it is present and unreferenced.
fn guarded_delete(
  conn: &mut Connection,
  exists_sql: &str,
  references_sql: &str,
  delete_sql: &str,
  key: &Value,
) -> rusqlite::Result<Guard> {
  let tx = conn.transaction()?;
  if !exists(&tx, exists_sql, key)? {
    return Ok(Guard::Missing);
  }
  let refs = count(&tx, references_sql, key)?;
  if refs > 0 {
    return Ok(Guard::Referenced(refs));
  }
  tx.execute(delete_sql, [key])?;
  tx.commit()?;
  Ok(Guard::Deleted)
}

// ─── Inherent helpers ────────────────────────────────────────────────────────

impl SqliteStore {
  fn link_error(label: &str, outcome: Link, missing: Error) -> Result<bool> {
    match outcome {
      Link::Linked(inserted) => Ok(inserted),
      Link::MissingCase => Err(Error::CaseNotFound(label.to_owned())),
      Link::MissingTarget => Err(missing),
    }
  }

  fn case_write_result(label: &str, outcome: CaseWrite) -> Result<Case> {
    match outcome {
      CaseWrite::Written(case) => Ok(case),
      CaseWrite::Missing => Err(Error::CaseNotFound(label.to_owned())),
      CaseWrite::Duplicate => Err(Error::DuplicateLabel(label.to_owned())),
      CaseWrite::UnknownCourse(course) => Err(Error::CourseNotFound(course)),
    }
  }
}

// ─── BriefStore impl ─────────────────────────────────────────────────────────

impl BriefStore for SqliteStore {
  type Error = Error;

  // ── Courses ───────────────────────────────────────────────────────────────

  async fn add_course(&self, name: &str) -> Result<Course> {
    let name = normalize_name("course name", name)?;
    let name_arg = name.clone();

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if course_exists(&tx, &name_arg)? {
          return Ok(false);
        }
        tx.execute("INSERT INTO Courses (name) VALUES (?1)", [&name_arg])?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(Error::DuplicateCourse(name));
    }
    info!(course = %name, "course added");
    Ok(Course { name })
  }

  async fn list_courses(&self) -> Result<Vec<Course>> {
    let courses = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT name FROM Courses ORDER BY name")?;
        let rows = stmt.query_map([], course_from_row)?.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(courses)
  }

  async fn remove_course(&self, name: &str) -> Result<()> {
    let name = normalize_name("course name", name)?;
    let key = Value::Text(name.clone());

    let outcome = self
      .conn
      .call(move |conn| {
        Ok(guarded_delete(
          conn,
          "SELECT 1 FROM Courses WHERE name = ?1",
          "SELECT COUNT(*) FROM Cases WHERE course = ?1",
          "DELETE FROM Courses WHERE name = ?1",
          &key,
        )?)
      })
      .await?;

    match outcome {
      Guard::Deleted => {
        info!(course = %name, "course removed");
        Ok(())
      }
      Guard::Missing => Err(Error::CourseNotFound(name)),
      Guard::Referenced(cases) => {
        warn!(course = %name, cases, "course still in use; not removed");
        Err(Error::CourseInUse { name, cases })
      }
    }
  }

  // ── Subjects ──────────────────────────────────────────────────────────────

  async fn add_subject(&self, name: &str) -> Result<Subject> {
    let name = normalize_name("subject name", name)?;
    let name_arg = name.clone();

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if read_subject_by_name(&tx, &name_arg)?.is_some() {
          return Ok(None);
        }
        tx.execute("INSERT INTO Subjects (name) VALUES (?1)", [&name_arg])?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Some(id))
      })
      .await?;

    let Some(id) = id else {
      return Err(Error::DuplicateSubject(name));
    };
    info!(subject = %name, id, "subject added");
    Ok(Subject { id, name })
  }

  async fn ensure_subject(&self, name: &str) -> Result<Subject> {
    let name = normalize_name("subject name", name)?;
    let name_arg = name.clone();

    let id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let id = subject_id_for(&tx, &name_arg)?;
        tx.commit()?;
        Ok(id)
      })
      .await?;

    Ok(Subject { id, name })
  }

  async fn get_subject(&self, id: i64) -> Result<Option<Subject>> {
    let subject = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row("SELECT id, name FROM Subjects WHERE id = ?1", [id], subject_from_row)
            .optional()?,
        )
      })
      .await?;
    Ok(subject)
  }

  async fn find_subject(&self, name: &str) -> Result<Option<Subject>> {
    let name = name.trim().to_owned();
    let subject = self.conn.call(move |conn| Ok(read_subject_by_name(conn, &name)?)).await?;
    Ok(subject)
  }

  async fn list_subjects(&self) -> Result<Vec<Subject>> {
    let subjects = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT id, name FROM Subjects ORDER BY name")?;
        let rows = stmt.query_map([], subject_from_row)?.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(subjects)
  }

  async fn delete_subject(&self, id: i64) -> Result<()> {
    let key = Value::Integer(id);

    let outcome = self
      .conn
      .call(move |conn| {
        Ok(guarded_delete(
          conn,
          "SELECT 1 FROM Subjects WHERE id = ?1",
          "SELECT COUNT(*) FROM CaseSubjects WHERE subject_id = ?1",
          "DELETE FROM Subjects WHERE id = ?1",
          &key,
        )?)
      })
      .await?;

    match outcome {
      Guard::Deleted => {
        info!(id, "subject deleted");
        Ok(())
      }
      Guard::Missing => Err(Error::SubjectNotFound(id)),
      Guard::Referenced(cases) => {
        warn!(id, cases, "subject still linked; not deleted");
        Err(Error::SubjectReferenced { id, cases })
      }
    }
  }

  // ── Opinions ──────────────────────────────────────────────────────────────

  async fn add_opinion(&self, input: NewOpinion) -> Result<Opinion> {
    let input = input.normalized()?;
    let (author, text) = (input.author.clone(), input.text.clone());

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO Opinions (author, opinion_text) VALUES (?1, ?2)",
          rusqlite::params![author, text],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    info!(id, author = %input.author, "opinion added");
    Ok(Opinion { id, author: input.author, text: input.text })
  }

  async fn get_opinion(&self, id: i64) -> Result<Option<Opinion>> {
    let opinion = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, author, opinion_text FROM Opinions WHERE id = ?1",
              [id],
              opinion_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(opinion)
  }

  async fn list_opinions(&self) -> Result<Vec<Opinion>> {
    let opinions = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, author, opinion_text FROM Opinions ORDER BY author, opinion_text, id",
        )?;
        let rows = stmt.query_map([], opinion_from_row)?.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(opinions)
  }

  async fn update_opinion(&self, id: i64, input: NewOpinion) -> Result<Opinion> {
    let input = input.normalized()?;
    let (author, text) = (input.author.clone(), input.text.clone());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE Opinions SET author = ?1, opinion_text = ?2 WHERE id = ?3",
          rusqlite::params![author, text, id],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::OpinionNotFound(id));
    }
    debug!(id, "opinion updated");
    Ok(Opinion { id, author: input.author, text: input.text })
  }

  async fn delete_opinion(&self, id: i64) -> Result<()> {
    let key = Value::Integer(id);

    let outcome = self
      .conn
      .call(move |conn| {
        Ok(guarded_delete(
          conn,
          "SELECT 1 FROM Opinions WHERE id = ?1",
          "SELECT COUNT(*) FROM CaseOpinions WHERE opinion_id = ?1",
          "DELETE FROM Opinions WHERE id = ?1",
          &key,
        )?)
      })
      .await?;

    match outcome {
      Guard::Deleted => {
        info!(id, "opinion deleted");
        Ok(())
      }
      Guard::Missing => Err(Error::OpinionNotFound(id)),
      Guard::Referenced(cases) => {
        warn!(id, cases, "opinion still linked; not deleted");
        Err(Error::OpinionReferenced { id, cases })
      }
    }
  }

  // ── Cases ─────────────────────────────────────────────────────────────────

  async fn insert_case(&self, input: NewCase) -> Result<Case> {
    let input = input.normalized()?;
    let label = input.label.clone();

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if case_exists(&tx, &input.label)? {
          return Ok(CaseWrite::Duplicate);
        }
        if let Some(course) = &input.course
          && !course_exists(&tx, course)?
        {
          return Ok(CaseWrite::UnknownCourse(course.clone()));
        }

        tx.execute(
          "INSERT INTO Cases (
             label, plaintiff, defendant, citation, course,
             facts, procedure, issue, holding, principle, reasoning, notes
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
          rusqlite::params![
            input.label,
            input.plaintiff,
            input.defendant,
            input.citation,
            input.course,
            input.facts,
            input.procedure,
            input.issue,
            input.holding,
            input.principle,
            input.reasoning,
            input.notes,
          ],
        )?;

        let case = read_case(&tx, &input.label)?;
        tx.commit()?;
        Ok(case.map_or(CaseWrite::Missing, CaseWrite::Written))
      })
      .await?;

    let case = Self::case_write_result(&label, outcome)?;
    info!(label = %case.label, title = %case.title, "case inserted");
    Ok(case)
  }

  async fn get_case(&self, label: &str) -> Result<Option<Case>> {
    let label = label.to_owned();
    let case = self.conn.call(move |conn| Ok(read_case(conn, &label)?)).await?;
    Ok(case)
  }

  async fn list_cases(&self) -> Result<Vec<Case>> {
    let cases = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!("SELECT {CASE_COLUMNS} FROM Cases ORDER BY label"))?;
        let rows = stmt.query_map([], case_from_row)?.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(cases)
  }

  async fn update_case(&self, label: &str, update: CaseUpdate) -> Result<Case> {
    let update = update.normalized();
    let label_arg = label.to_owned();

    // Build the SET clause from the fields that are present. The title column
    // is generated, so it never appears here.
    let mut sets: Vec<&'static str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();
    let mut course_check: Option<String> = None;
    {
      let mut push = |column: &'static str, value: Value| {
        sets.push(column);
        values.push(value);
      };
      let CaseUpdate {
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
      } = update;

      for (column, value) in [
        ("plaintiff", plaintiff),
        ("defendant", defendant),
        ("citation", citation),
        ("facts", facts),
        ("procedure", procedure),
        ("issue", issue),
        ("holding", holding),
        ("principle", principle),
        ("reasoning", reasoning),
        ("notes", notes),
      ] {
        if let Some(v) = value {
          push(column, Value::Text(v));
        }
      }
      if let Some(course) = course {
        course_check = course.clone();
        push("course", course.map_or(Value::Null, Value::Text));
      }
    }

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !case_exists(&tx, &label_arg)? {
          return Ok(CaseWrite::Missing);
        }
        if let Some(course) = course_check
          && !course_exists(&tx, &course)?
        {
          return Ok(CaseWrite::UnknownCourse(course));
        }

        if !sets.is_empty() {
          let assignments = sets
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{column} = ?{}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");
          let sql = format!("UPDATE Cases SET {assignments} WHERE label = ?{}", sets.len() + 1);
          values.push(Value::Text(label_arg.clone()));
          tx.execute(&sql, rusqlite::params_from_iter(values.iter()))?;
        }

        let case = read_case(&tx, &label_arg)?;
        tx.commit()?;
        Ok(case.map_or(CaseWrite::Missing, CaseWrite::Written))
      })
      .await?;

    let case = Self::case_write_result(label, outcome)?;
    debug!(label = %case.label, "case updated");
    Ok(case)
  }

  async fn delete_case(&self, label: &str) -> Result<()> {
    let label_arg = label.to_owned();
    let deleted = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM Cases WHERE label = ?1", [&label_arg])?))
      .await?;

    if deleted == 0 {
      return Err(Error::CaseNotFound(label.to_owned()));
    }
    info!(label, "case deleted");
    Ok(())
  }

  // ── Associations ──────────────────────────────────────────────────────────

  async fn link_subject(&self, label: &str, subject_id: i64) -> Result<bool> {
    let label_arg = label.to_owned();
    let outcome = self
      .conn
      .call(move |conn| {
        Ok(link_pair(
          conn,
          &label_arg,
          subject_id,
          "SELECT 1 FROM Subjects WHERE id = ?1",
          "INSERT OR IGNORE INTO CaseSubjects (case_label, subject_id) VALUES (?1, ?2)",
        )?)
      })
      .await?;

    let inserted = Self::link_error(label, outcome, Error::SubjectNotFound(subject_id))?;
    debug!(label, subject_id, inserted, "subject linked");
    Ok(inserted)
  }

  async fn unlink_subject(&self, label: &str, subject_id: i64) -> Result<bool> {
    let label_arg = label.to_owned();
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM CaseSubjects WHERE case_label = ?1 AND subject_id = ?2",
          rusqlite::params![label_arg, subject_id],
        )?)
      })
      .await?;
    debug!(label, subject_id, removed, "subject unlinked");
    Ok(removed > 0)
  }

  async fn link_opinion(&self, label: &str, opinion_id: i64) -> Result<bool> {
    let label_arg = label.to_owned();
    let outcome = self
      .conn
      .call(move |conn| {
        Ok(link_pair(
          conn,
          &label_arg,
          opinion_id,
          "SELECT 1 FROM Opinions WHERE id = ?1",
          "INSERT OR IGNORE INTO CaseOpinions (case_label, opinion_id) VALUES (?1, ?2)",
        )?)
      })
      .await?;

    let inserted = Self::link_error(label, outcome, Error::OpinionNotFound(opinion_id))?;
    debug!(label, opinion_id, inserted, "opinion linked");
    Ok(inserted)
  }

  async fn unlink_opinion(&self, label: &str, opinion_id: i64) -> Result<bool> {
    let label_arg = label.to_owned();
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM CaseOpinions WHERE case_label = ?1 AND opinion_id = ?2",
          rusqlite::params![label_arg, opinion_id],
        )?)
      })
      .await?;
    debug!(label, opinion_id, removed, "opinion unlinked");
    Ok(removed > 0)
  }

  async fn case_subjects(&self, label: &str) -> Result<Vec<Subject>> {
    let label = label.to_owned();
    let subjects = self.conn.call(move |conn| Ok(read_case_subjects(conn, &label)?)).await?;
    Ok(subjects)
  }

  async fn case_opinions(&self, label: &str) -> Result<Vec<Opinion>> {
    let label = label.to_owned();
    let opinions = self.conn.call(move |conn| Ok(read_case_opinions(conn, &label)?)).await?;
    Ok(opinions)
  }

  // ── Views ─────────────────────────────────────────────────────────────────

  async fn case_details(&self, label: &str) -> Result<Option<CaseDetails>> {
    let label = label.to_owned();
    let details = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {CASE_COLUMNS}, subjects, opinions FROM CaseDetailsView WHERE label = ?1"
              ),
              [&label],
              details_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(details)
  }

  async fn list_case_details(&self) -> Result<Vec<CaseDetails>> {
    let details = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CASE_COLUMNS}, subjects, opinions FROM CaseDetailsView ORDER BY label"
        ))?;
        let rows = stmt.query_map([], details_from_row)?.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(details)
  }

  async fn case_titles(&self) -> Result<CitationIndex> {
    let index = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT label, title FROM Cases")?;
        let rows = stmt
          .query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?
          .collect::<rusqlite::Result<CitationIndex>>()?;
        Ok(rows)
      })
      .await?;
    Ok(index)
  }

  // ── Whole briefs ──────────────────────────────────────────────────────────

  async fn save_brief(&self, input: NewBrief) -> Result<Brief> {
    let input = input.normalized()?;
    let label = input.case.label.clone();
    let label_arg = label.clone();

    let brief = self
      .conn
      .call(move |conn| {
        let NewBrief { case, subjects, opinions } = input;
        let tx = conn.transaction()?;

        if let Some(course) = &case.course {
          tx.execute("INSERT OR IGNORE INTO Courses (name) VALUES (?1)", [course])?;
        }

        tx.execute(
          "INSERT INTO Cases (
             label, plaintiff, defendant, citation, course,
             facts, procedure, issue, holding, principle, reasoning, notes
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
           ON CONFLICT(label) DO UPDATE SET
             plaintiff = excluded.plaintiff,
             defendant = excluded.defendant,
             citation  = excluded.citation,
             course    = excluded.course,
             facts     = excluded.facts,
             procedure = excluded.procedure,
             issue     = excluded.issue,
             holding   = excluded.holding,
             principle = excluded.principle,
             reasoning = excluded.reasoning,
             notes     = excluded.notes",
          rusqlite::params![
            case.label,
            case.plaintiff,
            case.defendant,
            case.citation,
            case.course,
            case.facts,
            case.procedure,
            case.issue,
            case.holding,
            case.principle,
            case.reasoning,
            case.notes,
          ],
        )?;

        tx.execute("DELETE FROM CaseSubjects WHERE case_label = ?1", [&case.label])?;
        tx.execute("DELETE FROM CaseOpinions WHERE case_label = ?1", [&case.label])?;

        for name in &subjects {
          let subject_id = subject_id_for(&tx, name)?;
          tx.execute(
            "INSERT OR IGNORE INTO CaseSubjects (case_label, subject_id) VALUES (?1, ?2)",
            rusqlite::params![case.label, subject_id],
          )?;
        }

        for op in &opinions {
          let opinion_id = opinion_id_for(&tx, op)?;
          tx.execute(
            "INSERT OR IGNORE INTO CaseOpinions (case_label, opinion_id) VALUES (?1, ?2)",
            rusqlite::params![case.label, opinion_id],
          )?;
        }

        let brief = read_brief(&tx, &label_arg)?;
        tx.commit()?;
        Ok(brief)
      })
      .await?;

    let brief = brief.ok_or_else(|| Error::CaseNotFound(label.clone()))?;
    info!(
      label = %label,
      subjects = brief.subjects.len(),
      opinions = brief.opinions.len(),
      "brief saved"
    );
    Ok(brief)
  }

  async fn load_brief(&self, label: &str) -> Result<Option<Brief>> {
    let label = label.to_owned();
    debug!(label = %label, "loading brief");
    let brief = self.conn.call(move |conn| Ok(read_brief(conn, &label)?)).await?;
    Ok(brief)
  }
}
