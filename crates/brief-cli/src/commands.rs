//! Subcommand handlers.
//!
//! Each handler returns a [`Report`] so output formatting stays in one place
//! and handlers can be exercised without capturing stdout.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::{Context as _, Result, anyhow};
use brief_core::{
  brief::{Brief, CaseUpdate, NewCase},
  catalog::{NewOpinion, Subject},
  store::BriefStore,
};
use brief_store_sqlite::SqliteStore;
use brief_tex::Compiler;
use serde::Serialize;
use tracing::info;

use crate::config::Settings;

// ─── Report ──────────────────────────────────────────────────────────────────

/// A command result, printable as plain text or JSON.
#[derive(Debug)]
pub struct Report {
  pub value: serde_json::Value,
  pub text:  String,
}

impl Report {
  pub fn new<T: Serialize>(value: &T, text: impl Into<String>) -> Result<Self> {
    Ok(Self { value: serde_json::to_value(value)?, text: text.into() })
  }

  pub fn print(&self, json: bool) -> Result<()> {
    if json {
      println!("{}", serde_json::to_string_pretty(&self.value)?);
    } else if !self.text.is_empty() {
      println!("{}", self.text);
    }
    Ok(())
  }
}

fn lines<T>(items: &[T], line: impl Fn(&T) -> String) -> String {
  items.iter().map(line).collect::<Vec<_>>().join("\n")
}

// ─── Context ─────────────────────────────────────────────────────────────────

pub struct Ctx {
  pub store:    SqliteStore,
  pub settings: Settings,
}

impl Ctx {
  pub async fn open(settings: Settings) -> Result<Self> {
    let store = SqliteStore::open(&settings.database_path)
      .await
      .with_context(|| {
        format!("failed to open store at {}", settings.database_path.display())
      })?;
    Ok(Self { store, settings })
  }

  fn compiler(&self) -> Compiler {
    let compiler =
      Compiler::new(&self.settings.tex_program, &self.settings.cases_dir, &self.settings.output_dir)
        .with_args(self.settings.tex_args.clone());
    match self.settings.compile_timeout_secs {
      Some(secs) => compiler.with_timeout(Duration::from_secs(secs)),
      None => compiler,
    }
  }

  async fn require_brief(&self, label: &str) -> Result<Brief> {
    self
      .store
      .load_brief(label)
      .await?
      .ok_or_else(|| anyhow!("no case labelled {label:?}"))
  }

  /// Resolve a subject given by name or by id; names win over ids. With
  /// `create`, an unknown name is added.
  async fn resolve_subject(&self, subject: &str, create: bool) -> Result<Subject> {
    if let Some(found) = self.store.find_subject(subject).await? {
      return Ok(found);
    }
    if let Ok(id) = subject.trim().parse::<i64>()
      && let Some(found) = self.store.get_subject(id).await?
    {
      return Ok(found);
    }
    if create {
      return Ok(self.store.ensure_subject(subject).await?);
    }
    Err(anyhow!("no subject named or numbered {subject:?}"))
  }
}

// ─── Courses ─────────────────────────────────────────────────────────────────

pub async fn course_add(ctx: &Ctx, name: &str) -> Result<Report> {
  let course = ctx.store.add_course(name).await?;
  Report::new(&course, format!("added course {}", course.name))
}

pub async fn course_list(ctx: &Ctx) -> Result<Report> {
  let courses = ctx.store.list_courses().await?;
  Report::new(&courses, lines(&courses, |c| c.name.clone()))
}

pub async fn course_remove(ctx: &Ctx, name: &str) -> Result<Report> {
  ctx.store.remove_course(name).await?;
  Report::new(&name, format!("removed course {name}"))
}

// ─── Subjects ────────────────────────────────────────────────────────────────

pub async fn subject_add(ctx: &Ctx, name: &str) -> Result<Report> {
  let subject = ctx.store.add_subject(name).await?;
  Report::new(&subject, format!("added subject {} ({})", subject.name, subject.id))
}

pub async fn subject_list(ctx: &Ctx) -> Result<Report> {
  let subjects = ctx.store.list_subjects().await?;
  Report::new(&subjects, lines(&subjects, |s| format!("{:>4}  {}", s.id, s.name)))
}

pub async fn subject_remove(ctx: &Ctx, subject: &str) -> Result<Report> {
  let subject = ctx.resolve_subject(subject, false).await?;
  ctx.store.delete_subject(subject.id).await?;
  Report::new(&subject, format!("removed subject {}", subject.name))
}

// ─── Opinions ────────────────────────────────────────────────────────────────

pub async fn opinion_add(ctx: &Ctx, author: &str, text: &str) -> Result<Report> {
  let opinion = ctx.store.add_opinion(NewOpinion::new(author, text)).await?;
  Report::new(&opinion, format!("added opinion {} by {}", opinion.id, opinion.author))
}

pub async fn opinion_list(ctx: &Ctx) -> Result<Report> {
  let opinions = ctx.store.list_opinions().await?;
  Report::new(&opinions, lines(&opinions, |o| format!("{:>4}  {}", o.id, o.line())))
}

pub async fn opinion_edit(ctx: &Ctx, id: i64, author: &str, text: &str) -> Result<Report> {
  let opinion = ctx.store.update_opinion(id, NewOpinion::new(author, text)).await?;
  Report::new(&opinion, format!("updated opinion {id}"))
}

pub async fn opinion_remove(ctx: &Ctx, id: i64) -> Result<Report> {
  ctx.store.delete_opinion(id).await?;
  Report::new(&id, format!("removed opinion {id}"))
}

// ─── Cases ───────────────────────────────────────────────────────────────────

pub async fn case_add(ctx: &Ctx, input: NewCase) -> Result<Report> {
  let case = ctx.store.insert_case(input).await?;
  Report::new(&case, format!("added {} [{}]", case.title, case.label))
}

pub async fn case_show(ctx: &Ctx, label: &str) -> Result<Report> {
  let details = ctx
    .store
    .case_details(label)
    .await?
    .ok_or_else(|| anyhow!("no case labelled {label:?}"))?;
  let case = &details.case;

  let mut text = format!("{} [{}]\n", case.title, case.label);
  let mut field = |name: &str, value: &str| {
    if !value.is_empty() {
      text.push_str(&format!("\n{name}:\n{value}\n"));
    }
  };
  field("Citation", &case.citation);
  field("Course", case.course.as_deref().unwrap_or_default());
  field("Subjects", &details.subjects);
  field("Facts", &case.facts);
  field("Procedure", &case.procedure);
  field("Issue", &case.issue);
  field("Holding", &case.holding);
  field("Principle", &case.principle);
  field("Reasoning", &case.reasoning);
  field("Opinions", &details.opinions);
  field("Notes", &case.notes);

  Report::new(&details, text.trim_end())
}

pub async fn case_list(ctx: &Ctx) -> Result<Report> {
  let cases = ctx.store.list_cases().await?;
  Report::new(&cases, lines(&cases, |c| format!("{:<24} {}", c.label, c.title)))
}

pub async fn case_edit(ctx: &Ctx, label: &str, update: CaseUpdate) -> Result<Report> {
  let case = ctx.store.update_case(label, update).await?;
  Report::new(&case, format!("updated {} [{}]", case.title, case.label))
}

pub async fn case_delete(ctx: &Ctx, label: &str) -> Result<Report> {
  ctx.store.delete_case(label).await?;
  Report::new(&label, format!("deleted case {label}"))
}

// ─── Associations ────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct LinkChange<'a> {
  label:   &'a str,
  target:  &'a str,
  id:      i64,
  changed: bool,
}

pub async fn link_subject(ctx: &Ctx, label: &str, subject: &str) -> Result<Report> {
  let subject = ctx.resolve_subject(subject, true).await?;
  let changed = ctx.store.link_subject(label, subject.id).await?;
  let text = if changed {
    format!("linked subject {} to {label}", subject.name)
  } else {
    format!("subject {} was already linked to {label}", subject.name)
  };
  Report::new(&LinkChange { label, target: "subject", id: subject.id, changed }, text)
}

pub async fn unlink_subject(ctx: &Ctx, label: &str, subject: &str) -> Result<Report> {
  let subject = ctx.resolve_subject(subject, false).await?;
  let changed = ctx.store.unlink_subject(label, subject.id).await?;
  let text = if changed {
    format!("unlinked subject {} from {label}", subject.name)
  } else {
    format!("subject {} was not linked to {label}", subject.name)
  };
  Report::new(&LinkChange { label, target: "subject", id: subject.id, changed }, text)
}

pub async fn link_opinion(ctx: &Ctx, label: &str, id: i64) -> Result<Report> {
  let changed = ctx.store.link_opinion(label, id).await?;
  let text = if changed {
    format!("linked opinion {id} to {label}")
  } else {
    format!("opinion {id} was already linked to {label}")
  };
  Report::new(&LinkChange { label, target: "opinion", id, changed }, text)
}

pub async fn unlink_opinion(ctx: &Ctx, label: &str, id: i64) -> Result<Report> {
  let changed = ctx.store.unlink_opinion(label, id).await?;
  let text = if changed {
    format!("unlinked opinion {id} from {label}")
  } else {
    format!("opinion {id} was not linked to {label}")
  };
  Report::new(&LinkChange { label, target: "opinion", id, changed }, text)
}

// ─── Documents ───────────────────────────────────────────────────────────────

async fn write_file(path: &Path, contents: &str) -> Result<()> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    tokio::fs::create_dir_all(parent)
      .await
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }
  tokio::fs::write(path, contents)
    .await
    .with_context(|| format!("failed to write {}", path.display()))
}

/// Render one brief into the cases directory and return the file path.
async fn render_to_disk(ctx: &Ctx, brief: &Brief) -> Result<PathBuf> {
  let index = ctx.store.case_titles().await?;
  let tex = brief_tex::render_brief(brief, &index)?;
  let path = ctx.settings.cases_dir.join(format!("{}.tex", brief.case.filename()));
  write_file(&path, &tex).await?;
  info!(label = %brief.case.label, path = %path.display(), "brief rendered");
  Ok(path)
}

pub async fn render(ctx: &Ctx, label: &str) -> Result<Report> {
  let brief = ctx.require_brief(label).await?;
  let path = render_to_disk(ctx, &brief).await?;
  Report::new(&path, format!("wrote {}", path.display()))
}

pub async fn render_all(ctx: &Ctx) -> Result<Report> {
  let mut briefs = Vec::new();
  let mut written = Vec::new();
  for case in ctx.store.list_cases().await? {
    let brief = ctx.require_brief(&case.label).await?;
    written.push(render_to_disk(ctx, &brief).await?);
    briefs.push(brief);
  }

  let master = ctx.settings.master_path();
  write_file(&master, &brief_tex::render_master(&briefs, &ctx.settings.subfile_dir())).await?;
  written.push(master);

  Report::new(&written, lines(&written, |p| format!("wrote {}", p.display())))
}

pub async fn compile(ctx: &Ctx, label: &str) -> Result<Report> {
  let brief = ctx.require_brief(label).await?;
  let tex = render_to_disk(ctx, &brief).await?;
  let pdf = ctx
    .compiler()
    .compile(&tex)
    .await
    .with_context(|| format!("failed to compile {}", tex.display()))?;
  Report::new(&pdf, format!("compiled {}", pdf.display()))
}

pub async fn import(ctx: &Ctx, file: &Path) -> Result<Report> {
  let tex = tokio::fs::read_to_string(file)
    .await
    .with_context(|| format!("failed to read {}", file.display()))?;
  let input = brief_tex::parse_brief(&tex)
    .with_context(|| format!("failed to parse {}", file.display()))?;
  let brief = ctx.store.save_brief(input).await?;
  Report::new(&brief, format!("imported {} [{}]", brief.case.title, brief.case.label))
}

// ─── Dumps ───────────────────────────────────────────────────────────────────

pub async fn export(ctx: &Ctx, file: &Path) -> Result<Report> {
  let bytes = ctx
    .store
    .export_to_file(file)
    .await
    .with_context(|| format!("failed to export to {}", file.display()))?;
  Report::new(&file, format!("exported {bytes} bytes to {}", file.display()))
}

pub async fn restore(ctx: &Ctx, file: &Path) -> Result<Report> {
  ctx
    .store
    .restore_from_file(file)
    .await
    .with_context(|| format!("failed to restore from {}", file.display()))?;
  Report::new(&file, format!("restored {}", file.display()))
}

pub async fn backup(ctx: &Ctx) -> Result<Report> {
  let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
  let file = ctx.settings.backup_dir.join(format!("CaseBriefs-{stamp}.sql"));
  export(ctx, &file).await
}

#[cfg(test)]
mod tests {
  use super::*;

  async fn ctx(dir: &Path) -> Ctx {
    let settings = Settings {
      database_path:        dir.join("SQL/Cases.sqlite"),
      cases_dir:            dir.join("Cases"),
      output_dir:           dir.join("Cases/Output"),
      backup_dir:           dir.join("Backup"),
      tex_program:          PathBuf::from("tinitex"),
      tex_args:             Vec::new(),
      compile_timeout_secs: None,
    };
    Ctx::open(settings).await.unwrap()
  }

  async fn seed(ctx: &Ctx) {
    course_add(ctx, "Torts").await.unwrap();
    case_add(ctx, NewCase::new("Palsgraf-1928", "Palsgraf", "Long Island Railroad").with_course("Torts"))
      .await
      .unwrap();
    link_subject(ctx, "Palsgraf-1928", "Negligence").await.unwrap();
    let op = opinion_add(ctx, "Cardozo", "Majority.").await.unwrap();
    let id = op.value["id"].as_i64().unwrap();
    link_opinion(ctx, "Palsgraf-1928", id).await.unwrap();
  }

  #[tokio::test]
  async fn render_then_import_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path()).await;
    seed(&ctx).await;

    let report = render(&ctx, "Palsgraf-1928").await.unwrap();
    let path = dir.path().join("Cases/Palsgraf_V_Long_Island_Railroad.tex");
    assert_eq!(report.value, serde_json::json!(path));
    assert!(path.exists());

    case_delete(&ctx, "Palsgraf-1928").await.unwrap();
    import(&ctx, &path).await.unwrap();

    let brief = ctx.store.load_brief("Palsgraf-1928").await.unwrap().unwrap();
    assert_eq!(brief.case.title, "Palsgraf v. Long Island Railroad");
    assert_eq!(brief.subjects.len(), 1);
    assert_eq!(brief.opinions[0].author, "Cardozo");
  }

  #[tokio::test]
  async fn render_all_writes_master() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path()).await;
    seed(&ctx).await;

    render_all(&ctx).await.unwrap();
    let master = std::fs::read_to_string(dir.path().join("tex_src/CaseBriefs.tex")).unwrap();
    assert!(master.contains("\\subfile{../Cases/Palsgraf_V_Long_Island_Railroad.tex}"));
  }

  #[tokio::test]
  async fn linking_by_name_creates_subject_once() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path()).await;
    seed(&ctx).await;

    let again = link_subject(&ctx, "Palsgraf-1928", "Negligence").await.unwrap();
    assert_eq!(again.value["changed"], false);
    assert_eq!(ctx.store.list_subjects().await.unwrap().len(), 1);

    let err = subject_remove(&ctx, "Negligence").await.unwrap_err();
    assert!(err.to_string().contains("referenced"));
  }

  #[tokio::test]
  async fn numeric_subject_names_resolve_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path()).await;
    seed(&ctx).await;

    // "1983" is a name here, and "1" is the id of Negligence.
    let linked = link_subject(&ctx, "Palsgraf-1928", "1983").await.unwrap();
    assert_eq!(linked.value["changed"], true);
    let by_id = link_subject(&ctx, "Palsgraf-1928", "1").await.unwrap();
    assert_eq!(by_id.value["changed"], false);
    assert_eq!(ctx.store.list_subjects().await.unwrap().len(), 2);

    unlink_subject(&ctx, "Palsgraf-1928", "1983").await.unwrap();
    let removed = subject_remove(&ctx, "1983").await.unwrap();
    assert_eq!(removed.value["name"], "1983");
    assert!(ctx.store.find_subject("1983").await.unwrap().is_none());

    let err = subject_remove(&ctx, "404").await.unwrap_err();
    assert!(err.to_string().contains("no subject"));
  }

  #[tokio::test]
  async fn backup_lands_in_backup_dir() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = ctx(dir.path()).await;
    seed(&ctx).await;

    backup(&ctx).await.unwrap();
    let entries: Vec<_> = std::fs::read_dir(dir.path().join("Backup")).unwrap().collect();
    assert_eq!(entries.len(), 1);
  }
}
