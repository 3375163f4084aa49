//! `casebriefs`: manage law-school case briefs from the command line.
//!
//! # Usage
//!
//! ```text
//! casebriefs course add Torts
//! casebriefs case add Palsgraf-1928 Palsgraf "Long Island Railroad" --course Torts
//! casebriefs link subject Palsgraf-1928 Negligence
//! casebriefs compile Palsgraf-1928
//! casebriefs --json case show Palsgraf-1928
//! ```

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Context as _;
use brief_core::brief::{CaseUpdate, NewCase};
use clap::{Args, Parser, Subcommand};
use commands::Ctx;
use config::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "casebriefs", author, version, about = "Case brief manager")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, global = true, default_value = "casebriefs.toml", env = "CASEBRIEFS_CONFIG")]
  config: PathBuf,

  /// Print results as JSON.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Manage courses.
  #[command(subcommand)]
  Course(CourseCmd),
  /// Manage subjects.
  #[command(subcommand)]
  Subject(SubjectCmd),
  /// Manage opinions.
  #[command(subcommand)]
  Opinion(OpinionCmd),
  /// Manage cases.
  #[command(subcommand)]
  Case(CaseCmd),
  /// Attach a subject or opinion to a case.
  #[command(subcommand)]
  Link(LinkCmd),
  /// Detach a subject or opinion from a case.
  #[command(subcommand)]
  Unlink(LinkCmd),
  /// Write the LaTeX document for one case.
  Render { label: String },
  /// Write every case document plus the master document.
  RenderAll,
  /// Render one case and compile it to PDF.
  Compile { label: String },
  /// Read a brief from a LaTeX document and save it.
  Import { file: PathBuf },
  /// Write a data-only SQL dump.
  Export { file: PathBuf },
  /// Load a SQL dump written by `export`.
  Restore { file: PathBuf },
  /// Export a timestamped dump into the backup directory.
  Backup,
}

#[derive(Subcommand, Debug)]
enum CourseCmd {
  Add { name: String },
  List,
  Remove { name: String },
}

#[derive(Subcommand, Debug)]
enum SubjectCmd {
  Add { name: String },
  List,
  /// Remove a subject by id or name. Fails while any case links to it.
  Remove { subject: String },
}

#[derive(Subcommand, Debug)]
enum OpinionCmd {
  Add { author: String, text: String },
  List,
  Edit { id: i64, author: String, text: String },
  /// Remove an opinion. Fails while any case links to it.
  Remove { id: i64 },
}

#[derive(Subcommand, Debug)]
enum CaseCmd {
  Add {
    label:     String,
    plaintiff: String,
    defendant: String,
    #[command(flatten)]
    fields:    CaseFields,
  },
  Show { label: String },
  List,
  Edit {
    label:        String,
    #[arg(long)]
    plaintiff:    Option<String>,
    #[arg(long)]
    defendant:    Option<String>,
    /// Remove the case from its course.
    #[arg(long, conflicts_with = "course")]
    clear_course: bool,
    #[command(flatten)]
    fields:       CaseFields,
  },
  Delete { label: String },
}

/// Optional free-text fields shared by `case add` and `case edit`.
#[derive(Args, Debug, Default)]
struct CaseFields {
  #[arg(long)]
  citation:  Option<String>,
  #[arg(long)]
  course:    Option<String>,
  #[arg(long)]
  facts:     Option<String>,
  #[arg(long)]
  procedure: Option<String>,
  #[arg(long)]
  issue:     Option<String>,
  #[arg(long)]
  holding:   Option<String>,
  #[arg(long)]
  principle: Option<String>,
  #[arg(long)]
  reasoning: Option<String>,
  #[arg(long)]
  notes:     Option<String>,
}

#[derive(Subcommand, Debug)]
enum LinkCmd {
  /// The subject may be given by id or name.
  Subject { label: String, subject: String },
  Opinion { label: String, id: i64 },
}

// ─── Argument conversion ──────────────────────────────────────────────────────

fn new_case(label: String, plaintiff: String, defendant: String, f: CaseFields) -> NewCase {
  NewCase {
    label,
    plaintiff,
    defendant,
    citation: f.citation.unwrap_or_default(),
    course: f.course,
    facts: f.facts.unwrap_or_default(),
    procedure: f.procedure.unwrap_or_default(),
    issue: f.issue.unwrap_or_default(),
    holding: f.holding.unwrap_or_default(),
    principle: f.principle.unwrap_or_default(),
    reasoning: f.reasoning.unwrap_or_default(),
    notes: f.notes.unwrap_or_default(),
  }
}

fn case_update(
  plaintiff: Option<String>,
  defendant: Option<String>,
  clear_course: bool,
  f: CaseFields,
) -> CaseUpdate {
  CaseUpdate {
    plaintiff,
    defendant,
    citation: f.citation,
    course: if clear_course { Some(None) } else { f.course.map(Some) },
    facts: f.facts,
    procedure: f.procedure,
    issue: f.issue,
    holding: f.holding,
    principle: f.principle,
    reasoning: f.reasoning,
    notes: f.notes,
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr so stdout stays clean for --json.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;
  let ctx = Ctx::open(settings).await.context("failed to start")?;

  let report = match cli.command {
    Command::Course(cmd) => match cmd {
      CourseCmd::Add { name } => commands::course_add(&ctx, &name).await,
      CourseCmd::List => commands::course_list(&ctx).await,
      CourseCmd::Remove { name } => commands::course_remove(&ctx, &name).await,
    },
    Command::Subject(cmd) => match cmd {
      SubjectCmd::Add { name } => commands::subject_add(&ctx, &name).await,
      SubjectCmd::List => commands::subject_list(&ctx).await,
      SubjectCmd::Remove { subject } => commands::subject_remove(&ctx, &subject).await,
    },
    Command::Opinion(cmd) => match cmd {
      OpinionCmd::Add { author, text } => commands::opinion_add(&ctx, &author, &text).await,
      OpinionCmd::List => commands::opinion_list(&ctx).await,
      OpinionCmd::Edit { id, author, text } => {
        commands::opinion_edit(&ctx, id, &author, &text).await
      }
      OpinionCmd::Remove { id } => commands::opinion_remove(&ctx, id).await,
    },
    Command::Case(cmd) => match cmd {
      CaseCmd::Add { label, plaintiff, defendant, fields } => {
        commands::case_add(&ctx, new_case(label, plaintiff, defendant, fields)).await
      }
      CaseCmd::Show { label } => commands::case_show(&ctx, &label).await,
      CaseCmd::List => commands::case_list(&ctx).await,
      CaseCmd::Edit { label, plaintiff, defendant, clear_course, fields } => {
        let update = case_update(plaintiff, defendant, clear_course, fields);
        commands::case_edit(&ctx, &label, update).await
      }
      CaseCmd::Delete { label } => commands::case_delete(&ctx, &label).await,
    },
    Command::Link(LinkCmd::Subject { label, subject }) => {
      commands::link_subject(&ctx, &label, &subject).await
    }
    Command::Link(LinkCmd::Opinion { label, id }) => {
      commands::link_opinion(&ctx, &label, id).await
    }
    Command::Unlink(LinkCmd::Subject { label, subject }) => {
      commands::unlink_subject(&ctx, &label, &subject).await
    }
    Command::Unlink(LinkCmd::Opinion { label, id }) => {
      commands::unlink_opinion(&ctx, &label, id).await
    }
    Command::Render { label } => commands::render(&ctx, &label).await,
    Command::RenderAll => commands::render_all(&ctx).await,
    Command::Compile { label } => commands::compile(&ctx, &label).await,
    Command::Import { file } => commands::import(&ctx, &file).await,
    Command::Export { file } => commands::export(&ctx, &file).await,
    Command::Restore { file } => commands::restore(&ctx, &file).await,
    Command::Backup => commands::backup(&ctx).await,
  }?;

  report.print(cli.json)
}

#[cfg(test)]
mod tests {
  use clap::CommandFactory;

  use super::*;

  #[test]
  fn cli_definition_is_valid() { Cli::command().debug_assert(); }

  #[test]
  fn edit_args_become_an_update() {
    let cli = Cli::try_parse_from([
      "casebriefs",
      "case",
      "edit",
      "Palsgraf-1928",
      "--defendant",
      "LIRR",
      "--clear-course",
      "--holding",
      "No duty.",
    ])
    .unwrap();

    let Command::Case(CaseCmd::Edit { label, plaintiff, defendant, clear_course, fields }) =
      cli.command
    else {
      panic!("expected case edit");
    };
    assert_eq!(label, "Palsgraf-1928");
    let update = case_update(plaintiff, defendant, clear_course, fields);
    assert_eq!(update, CaseUpdate {
      defendant: Some("LIRR".into()),
      course: Some(None),
      holding: Some("No duty.".into()),
      ..CaseUpdate::default()
    });
  }

  #[test]
  fn json_flag_is_global() {
    let cli = Cli::try_parse_from(["casebriefs", "case", "list", "--json"]).unwrap();
    assert!(cli.json);
  }
}
