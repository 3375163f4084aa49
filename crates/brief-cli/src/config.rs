//! Layered settings: built-in defaults, then an optional TOML file, then
//! `CASEBRIEFS_*` environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
  pub database_path:        PathBuf,
  pub cases_dir:            PathBuf,
  pub output_dir:           PathBuf,
  pub backup_dir:           PathBuf,
  pub tex_program:          PathBuf,
  /// Extra arguments passed to the TeX program before `--output-dir`.
  #[serde(default)]
  pub tex_args:             Vec<String>,
  /// Unset means compilation may run indefinitely.
  #[serde(default)]
  pub compile_timeout_secs: Option<u64>,
}

impl Settings {
  /// Load settings, reading `file` if it exists.
  pub fn load(file: &Path) -> anyhow::Result<Self> { Self::load_with(file, environment()) }

  fn load_with(file: &Path, env: config::Environment) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .set_default("database_path", "SQL/Cases.sqlite")?
      .set_default("cases_dir", "Cases")?
      .set_default("output_dir", "Cases/Output")?
      .set_default("backup_dir", "Backup")?
      .set_default("tex_program", "tinitex")?
      .add_source(config::File::from(file.to_path_buf()).required(false))
      .add_source(env)
      .build()
      .with_context(|| format!("failed to read config file {}", file.display()))?;

    let settings: Settings =
      settings.try_deserialize().context("failed to deserialise settings")?;
    Ok(settings.expanded())
  }

  /// Expand `~/` in every path.
  fn expanded(self) -> Self {
    Self {
      database_path: expand_tilde(&self.database_path),
      cases_dir: expand_tilde(&self.cases_dir),
      output_dir: expand_tilde(&self.output_dir),
      backup_dir: expand_tilde(&self.backup_dir),
      tex_program: expand_tilde(&self.tex_program),
      ..self
    }
  }

  /// The master document sits in `tex_src/` beside the cases directory.
  pub fn master_path(&self) -> PathBuf {
    self
      .cases_dir
      .parent()
      .unwrap_or_else(|| Path::new(""))
      .join("tex_src")
      .join("CaseBriefs.tex")
  }

  /// The cases directory as seen from the master document.
  pub fn subfile_dir(&self) -> String {
    match self.cases_dir.file_name() {
      Some(name) => format!("../{}", name.to_string_lossy()),
      None => self.cases_dir.display().to_string(),
    }
  }
}

/// `CASEBRIEFS_*` variables. `CASEBRIEFS_TEX_ARGS` is split on spaces.
fn environment() -> config::Environment {
  config::Environment::with_prefix("CASEBRIEFS")
    .try_parsing(true)
    .list_separator(" ")
    .with_list_parse_key("tex_args")
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_apply_without_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::load(&dir.path().join("missing.toml")).unwrap();
    assert_eq!(settings.database_path, PathBuf::from("SQL/Cases.sqlite"));
    assert_eq!(settings.cases_dir, PathBuf::from("Cases"));
    assert_eq!(settings.output_dir, PathBuf::from("Cases/Output"));
    assert_eq!(settings.backup_dir, PathBuf::from("Backup"));
    assert_eq!(settings.tex_program, PathBuf::from("tinitex"));
    assert!(settings.tex_args.is_empty());
    assert_eq!(settings.compile_timeout_secs, None);
  }

  #[test]
  fn file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("casebriefs.toml");
    std::fs::write(
      &file,
      "cases_dir = \"/srv/briefs/Cases\"\n\
       tex_program = \"latexmk\"\n\
       tex_args = [\"-pdf\"]\n\
       compile_timeout_secs = 30\n",
    )
    .unwrap();

    let settings = Settings::load(&file).unwrap();
    assert_eq!(settings.cases_dir, PathBuf::from("/srv/briefs/Cases"));
    assert_eq!(settings.tex_program, PathBuf::from("latexmk"));
    assert_eq!(settings.tex_args, ["-pdf"]);
    assert_eq!(settings.compile_timeout_secs, Some(30));
    assert_eq!(settings.backup_dir, PathBuf::from("Backup"));
  }

  #[test]
  fn environment_overrides_file_and_splits_tex_args() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("casebriefs.toml");
    std::fs::write(&file, "tex_program = \"latexmk\"\ncompile_timeout_secs = 30\n").unwrap();

    let vars = config::Map::from([
      ("CASEBRIEFS_TEX_ARGS".to_owned(), "-pdf -interaction=nonstopmode".to_owned()),
      ("CASEBRIEFS_COMPILE_TIMEOUT_SECS".to_owned(), "90".to_owned()),
    ]);
    let settings = Settings::load_with(&file, environment().source(Some(vars))).unwrap();
    assert_eq!(settings.tex_program, PathBuf::from("latexmk"));
    assert_eq!(settings.tex_args, ["-pdf", "-interaction=nonstopmode"]);
    assert_eq!(settings.compile_timeout_secs, Some(90));
  }

  #[test]
  fn master_sits_beside_cases() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = Settings::load(&dir.path().join("none.toml")).unwrap();
    assert_eq!(settings.master_path(), PathBuf::from("tex_src/CaseBriefs.tex"));
    assert_eq!(settings.subfile_dir(), "../Cases");

    settings.cases_dir = PathBuf::from("/srv/law/Briefs");
    assert_eq!(settings.master_path(), PathBuf::from("/srv/law/tex_src/CaseBriefs.tex"));
    assert_eq!(settings.subfile_dir(), "../Briefs");
  }

  #[test]
  fn tilde_is_expanded() {
    let Ok(home) = std::env::var("HOME") else {
      return;
    };
    assert_eq!(expand_tilde(Path::new("~/Cases")), PathBuf::from(home).join("Cases"));
    assert_eq!(expand_tilde(Path::new("/abs/Cases")), PathBuf::from("/abs/Cases"));
  }
}
