//! Out-of-process PDF compilation.

use std::{
  path::{Path, PathBuf},
  process::Stdio,
  time::Duration,
};

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::{Error, Result};

/// Extensions of LaTeX by-products removed after a successful run.
pub const AUX_EXTENSIONS: &[&str] = &[
  "aux",
  "fdb_latexmk",
  "fls",
  "idx",
  "ilg",
  "ind",
  "log",
  "out",
  "synctex.gz",
  "synctex(busy)",
  "toc",
];

/// Runs a TeX program over `.tex` files in the cases directory.
///
/// The program is invoked as
/// `<program> [args...] --output-dir=<output dir> <file.tex>` with the cases
/// directory as its working directory.
#[derive(Debug, Clone)]
pub struct Compiler {
  program:    PathBuf,
  args:       Vec<String>,
  cases_dir:  PathBuf,
  output_dir: PathBuf,
  timeout:    Option<Duration>,
}

impl Compiler {
  pub fn new(
    program: impl Into<PathBuf>,
    cases_dir: impl Into<PathBuf>,
    output_dir: impl Into<PathBuf>,
  ) -> Self {
    Self {
      program:    program.into(),
      args:       Vec::new(),
      cases_dir:  cases_dir.into(),
      output_dir: output_dir.into(),
      timeout:    None,
    }
  }

  /// Extra arguments placed before `--output-dir`.
  pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
    self.args = args.into_iter().map(Into::into).collect();
    self
  }

  /// Kill the program and fail if it runs longer than `timeout`.
  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = Some(timeout);
    self
  }

  pub fn cases_dir(&self) -> &Path { &self.cases_dir }

  /// Where the PDF for `tex_file` is expected to appear.
  pub fn pdf_path(&self, tex_file: &Path) -> PathBuf {
    // Stems may contain dots ("Co._V_Jones"), so append rather than
    // with_extension.
    let mut name = tex_file.file_stem().unwrap_or_default().to_os_string();
    name.push(".pdf");
    self.output_dir.join(name)
  }

  /// Compile `tex_file` and return the path of the produced PDF.
  ///
  /// Blocks the calling task until the program exits. A stale PDF from an
  /// earlier run is removed first so success always means a fresh file.
  pub async fn compile(&self, tex_file: &Path) -> Result<PathBuf> {
    tokio::fs::metadata(tex_file).await?;
    tokio::fs::create_dir_all(&self.output_dir).await?;

    let pdf = self.pdf_path(tex_file);
    match tokio::fs::remove_file(&pdf).await {
      Ok(()) => debug!(pdf = %pdf.display(), "removed stale pdf"),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
      Err(e) => return Err(e.into()),
    }

    let output_arg = relative_to(&self.output_dir, &self.cases_dir)?;
    let tex_arg = relative_to(tex_file, &self.cases_dir)?;
    let program = self.program.display().to_string();

    let mut cmd = Command::new(&self.program);
    cmd
      .args(&self.args)
      .arg(format!("--output-dir={}", output_arg.display()))
      .arg(&tex_arg)
      .current_dir(&self.cases_dir)
      .stdin(Stdio::null())
      .kill_on_drop(true);

    debug!(program = %program, tex = %tex_arg.display(), "running tex program");
    let run = cmd.output();
    let output = match self.timeout {
      Some(limit) => tokio::time::timeout(limit, run)
        .await
        .map_err(|_| Error::Timeout { program: program.clone(), after: limit })?,
      None => run.await,
    }
    .map_err(|e| match e.kind() {
      std::io::ErrorKind::NotFound => Error::ProgramNotFound(program.clone()),
      _ => Error::Io(e),
    })?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
      warn!(program = %program, status = %output.status, "tex program failed");
      return Err(Error::Compile { program, status: output.status, stderr });
    }

    if !tokio::fs::try_exists(&pdf).await? {
      return Err(Error::MissingOutput(pdf));
    }

    let cases_dir = self.cases_dir.clone();
    let removed = tokio::task::spawn_blocking(move || remove_aux_files(&cases_dir))
      .await
      .map_err(std::io::Error::other)??;
    info!(pdf = %pdf.display(), aux_removed = removed, "compiled");
    Ok(pdf)
  }
}

/// `path` relative to `base` when it lies beneath it, otherwise absolute.
fn relative_to(path: &Path, base: &Path) -> std::io::Result<PathBuf> {
  match path.strip_prefix(base) {
    Ok(rel) if rel.as_os_str().is_empty() => Ok(PathBuf::from(".")),
    Ok(rel) => Ok(rel.to_path_buf()),
    Err(_) => std::path::absolute(path),
  }
}

/// Recursively delete LaTeX by-products under `dir`. Returns how many files
/// were removed.
pub fn remove_aux_files(dir: &Path) -> std::io::Result<usize> {
  let mut removed = 0;
  for entry in std::fs::read_dir(dir)? {
    let entry = entry?;
    let path = entry.path();
    let file_type = entry.file_type()?;
    if file_type.is_dir() {
      removed += remove_aux_files(&path)?;
    } else if file_type.is_file() && is_aux_file(&path) {
      std::fs::remove_file(&path)?;
      debug!(path = %path.display(), "removed aux file");
      removed += 1;
    }
  }
  Ok(removed)
}

fn is_aux_file(path: &Path) -> bool {
  let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
    return false;
  };
  AUX_EXTENSIONS.iter().any(|ext| name.ends_with(&format!(".{ext}")))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn aux_detection() {
    assert!(is_aux_file(Path::new("x/Palsgraf.aux")));
    assert!(is_aux_file(Path::new("Palsgraf.synctex.gz")));
    assert!(!is_aux_file(Path::new("Palsgraf.tex")));
    assert!(!is_aux_file(Path::new("Palsgraf.pdf")));
    assert!(!is_aux_file(Path::new("layout")));
  }

  #[test]
  fn output_dir_is_relative_to_cases_dir() {
    let rel = relative_to(Path::new("Cases/Output"), Path::new("Cases")).unwrap();
    assert_eq!(rel, PathBuf::from("Output"));
    let same = relative_to(Path::new("Cases"), Path::new("Cases")).unwrap();
    assert_eq!(same, PathBuf::from("."));
  }

  #[test]
  fn pdf_lands_in_output_dir() {
    let compiler = Compiler::new("tinitex", "Cases", "Cases/Output");
    assert_eq!(
      compiler.pdf_path(Path::new("Cases/Palsgraf_V_LIRR.tex")),
      PathBuf::from("Cases/Output/Palsgraf_V_LIRR.pdf")
    );
  }

  #[test]
  fn remove_aux_files_recurses() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("Output");
    std::fs::create_dir(&nested).unwrap();
    for name in ["a.aux", "a.tex", "a.log"] {
      std::fs::write(dir.path().join(name), "").unwrap();
    }
    for name in ["a.pdf", "a.toc", "a.fdb_latexmk"] {
      std::fs::write(nested.join(name), "").unwrap();
    }

    assert_eq!(remove_aux_files(dir.path()).unwrap(), 4);
    assert!(dir.path().join("a.tex").exists());
    assert!(nested.join("a.pdf").exists());
    assert!(!nested.join("a.toc").exists());
  }

  // ── Running programs ──────────────────────────────────────────────────────

  #[cfg(unix)]
  mod unix {
    use super::*;

    struct Fixture {
      dir:      tempfile::TempDir,
      cases:    PathBuf,
      output:   PathBuf,
      tex_file: PathBuf,
    }

    fn fixture() -> Fixture {
      let dir = tempfile::tempdir().unwrap();
      let cases = dir.path().join("Cases");
      let output = cases.join("Output");
      std::fs::create_dir_all(&cases).unwrap();
      let tex_file = cases.join("Palsgraf_V_LIRR.tex");
      std::fs::write(&tex_file, "\\NewBrief{}").unwrap();
      Fixture { dir, cases, output, tex_file }
    }

    #[tokio::test]
    async fn failing_program_reports_stderr() {
      let f = fixture();
      let compiler = Compiler::new("sh", &f.cases, &f.output)
        .with_args(["-c", "echo 'Undefined control sequence' >&2; exit 1", "sh"]);
      let err = compiler.compile(&f.tex_file).await.unwrap_err();
      match err {
        Error::Compile { stderr, status, .. } => {
          assert_eq!(stderr, "Undefined control sequence");
          assert_eq!(status.code(), Some(1));
        }
        other => panic!("unexpected error: {other}"),
      }
    }

    #[tokio::test]
    async fn missing_program_is_not_found() {
      let f = fixture();
      let compiler = Compiler::new(f.dir.path().join("no-such-tex"), &f.cases, &f.output);
      let err = compiler.compile(&f.tex_file).await.unwrap_err();
      assert!(matches!(err, Error::ProgramNotFound(_)));
    }

    #[tokio::test]
    async fn success_without_pdf_is_missing_output() {
      let f = fixture();
      let compiler = Compiler::new("true", &f.cases, &f.output);
      let err = compiler.compile(&f.tex_file).await.unwrap_err();
      assert!(matches!(err, Error::MissingOutput(_)));
    }

    #[tokio::test]
    async fn slow_program_times_out() {
      let f = fixture();
      let compiler = Compiler::new("sh", &f.cases, &f.output)
        .with_args(["-c", "sleep 5", "sh"])
        .with_timeout(Duration::from_millis(200));
      let err = compiler.compile(&f.tex_file).await.unwrap_err();
      assert!(matches!(err, Error::Timeout { .. }));
    }

    #[tokio::test]
    async fn successful_run_returns_pdf_and_cleans_up() {
      let f = fixture();
      // Mimic a TeX engine: write the PDF plus by-products into the output
      // directory named by the first positional argument.
      let script = r#"out="${1#--output-dir=}"; name=$(basename "$2" .tex); mkdir -p "$out"; touch "$out/$name.pdf" "$out/$name.aux" "$out/$name.log""#;
      let compiler =
        Compiler::new("sh", &f.cases, &f.output).with_args(["-c", script, "sh"]);

      let pdf = compiler.compile(&f.tex_file).await.unwrap();
      assert_eq!(pdf, f.output.join("Palsgraf_V_LIRR.pdf"));
      assert!(pdf.exists());
      assert!(!f.output.join("Palsgraf_V_LIRR.aux").exists());
      assert!(!f.output.join("Palsgraf_V_LIRR.log").exists());
      assert!(f.tex_file.exists());
    }
  }
}
