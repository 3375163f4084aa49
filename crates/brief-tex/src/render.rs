//! Brief → LaTeX document rendering.

use brief_core::{brief::Brief, store::CitationIndex};

use crate::{Result, cite::Citations, escape::escape};

/// Master document every case subfile points back to, relative to the
/// cases directory.
pub const MASTER_DOCUMENT: &str = "../tex_src/CaseBriefs.tex";

/// Render one brief as a `subfiles` document wrapping a single `\NewBrief`.
///
/// Output depends only on the brief and the index: rendering the same inputs
/// twice yields identical text.
pub fn render_brief(brief: &Brief, index: &CitationIndex) -> Result<String> {
  let cites = Citations::new(index)?;
  let case = &brief.case;
  let text = |raw: &str| cites.expand(&escape(raw));

  let subjects = brief.subjects.iter().map(|s| s.name.as_str()).collect::<Vec<_>>().join(", ");
  let opinions = brief.opinions.iter().map(|o| o.line()).collect::<Vec<_>>().join("\n");

  let fields: [(&str, String); 14] = [
    ("subject", escape(&subjects)),
    ("plaintiff", escape(&case.plaintiff)),
    ("defendant", escape(&case.defendant)),
    ("citation", escape(&case.citation)),
    ("course", escape(case.course.as_deref().unwrap_or_default())),
    ("facts", text(&case.facts)),
    ("procedure", text(&case.procedure)),
    ("issue", text(&case.issue)),
    ("holding", text(&case.holding)),
    ("principle", text(&case.principle)),
    ("reasoning", text(&case.reasoning)),
    ("opinions", text(&opinions)),
    ("label", format!("case:{}", case.label)),
    ("notes", text(&case.notes)),
  ];

  let body = fields
    .iter()
    .map(|(key, value)| format!("{key}={{{value}}}"))
    .collect::<Vec<_>>()
    .join(",\n    ");

  Ok(format!(
    "\\documentclass[{MASTER_DOCUMENT}]{{subfiles}}\n\
     \\usepackage{{lawbrief}}\n\
     \\begin{{document}}\n\
     \\NewBrief{{{body}\n\
     }}\n\
     \\end{{document}}\n"
  ))
}

/// Render the master document that includes every case subfile, in label
/// order. `subfile_dir` is the cases directory as seen from the master.
pub fn render_master(briefs: &[Brief], subfile_dir: &str) -> String {
  let mut cases: Vec<_> = briefs.iter().map(|b| &b.case).collect();
  cases.sort_by(|a, b| a.label.cmp(&b.label));

  let subfile_dir = subfile_dir.trim_end_matches('/');
  let includes: String = cases
    .iter()
    .map(|case| format!("\\subfile{{{subfile_dir}/{}.tex}}\n", case.filename()))
    .collect();

  format!(
    "\\documentclass{{report}}\n\
     \\usepackage{{lawbrief}}\n\
     \\usepackage{{subfiles}}\n\
     \\usepackage{{hyperref}}\n\
     \\title{{Case Briefs}}\n\
     \\begin{{document}}\n\
     \\maketitle\n\
     \\tableofcontents\n\
     {includes}\
     \\end{{document}}\n"
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_helpers::palsgraf;

  fn index() -> CitationIndex {
    CitationIndex::from([("Hadley-1854".to_owned(), "Hadley v. Baxendale".to_owned())])
  }

  #[test]
  fn renders_subfile_with_every_key() {
    let tex = render_brief(&palsgraf(), &index()).unwrap();

    assert!(tex.starts_with("\\documentclass[../tex_src/CaseBriefs.tex]{subfiles}\n"));
    assert!(tex.contains("\\usepackage{lawbrief}\n\\begin{document}\n"));
    assert!(tex.contains("\\NewBrief{subject={Duty, Negligence},\n    plaintiff={Palsgraf},"));
    assert!(tex.contains("course={Torts}"));
    assert!(tex.contains("label={case:Palsgraf-1928}"));
    assert!(tex.contains("notes={Worth 100\\% of the exam.}\n}\n\\end{document}\n"));
    assert!(tex.contains("opinions={Andrews: Dissent.\\\\\nCardozo: Majority.}"));
    assert!(tex.contains(
      "reasoning={Compare \\hyperref[case:Hadley-1854]{\\textit{Hadley v.\\ Baxendale}} on \
       foreseeability.}"
    ));
  }

  #[test]
  fn rendering_is_deterministic() {
    let a = render_brief(&palsgraf(), &index()).unwrap();
    let b = render_brief(&palsgraf(), &index()).unwrap();
    assert_eq!(a, b);
  }

  #[test]
  fn missing_course_renders_empty() {
    let mut brief = palsgraf();
    brief.case.course = None;
    let tex = render_brief(&brief, &index()).unwrap();
    assert!(tex.contains("course={},"));
  }

  #[test]
  fn master_lists_cases_by_label() {
    let mut hadley = palsgraf();
    hadley.case.label = "Hadley-1854".into();
    hadley.case.plaintiff = "Hadley".into();
    hadley.case.defendant = "Baxendale".into();

    let master = render_master(&[palsgraf(), hadley], "../Cases/");
    let first = master.find("\\subfile{../Cases/Hadley_V_Baxendale.tex}").unwrap();
    let second = master.find("\\subfile{../Cases/Palsgraf_V_Long_Island_Railroad.tex}").unwrap();
    assert!(first < second);
    assert!(master.ends_with("\\end{document}\n"));
  }
}
