//! LaTeX document → brief parsing, the inverse of [`crate::render_brief`].

use brief_core::{
  brief::{NewBrief, NewCase},
  catalog::NewOpinion,
  store::CitationIndex,
};
use regex::Regex;

use crate::{Error, Result, cite::Citations, escape::unescape};

/// `\NewBrief{...}` with its fourteen keys in render order. Whitespace between
/// keys is free so hand-edited files still parse.
const BRIEF_PATTERN: &str = r"(?s)\\NewBrief\{\s*subject=\{(.*?)\},\s*plaintiff=\{(.*?)\},\s*defendant=\{(.*?)\},\s*citation=\{(.*?)\},\s*course=\{(.*?)\},\s*facts=\{(.*?)\},\s*procedure=\{(.*?)\},\s*issue=\{(.*?)\},\s*holding=\{(.*?)\},\s*principle=\{(.*?)\},\s*reasoning=\{(.*?)\},\s*opinions=\{(.*?)\},\s*label=\{case:(.*?)\},\s*notes=\{(.*?)\}\s*\}\s*\\end\{document\}";

/// Parse a document produced by [`crate::render_brief`] back into a
/// [`NewBrief`]. Hyperrefs collapse to `CITE(label)` markers.
pub fn parse_brief(tex: &str) -> Result<NewBrief> {
  let pattern = Regex::new(BRIEF_PATTERN)?;
  let caps = pattern
    .captures(tex)
    .ok_or_else(|| Error::Parse("no \\NewBrief block with the expected keys".to_owned()))?;

  let empty = CitationIndex::new();
  let cites = Citations::new(&empty)?;
  let field = |i: usize| unescape(&cites.collapse(&caps[i]));

  let subjects = field(1)
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_owned)
    .collect();

  let opinions = field(12)
    .lines()
    .filter(|line| !line.trim().is_empty())
    .map(parse_opinion_line)
    .collect::<Result<Vec<_>>>()?;

  let course = field(5).trim().to_owned();
  let case = NewCase {
    label: caps[13].trim().to_owned(),
    plaintiff: field(2).trim().to_owned(),
    defendant: field(3).trim().to_owned(),
    citation: field(4),
    course: (!course.is_empty()).then_some(course),
    facts: field(6),
    procedure: field(7),
    issue: field(8),
    holding: field(9),
    principle: field(10),
    reasoning: field(11),
    notes: field(14),
  };

  Ok(NewBrief { case: case.normalized()?, subjects, opinions })
}

/// `"author: text"`; the author ends at the first colon.
fn parse_opinion_line(line: &str) -> Result<NewOpinion> {
  let (author, text) = line
    .split_once(':')
    .ok_or_else(|| Error::Parse(format!("opinion line without an author: {line:?}")))?;
  Ok(NewOpinion::new(author.trim(), text.trim()))
}
