//! `CITE(label)` markers in free text and the hyperrefs they expand to.

use brief_core::store::CitationIndex;
use regex::{Captures, Regex};

use crate::{
  Result,
  escape::{escape, unescape},
};

const CITE_PATTERN: &str = r"CITE\((.*?)\)";
const HYPERREF_PATTERN: &str = r"\\hyperref\[case:(.*?)\]\{\\textit\{(.*?)\}\}";

/// Expands and collapses citation markers.
///
/// Expansion runs on already-escaped text, so labels are unescaped before
/// the index lookup and titles are escaped on the way out.
pub struct Citations<'a> {
  index:    &'a CitationIndex,
  cite:     Regex,
  hyperref: Regex,
}

impl<'a> Citations<'a> {
  pub fn new(index: &'a CitationIndex) -> Result<Self> {
    Ok(Self { index, cite: Regex::new(CITE_PATTERN)?, hyperref: Regex::new(HYPERREF_PATTERN)? })
  }

  /// The hyperref for `label`, or `None` if no case has that label.
  pub fn link(&self, label: &str) -> Option<String> {
    self
      .index
      .get(label)
      .map(|title| format!(r"\hyperref[case:{label}]{{\textit{{{}}}}}", escape(title)))
  }

  /// Replace every resolvable `CITE(label)` with its hyperref. Unknown
  /// labels are left as written.
  pub fn expand(&self, escaped: &str) -> String {
    self
      .cite
      .replace_all(escaped, |caps: &Captures<'_>| {
        let label = unescape(&caps[1]);
        self.link(&label).unwrap_or_else(|| caps[0].to_owned())
      })
      .into_owned()
  }

  /// Turn hyperrefs back into `CITE(label)` markers.
  pub fn collapse(&self, tex: &str) -> String {
    self.hyperref.replace_all(tex, "CITE($1)").into_owned()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn index() -> CitationIndex {
    CitationIndex::from([
      ("Palsgraf-1928".to_owned(), "Palsgraf v. Long Island Railroad".to_owned()),
      ("smith_co".to_owned(), "Smith & Co. v. Jones".to_owned()),
    ])
  }

  #[test]
  fn expands_known_labels() {
    let index = index();
    let cites = Citations::new(&index).unwrap();
    assert_eq!(
      cites.expand("See CITE(Palsgraf-1928)"),
      r"See \hyperref[case:Palsgraf-1928]{\textit{Palsgraf v.\ Long Island Railroad}}"
    );
  }

  #[test]
  fn unknown_labels_stay_verbatim() {
    let index = index();
    let cites = Citations::new(&index).unwrap();
    assert_eq!(cites.expand("Compare CITE(Nobody-1900)."), "Compare CITE(Nobody-1900).");
  }

  #[test]
  fn escaped_labels_resolve() {
    let index = index();
    let cites = Citations::new(&index).unwrap();
    let text = escape("Under CITE(smith_co), yes");
    assert_eq!(
      cites.expand(&text),
      r"Under \hyperref[case:smith_co]{\textit{Smith \& Co.\ v.\ Jones}}, yes"
    );
  }

  #[test]
  fn collapse_restores_markers() {
    let index = index();
    let cites = Citations::new(&index).unwrap();
    let expanded = cites.expand("CITE(Palsgraf-1928) and CITE(smith_co)");
    assert_eq!(cites.collapse(&expanded), "CITE(Palsgraf-1928) and CITE(smith_co)");
  }
}
