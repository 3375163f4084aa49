//! LaTeX escaping for free text.

/// Characters with a LaTeX meaning and the text that typesets them
/// literally.
const SPECIALS: &[(char, &str)] = &[
  ('{', r"\{"),
  ('}', r"\}"),
  ('$', r"\$"),
  ('%', r"\%"),
  ('#', r"\#"),
  ('_', r"\_"),
  ('~', r"\textasciitilde{}"),
  ('^', r"\textasciicircum{}"),
  ('&', r"\&"),
  // Last, so unescaping sees every other token before this one.
  ('\\', r"\textbackslash{}"),
];

const LINE_BREAK: &str = "\\\\\n";
const ELLIPSIS: &str = r"\ldots{}";
const SENTENCE_END: &str = r".\ ";

/// Escape `text` for use inside a LaTeX argument.
///
/// Newlines become forced line breaks, `...` becomes `\ldots{}` and a full stop
/// followed by a space gets an explicit inter-word space so LaTeX does not
/// treat abbreviations as sentence ends.
pub fn escape(text: &str) -> String {
  let mut out = String::with_capacity(text.len() + text.len() / 8);
  for ch in text.chars() {
    match SPECIALS.iter().find(|(c, _)| *c == ch) {
      Some((_, replacement)) => out.push_str(replacement),
      None if ch == '\n' => out.push_str(LINE_BREAK),
      None => out.push(ch),
    }
  }
  // Ellipses first, so "... " never becomes "..\ ".
  out.replace("...", ELLIPSIS).replace(". ", SENTENCE_END)
}

/// Inverse of [`escape`] for text it produced.
pub fn unescape(text: &str) -> String {
  let mut out = text
    .replace(SENTENCE_END, ". ")
    .replace(ELLIPSIS, "...")
    .replace(LINE_BREAK, "\n");
  for (ch, replacement) in SPECIALS {
    out = out.replace(replacement, &ch.to_string());
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn escapes_every_special() {
    assert_eq!(
      escape("{}$%#_~^&"),
      r"\{\}\$\%\#\_\textasciitilde{}\textasciicircum{}\&"
    );
  }

  #[test]
  fn newlines_become_line_breaks() {
    assert_eq!(escape("one\ntwo"), "one\\\\\ntwo");
  }

  #[test]
  fn ellipsis_and_sentence_spacing() {
    assert_eq!(escape("Wait... then go. Now"), r"Wait\ldots{} then go.\ Now");
    assert_eq!(escape("e.g. this"), r"e.g.\ this");
  }

  #[test]
  fn ellipsis_before_a_letter_stays_a_complete_command() {
    assert_eq!(escape("and...then"), r"and\ldots{}then");
    assert_eq!(unescape(r"and\ldots{}then"), "and...then");
  }

  #[test]
  fn backslashes_are_typeset_literally() {
    assert_eq!(escape(r"C:\dir"), r"C:\textbackslash{}dir");
    assert_eq!(escape(r"\ldots{}"), r"\textbackslash{}ldots\{\}");
  }

  #[test]
  fn plain_text_is_untouched() {
    assert_eq!(escape("Palsgraf v. Long Island Railroad"), r"Palsgraf v.\ Long Island Railroad");
    assert_eq!(escape("no specials here"), "no specials here");
  }

  #[test]
  fn unescape_inverts_escape() {
    for text in [
      "Damages of $500 & 10% interest",
      "snake_case ~ tilde ^ caret {braces}",
      "First line.\nSecond line... and more. Done.",
      "#1 on the list",
      r"C:\dir\{x\} and \ldots{}",
      r"trailing \",
      "",
    ] {
      assert_eq!(unescape(&escape(text)), text, "text: {text:?}");
    }
  }
}
