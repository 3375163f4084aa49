//! LaTeX document pipeline for case briefs.
//!
//! Converts between [`brief_core`] briefs and `\NewBrief` documents, and
//! drives the external TeX program that turns them into PDFs. Rendering and
//! parsing are pure; only [`Compiler`] touches the filesystem or spawns
//! processes.
//!
//! # Quick start
//!
//! ```no_run
//! use brief_core::store::CitationIndex;
//! use brief_tex::{parse_brief, render_brief};
//!
//! # fn demo(brief: brief_core::brief::Brief) -> brief_tex::Result<()> {
//! let tex = render_brief(&brief, &CitationIndex::new())?;
//! let round_tripped = parse_brief(&tex)?;
//! assert_eq!(round_tripped.case.label, brief.case.label);
//! # Ok(())
//! # }
//! ```

mod cite;
mod compile;
pub mod error;
mod escape;
mod parse;
mod render;

pub use cite::Citations;
pub use compile::{AUX_EXTENSIONS, Compiler, remove_aux_files};
pub use error::{Error, Result};
pub use escape::{escape, unescape};
pub use parse::parse_brief;
pub use render::{MASTER_DOCUMENT, render_brief, render_master};

// ─── Shared test helpers ──────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod test_helpers {
  use brief_core::{
    brief::{Brief, Case},
    catalog::{Opinion, Subject},
  };

  /// The Palsgraf brief with subjects and opinions already in view order.
  pub(crate) fn palsgraf() -> Brief {
    Brief {
      case:     Case {
        label:     "Palsgraf-1928".into(),
        plaintiff: "Palsgraf".into(),
        defendant: "Long Island Railroad".into(),
        title:     "Palsgraf v. Long Island Railroad".into(),
        citation:  "248 N.Y. 339 (1928)".into(),
        course:    Some("Torts".into()),
        facts:     "A guard pushed a passenger; a package of fireworks fell.".into(),
        procedure: "Appeal from the Appellate Division.".into(),
        issue:     "Is a duty owed to an unforeseeable plaintiff?".into(),
        holding:   "No.".into(),
        principle: "Duty is limited to the zone of danger.".into(),
        reasoning: "Compare CITE(Hadley-1854) on foreseeability.".into(),
        notes:     "Worth 100% of the exam.".into(),
      },
      subjects: vec![
        Subject { id: 2, name: "Duty".into() },
        Subject { id: 1, name: "Negligence".into() },
      ],
      opinions: vec![
        Opinion { id: 2, author: "Andrews".into(), text: "Dissent.".into() },
        Opinion { id: 1, author: "Cardozo".into(), text: "Majority.".into() },
      ],
    }
  }
}
