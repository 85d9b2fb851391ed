//! Document Finishing
//!
//! Stage 6: purely deterministic HTML transforms over the injected draft.
//! TOC synthesis runs before tooltip linking so entry text is extracted
//! from the plain headings, not from tooltip markup; both passes are
//! individually idempotent and individually optional.

mod glossary;
mod toc;

pub use glossary::{GlossaryEntry, link_tooltips, parse_glossary};
pub use toc::insert_toc;

/// Finisher configured from the pipeline flags
pub struct DocumentFinisher {
    toc: bool,
    tooltips: bool,
}

impl DocumentFinisher {
    pub fn new(toc: bool, tooltips: bool) -> Self {
        Self { toc, tooltips }
    }

    pub fn finish(&self, document: &str) -> String {
        let mut document = document.to_string();
        if self.toc {
            document = insert_toc(&document);
        }
        if self.tooltips {
            document = link_tooltips(&document);
        }
        document
    }
}
