//! Glossary Tooltip Linking
//!
//! Parses the draft's glossary section into term/definition pairs and turns
//! every matching `<u>`-marked span in the body into a hover tooltip. The
//! match is a case-insensitive substring test in both directions, so
//! "transformer models" links against a glossary entry for "Transformer".
//! Spans without a matching entry are left exactly as written.

use regex::{Captures, Regex};
use tracing::debug;

use crate::constants::compose::GLOSSARY_MARKER;

/// Class on the injected style block; doubles as the idempotence marker
pub const TOOLTIP_MARKER: &str = "loom-tooltip";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlossaryEntry {
    pub term: String,
    pub definition: String,
}

/// Link underlined terms to their glossary definitions
pub fn link_tooltips(document: &str) -> String {
    if document.contains(TOOLTIP_MARKER) {
        debug!("Document already carries tooltips, skipping");
        return document.to_string();
    }

    let entries = parse_glossary(document);
    if entries.is_empty() {
        debug!("No usable glossary entries, skipping tooltip pass");
        return document.to_string();
    }
    debug!(entries = entries.len(), "Linking glossary tooltips");

    let underline = Regex::new(r"(?s)<u>(.*?)</u>").expect("static pattern");
    let linked = underline.replace_all(document, |caps: &Captures<'_>| {
        let span = &caps[1];
        match lookup(&entries, span) {
            Some(entry) => tooltip_span(span, &entry.definition),
            None => caps[0].to_string(),
        }
    });

    format!("{}\n{}", tooltip_style(), linked)
}

/// Extract term/definition pairs from the glossary list.
///
/// Entries split on the first `:`, falling back to the first `-`; items
/// with neither delimiter are skipped.
pub fn parse_glossary(document: &str) -> Vec<GlossaryEntry> {
    let heading = Regex::new(r"(?s)<h2[^>]*>(.*?)</h2>").expect("static pattern");
    let item = Regex::new(r"(?s)<li[^>]*>(.*?)</li>").expect("static pattern");
    let inner_tag = Regex::new(r"<[^>]+>").expect("static pattern");

    // Section text runs from the glossary heading to the next h2 or EOF
    let mut section: Option<&str> = None;
    for caps in heading.captures_iter(document) {
        let text = inner_tag.replace_all(&caps[1], "");
        if text.contains(GLOSSARY_MARKER) {
            let after = caps.get(0).map(|m| m.end()).unwrap_or(0);
            let rest = &document[after..];
            let end = rest.find("<h2").unwrap_or(rest.len());
            section = Some(&rest[..end]);
            break;
        }
    }
    let Some(section) = section else {
        return Vec::new();
    };

    item.captures_iter(section)
        .filter_map(|caps| {
            let text = inner_tag.replace_all(&caps[1], "").trim().to_string();
            let split_at = text.find(':').or_else(|| text.find('-'))?;
            let term = text[..split_at].trim();
            let definition = text[split_at + 1..].trim();
            if term.is_empty() || definition.is_empty() {
                return None;
            }
            Some(GlossaryEntry {
                term: term.to_string(),
                definition: definition.to_string(),
            })
        })
        .collect()
}

/// First entry matching the span, case-insensitive, either direction
fn lookup<'a>(entries: &'a [GlossaryEntry], span: &str) -> Option<&'a GlossaryEntry> {
    let span = span.trim().to_lowercase();
    if span.is_empty() {
        return None;
    }
    entries.iter().find(|e| {
        let term = e.term.to_lowercase();
        span.contains(&term) || term.contains(&span)
    })
}

fn tooltip_span(text: &str, definition: &str) -> String {
    format!(
        "<span class=\"{marker}\">{text}\
         <span class=\"{marker}-text\">{definition}</span></span>",
        marker = TOOLTIP_MARKER,
    )
}

fn tooltip_style() -> String {
    format!(
        "<style>\n\
         .{m} {{ position: relative; border-bottom: 2px dotted #2c3e50; \
         cursor: help; font-weight: bold; }}\n\
         .{m} .{m}-text {{ visibility: hidden; width: 260px; \
         background-color: #2c3e50; color: #fff; text-align: left; \
         border-radius: 6px; padding: 8px 12px; position: absolute; \
         z-index: 1; bottom: 125%; left: 50%; margin-left: -130px; \
         opacity: 0; transition: opacity 0.3s; font-size: 0.85em; \
         font-weight: normal; line-height: 1.5; }}\n\
         .{m}:hover .{m}-text {{ visibility: visible; opacity: 1; }}\n\
         </style>",
        m = TOOLTIP_MARKER,
    )
}
