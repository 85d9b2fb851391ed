//! Table of Contents Synthesis
//!
//! Scans the finished draft's `<h1>`/`<h2>` headings in document order,
//! gives each an anchor id when it lacks one, and prepends a styled linked
//! list. Running twice is a no-op: a document already carrying the TOC
//! container is returned unchanged.

use regex::{Captures, Regex};
use tracing::debug;

/// Class on the TOC container; doubles as the idempotence marker
pub const TOC_MARKER: &str = "loom-toc";

struct Heading {
    level: u8,
    anchor: String,
    text: String,
}

/// Prepend a linked table of contents to `document`
pub fn insert_toc(document: &str) -> String {
    if document.contains(TOC_MARKER) {
        debug!("Document already carries a TOC, skipping");
        return document.to_string();
    }

    let heading = Regex::new(r"(?s)<h([12])([^>]*)>(.*?)</h[12]>").expect("static pattern");
    let existing_id = Regex::new(r#"id\s*=\s*["']([^"']+)["']"#).expect("static pattern");
    let inner_tag = Regex::new(r"<[^>]+>").expect("static pattern");

    let mut headings: Vec<Heading> = Vec::new();
    let mut counter = 0usize;

    let anchored = heading.replace_all(document, |caps: &Captures<'_>| {
        let index = counter;
        counter += 1;
        let level: u8 = caps[1].parse().unwrap_or(2);
        let attrs = &caps[2];
        let body = &caps[3];
        let text = inner_tag.replace_all(body, "").trim().to_string();

        // Anchors count from zero in document order
        let (anchor, opening) = match existing_id.captures(attrs) {
            Some(id) => (id[1].to_string(), format!("<h{}{}>", level, attrs)),
            None => {
                let anchor = format!("section-{}", index);
                (
                    anchor.clone(),
                    format!("<h{} id=\"{}\"{}>", level, anchor, attrs),
                )
            }
        };

        if !text.is_empty() {
            headings.push(Heading {
                level,
                anchor: anchor.clone(),
                text,
            });
        }
        format!("{}{}</h{}>", opening, body, level)
    });

    if headings.is_empty() {
        return document.to_string();
    }
    debug!(headings = headings.len(), "TOC synthesized");

    format!("{}\n{}", render_toc(&headings), anchored)
}

fn render_toc(headings: &[Heading]) -> String {
    let mut toc = format!(
        "<div class=\"{}\" style=\"background: #f8f9fa; border: 1px solid #e9ecef; \
         border-radius: 8px; padding: 20px 25px; margin-bottom: 30px;\">\n\
         <p style=\"font-weight: bold; font-size: 1.1em; margin: 0 0 10px 0;\">\
         Table of Contents</p>\n\
         <ul style=\"list-style: none; margin: 0; padding: 0;\">\n",
        TOC_MARKER
    );
    for h in headings {
        let (indent, weight) = if h.level == 1 {
            ("0", "bold")
        } else {
            ("20px", "normal")
        };
        toc.push_str(&format!(
            "<li style=\"margin: 5px 0; padding-left: {indent};\">\
             <a href=\"#{anchor}\" style=\"text-decoration: none; color: #2c3e50; \
             font-weight: {weight};\">{text}</a></li>\n",
            anchor = h.anchor,
            text = h.text,
        ));
    }
    toc.push_str("</ul>\n</div>");
    toc
}
