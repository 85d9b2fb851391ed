//! Authoring Prompts
//!
//! Prompt construction for the multi-stage drafting protocol. The section
//! prompt embeds the literal heading skeleton and placeholder tokens the
//! draft must reproduce, so downstream transforms can rely on the structure.

use crate::constants::compose::GLOSSARY_MARKER;
use crate::types::CandidateItem;

/// Persona and tone rules shared by every section call
fn tone_rules() -> &'static str {
    "[Tone and persona rules]\n\
     1. Persona: a practitioner with ten-plus years in the field, sharing how \
     things actually play out rather than textbook summaries.\n\
     2. Style: clean, readable sentences with a confident, professional voice, \
     as if passing insider context to a colleague.\n\
     3. Opinionated analysis: go beyond reporting facts; state clearly which \
     company or technology holds the better position and why.\n\
     4. Avoid stock filler phrases such as 'in conclusion', 'let us explore', \
     or 'in this article'; connect paragraphs naturally."
}

/// The fixed ordered H2 skeleton every topic section must contain
fn structure_rules() -> &'static str {
    "Each topic must include exactly these seven H2 sections in order:\n\
     1. <h2>1. The Context</h2> : a non-obvious three-line summary list (<ul>).\n\
     2. <h2>2. Comparative Analysis</h2> : how this differs from prior \
     comparable technology or products, in the editor's view.\n\
     3. <h2>3. Technical Mechanism</h2> : must contain at least one <table>; \
     explain with accessible analogies.\n\
     4. <h2>4. Market Dynamics</h2> : concrete, opinionated analysis of which \
     players gain or lose and why.\n\
     5. <h2>5. Risk Factors</h2> : the real obstacles (regulation, \
     competition, technical barriers) from a practitioner's viewpoint.\n\
     6. <h2>6. Outlook and Impact</h2> : paint the plausible near future this \
     change produces.\n\
     7. <h2>7. Editorial Insight</h2> : a subjective, actionable closing take \
     on what to watch next."
}

fn markup_rules() -> &'static str {
    "Wrap difficult technical terms in <u> tags. Bold the key sentence and \
     main keywords of each paragraph with <b> tags."
}

/// Phase 1: short outline spanning all selected topics
pub fn outline(topics: &[CandidateItem], category_label: &str) -> String {
    let listing = topics
        .iter()
        .enumerate()
        .map(|(i, t)| format!("Topic {}: {}", i + 1, t.title))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "{listing}\n\nWrite a short outline for a '{category_label} deep-dive' \
         article covering the topics above."
    )
}

/// Phase 2..n: one topic section, continuing the accumulated draft.
///
/// `placeholder_base` is the number of the first of the three image
/// placeholders this section embeds.
pub struct SectionArgs<'a> {
    pub category_label: &'a str,
    pub outline: &'a str,
    pub topic: &'a CandidateItem,
    pub display_title: &'a str,
    pub prior_text: &'a str,
    pub placeholder_base: usize,
    pub is_last: bool,
}

pub fn section(args: &SectionArgs<'_>) -> String {
    let SectionArgs {
        category_label,
        outline,
        topic,
        display_title,
        prior_text,
        placeholder_base,
        is_last,
    } = args;

    let mut prompt = String::new();

    if prior_text.is_empty() {
        prompt.push_str(&format!(
            "Role: {category_label} industry practitioner and analyst.\n\
             Outline: {outline}\n"
        ));
    } else {
        prompt.push_str(&format!("Preceding text: {prior_text}\n"));
    }

    prompt.push_str(&format!(
        "Topic: {} / Source text: {}\n{}\n{}\n",
        topic.title,
        topic.body_excerpt,
        tone_rules(),
        markup_rules()
    ));

    if prior_text.is_empty() {
        prompt.push_str("[Instructions] Output HTML tags only.\n");
    } else {
        prompt.push_str(
            "[Instructions] Continue naturally from the preceding text. \
             Output HTML tags only.\n\
             <br><hr style=\"border: 0; height: 1px; background: #ddd; margin: 40px 0;\"><br>\n",
        );
    }

    prompt.push_str(&format!(
        "<h1>[{category_label} Deep-Dive] {display_title}</h1>\n\
         [IMAGE_PLACEHOLDER_{p1}]\n\
         {structure}\n\
         [IMAGE_PLACEHOLDER_{p2}]\n\
         <br>\n\
         [IMAGE_PLACEHOLDER_{p3}]\n",
        p1 = placeholder_base,
        p2 = placeholder_base + 1,
        p3 = placeholder_base + 2,
        structure = structure_rules(),
    ));

    if *is_last {
        prompt.push_str(&format!(
            "<br><hr style=\"border: 0; height: 2px; background: #2c3e50; margin: 50px 0;\"><br>\n\
             <h2>The Bridge: what these stories mean together</h2>\n\
             <h2>{GLOSSARY_MARKER}</h2>\n\
             (list each <u>-marked term as <li>term: one-line definition</li>)\n\
             <h2>SEO and Tags</h2>\n\
             <hr style=\"border: 0; height: 1px; background: #eee; margin: 40px 0;\">\n\
             <p style=\"color:grey; font-size: 0.9em; text-align: center;\">\
             * This content is for information only; investment decisions are \
             the reader's responsibility.</p>\n"
        ));
        prompt.push_str("Write this topic's section and the closing blocks.");
    } else {
        prompt.push_str("Write this topic's section only.");
    }

    prompt
}

/// One-line display-title synthesis for a topic
pub fn display_title(raw_title: &str) -> String {
    format!(
        "Rewrite the following news headline as a single clean, curiosity-\
         sparking blog title.\n\n\
         [Rules]\n\
         1. One line, at most 60 characters.\n\
         2. No clickbait markers, brackets, or excess punctuation; keep it \
         professional and current.\n\
         3. Output only the title itself, nothing else.\n\n\
         Headline: {raw_title}"
    )
}

/// Unified delivery-subject synthesis across the per-topic titles
pub fn unified_subject(category_label: &str, titles: &[String]) -> String {
    let listing = titles
        .iter()
        .enumerate()
        .map(|(i, t)| format!("Topic {}: {}", i + 1, t))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Write one unified email subject line that spans the topics below.\n\n\
         [Rules]\n\
         1. One concise line, at most 70 characters.\n\
         2. Blend the topics into a single natural phrase; no '&' glue.\n\
         3. Output only the subject itself, nothing else.\n\n\
         Category: {category_label}\n{listing}"
    )
}
