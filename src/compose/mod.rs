//! Draft Composition
//!
//! Stage 4: the multi-stage authoring protocol. One outline call spanning
//! all selected topics, then one section call per topic in selection order,
//! each receiving the accumulated prior text so continuity flows forward.
//! Drafting is strictly sequential; stage n+1 depends on stage n's literal
//! output, so there is no parallelism and no internal retry. A generation
//! failure propagates and the partial draft is discarded by the caller.

mod prompts;

use tracing::{debug, info, warn};

use crate::ai::{TextGenerator, strip_code_fences};
use crate::constants::compose::PLACEHOLDERS_PER_TOPIC;
use crate::types::{CandidateItem, Result};

/// Composer over the generative collaborator
pub struct DraftComposer<'a> {
    generator: &'a dyn TextGenerator,
}

impl<'a> DraftComposer<'a> {
    pub fn new(generator: &'a dyn TextGenerator) -> Self {
        Self { generator }
    }

    /// Run the full authoring protocol for one category's topics.
    ///
    /// `display_titles` pairs with `topics` by index. Returns the raw HTML
    /// draft with embedded image placeholders.
    pub async fn compose(
        &self,
        topics: &[CandidateItem],
        display_titles: &[String],
        category_label: &str,
    ) -> Result<String> {
        info!(
            category = category_label,
            topics = topics.len(),
            "Drafting with {}",
            self.generator.name()
        );

        let outline = self
            .generator
            .generate(&prompts::outline(topics, category_label))
            .await?;
        debug!(outline_len = outline.len(), "Outline drafted");

        let mut document = String::new();
        for (i, topic) in topics.iter().enumerate() {
            let args = prompts::SectionArgs {
                category_label,
                outline: &outline,
                topic,
                display_title: &display_titles[i],
                prior_text: &document,
                placeholder_base: i * PLACEHOLDERS_PER_TOPIC + 1,
                is_last: i + 1 == topics.len(),
            };
            let section = self.generator.generate(&prompts::section(&args)).await?;
            let section = strip_code_fences(&section);
            debug!(topic = %topic.title, section_len = section.len(), "Section drafted");

            if !document.is_empty() {
                document.push('\n');
            }
            document.push_str(&section);
        }

        Ok(document)
    }

    /// Synthesize a per-topic display title. Fails soft to the raw feed
    /// title; a missing pretty title is not worth aborting the category.
    pub async fn display_title(&self, raw_title: &str) -> String {
        match self.generator.generate(&prompts::display_title(raw_title)).await {
            Ok(title) => {
                let title = strip_code_fences(&title);
                let title = title.lines().next().unwrap_or("").trim().to_string();
                if title.is_empty() {
                    raw_title.to_string()
                } else {
                    title
                }
            }
            Err(e) => {
                warn!("Title synthesis failed, using feed title: {}", e);
                raw_title.to_string()
            }
        }
    }

    /// Synthesize the unified delivery subject. Fails soft to a
    /// concatenation of the per-topic titles.
    pub async fn unified_subject(&self, category_label: &str, titles: &[String]) -> String {
        match self
            .generator
            .generate(&prompts::unified_subject(category_label, titles))
            .await
        {
            Ok(subject) => {
                let subject = strip_code_fences(&subject);
                let subject = subject.lines().next().unwrap_or("").trim().to_string();
                if subject.is_empty() {
                    concatenated_subject(category_label, titles)
                } else {
                    format!("[{} Analysis] {}", category_label, subject)
                }
            }
            Err(e) => {
                warn!("Subject synthesis failed, concatenating titles: {}", e);
                concatenated_subject(category_label, titles)
            }
        }
    }
}

/// Deterministic subject: per-topic titles joined directly
pub fn concatenated_subject(category_label: &str, titles: &[String]) -> String {
    format!("[{} Analysis] {}", category_label, titles.join(" · "))
}
