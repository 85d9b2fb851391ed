//! Asset Injection
//!
//! Stage 5: replace every `[IMAGE_PLACEHOLDER_n]` token in the draft with a
//! rendered figure, or with nothing when no image can be found. One keyword
//! plan call covers all slots; each slot then gets one image search with
//! in-document URL dedup. The stage never fails the category: the single
//! hard guarantee is that no placeholder token survives in the output.

mod unsplash;

pub use unsplash::{ImageRef, ImageSearcher, UnsplashClient};

use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::ai::{TextGenerator, extract_json};
use crate::types::{CandidateItem, Category};

/// Injector over the generative and image-search collaborators
pub struct AssetInjector<'a> {
    generator: &'a dyn TextGenerator,
    searcher: &'a dyn ImageSearcher,
    pool_size: usize,
}

impl<'a> AssetInjector<'a> {
    pub fn new(
        generator: &'a dyn TextGenerator,
        searcher: &'a dyn ImageSearcher,
        pool_size: usize,
    ) -> Self {
        Self {
            generator,
            searcher,
            pool_size,
        }
    }

    /// Resolve every placeholder token in `draft`.
    pub async fn inject(
        &self,
        draft: &str,
        topics: &[CandidateItem],
        category: Category,
    ) -> String {
        let tokens = discover_tokens(draft);
        if tokens.is_empty() {
            debug!("Draft carries no image placeholders");
            return draft.to_string();
        }

        let keywords = self.keyword_plan(tokens.len(), topics, category).await;
        info!(
            slots = tokens.len(),
            keywords = ?keywords,
            "Resolving image slots"
        );

        let mut document = draft.to_string();
        let mut used_urls: HashSet<String> = HashSet::new();

        for (token, keyword) in tokens.iter().zip(keywords.iter()) {
            let tag = self.resolve_slot(keyword, &mut used_urls).await;
            document = document.replace(token, &tag);
        }

        scrub_residual_tokens(&document)
    }

    /// One search per slot. Picks the first URL not yet used in this
    /// document; an exhausted pool falls back to repeating its first hit
    /// rather than leaving the slot empty.
    async fn resolve_slot(&self, keyword: &str, used_urls: &mut HashSet<String>) -> String {
        let results = match self.searcher.search(keyword, self.pool_size).await {
            Ok(results) => results,
            Err(e) => {
                warn!(keyword, "Image search failed, dropping slot: {}", e);
                return String::new();
            }
        };

        let Some(first) = results.first() else {
            warn!(keyword, "Image search returned no results, dropping slot");
            return String::new();
        };

        let chosen = results
            .iter()
            .find(|r| !used_urls.contains(&r.url))
            .unwrap_or(first);
        used_urls.insert(chosen.url.clone());
        figure_tag(&chosen.url, keyword)
    }

    /// One generate call producing a search keyword per slot. Any failure
    /// or short plan tops up from the category's stock keywords.
    async fn keyword_plan(
        &self,
        slots: usize,
        topics: &[CandidateItem],
        category: Category,
    ) -> Vec<String> {
        let mut plan = match self.generator.generate(&plan_prompt(slots, topics)).await {
            Ok(response) => parse_plan(&response),
            Err(e) => {
                warn!("Keyword plan call failed, using stock keywords: {}", e);
                Vec::new()
            }
        };

        plan.truncate(slots);
        let stock = category.fallback_keywords();
        let mut cycle = stock.iter().cycle();
        while plan.len() < slots {
            plan.push(cycle.next().map(|s| s.to_string()).unwrap_or_default());
        }
        plan
    }
}

fn plan_prompt(slots: usize, topics: &[CandidateItem]) -> String {
    let listing = topics
        .iter()
        .enumerate()
        .map(|(i, t)| format!("Topic {}: {}", i + 1, t.title))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "For an illustrated article covering the topics below, propose exactly \
         {slots} English image-search keywords, one per image slot in reading \
         order. Keep each keyword to one or two concrete, visual words \
         (e.g. \"semiconductor wafer\", \"laboratory research\").\n\n\
         {listing}\n\n\
         Reply with a JSON array of {slots} strings and nothing else."
    )
}

/// Parse the plan response into scrubbed keywords. Unusable entries are
/// dropped; the caller tops up what is missing.
fn parse_plan(response: &str) -> Vec<String> {
    let Ok(value) = extract_json(response) else {
        warn!("Keyword plan response is not JSON");
        return Vec::new();
    };
    let Some(entries) = value.as_array() else {
        warn!("Keyword plan JSON is not an array");
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|v| v.as_str())
        .map(scrub_keyword)
        .filter(|k| !k.is_empty())
        .collect()
}

/// Reduce a keyword to letters, digits and single spaces; search APIs and
/// the figure caption both take it verbatim.
fn scrub_keyword(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Placeholder tokens in order of first appearance, deduplicated
fn discover_tokens(draft: &str) -> Vec<String> {
    let token = Regex::new(r"\[IMAGE_PLACEHOLDER_(\d+)\]").expect("static pattern");
    let mut seen = HashSet::new();
    let mut tokens = Vec::new();
    for m in token.find_iter(draft) {
        if seen.insert(m.as_str().to_string()) {
            tokens.push(m.as_str().to_string());
        }
    }
    tokens
}

/// Drop any token the slot loop did not cover, e.g. a number the draft
/// invented outside the requested range.
fn scrub_residual_tokens(document: &str) -> String {
    let token = Regex::new(r"\[IMAGE_PLACEHOLDER_\d+\]").expect("static pattern");
    if token.is_match(document) {
        warn!("Residual image placeholders scrubbed from document");
        token.replace_all(document, "").into_owned()
    } else {
        document.to_string()
    }
}

fn figure_tag(url: &str, keyword: &str) -> String {
    format!(
        "<figure style=\"margin: 20px 0; text-align: center;\">\
         <img src=\"{url}\" alt=\"{keyword}\" \
         style=\"width: 100%; max-width: 700px; border-radius: 8px;\">\
         <figcaption style=\"font-size: 0.85em; color: grey;\">\
         Image: Unsplash ({keyword})</figcaption></figure>"
    )
}
