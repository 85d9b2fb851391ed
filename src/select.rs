//! Topic Selection
//!
//! Stage 3: rank the candidate pool with a single delegated generate call
//! and map the returned indices back to candidates. Selection fails soft by
//! contract: any generative failure, short parse, or out-of-range index
//! falls back deterministically to the first candidates in collection order.

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::ai::TextGenerator;
use crate::constants::select::RANKING_POOL;
use crate::types::CandidateItem;

/// Selector over the generative collaborator
pub struct TopicSelector<'a> {
    generator: &'a dyn TextGenerator,
}

impl<'a> TopicSelector<'a> {
    pub fn new(generator: &'a dyn TextGenerator) -> Self {
        Self { generator }
    }

    /// Pick `desired` topics without repetition.
    ///
    /// Returns `min(desired, candidates.len())` items; the caller decides
    /// what a short result means. Never raises under generative failure.
    pub async fn select(
        &self,
        candidates: &[CandidateItem],
        desired: usize,
        category_label: &str,
    ) -> Vec<CandidateItem> {
        if candidates.len() <= desired {
            return candidates.to_vec();
        }

        let pool = &candidates[..candidates.len().min(RANKING_POOL)];
        let prompt = ranking_prompt(pool, desired, category_label);

        match self.generator.generate(&prompt).await {
            Ok(response) => {
                if let Some(picked) = map_indices(&response, pool, desired) {
                    debug!(category = category_label, "Ranking call selected topics");
                    return picked;
                }
                warn!(
                    category = category_label,
                    "Ranking response unusable, falling back to collection order"
                );
            }
            Err(e) => {
                warn!(
                    category = category_label,
                    "Ranking call failed, falling back to collection order: {}", e
                );
            }
        }

        candidates[..desired].to_vec()
    }
}

fn ranking_prompt(pool: &[CandidateItem], desired: usize, category_label: &str) -> String {
    let listing = pool
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}. {}", i, c.title))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Role: senior editor of a professional investment and technology blog.\n\
         Goal: from the {category_label} candidates below, pick the {desired} news items \
         that best support a deep-dive analysis and will draw investor attention.\n\n\
         [Candidates]\n{listing}\n\n\
         Rules:\n\
         1. Prefer topics with a technical mechanism or market impact worth analyzing.\n\
         2. Reply with exactly {desired} numbers and nothing else (example: 1, 4)."
    )
}

/// Parse integers out of the free-text response and map the first `desired`
/// unique in-range ones back to candidates. None when too few are usable.
fn map_indices(
    response: &str,
    pool: &[CandidateItem],
    desired: usize,
) -> Option<Vec<CandidateItem>> {
    static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\b\d+\b").expect("static pattern")
    });
    let mut picked: Vec<usize> = Vec::with_capacity(desired);

    for m in NUMBER.find_iter(response) {
        let Ok(idx) = m.as_str().parse::<usize>() else {
            continue;
        };
        if idx >= pool.len() || picked.contains(&idx) {
            continue;
        }
        picked.push(idx);
        if picked.len() == desired {
            return Some(picked.into_iter().map(|i| pool[i].clone()).collect());
        }
    }

    None
}
