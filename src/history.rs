//! History Store
//!
//! Rolling 30-day record of previously published item ids, persisted as a
//! JSON array of `{id, title, date}` entries. Deduplication depends on this
//! file surviving partial writes, so commits go through a temp file and an
//! atomic rename. A missing or corrupt file degrades to an empty set.

use chrono::{Duration, NaiveDate};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::constants::history::WINDOW_DAYS;
use crate::types::{CandidateItem, HistoryEntry, LoomError, Result};

/// File-backed rolling history record
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted record. Missing or corrupt backing store is never
    /// fatal; it resets deduplication for this run only.
    pub fn load(&self) -> Vec<HistoryEntry> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(path = %self.path.display(), "No history file: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %self.path.display(), "Corrupt history file, starting empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Drop entries older than the 30-day window relative to `today`
    pub fn prune(entries: Vec<HistoryEntry>, today: NaiveDate) -> Vec<HistoryEntry> {
        let cutoff = today - Duration::days(WINDOW_DAYS);
        let before = entries.len();
        let kept: Vec<HistoryEntry> = entries.into_iter().filter(|e| e.date >= cutoff).collect();
        if kept.len() < before {
            debug!(dropped = before - kept.len(), "Pruned history entries");
        }
        kept
    }

    /// Append newly published items and persist the full set atomically.
    ///
    /// A truncated write must not corrupt existing history, so the new
    /// content is written to a sibling temp file and renamed into place.
    pub fn commit(
        &self,
        mut entries: Vec<HistoryEntry>,
        new_items: &[CandidateItem],
        publish_date: NaiveDate,
    ) -> Result<Vec<HistoryEntry>> {
        for item in new_items {
            entries.push(HistoryEntry {
                id: item.id.clone(),
                title: item.title.clone(),
                date: publish_date,
            });
        }

        let json = serde_json::to_string_pretty(&entries)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &json)
            .map_err(|e| LoomError::History(format!("temp write failed: {}", e)))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            // Leave no stray temp file behind on failure
            let _ = fs::remove_file(&tmp);
            LoomError::History(format!("rename into place failed: {}", e))
        })?;

        debug!(total = entries.len(), path = %self.path.display(), "History committed");
        Ok(entries)
    }

    /// Dedup key set for candidate filtering
    pub fn known_ids(entries: &[HistoryEntry]) -> HashSet<&str> {
        entries.iter().map(|e| e.id.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn entry(id: &str, date: NaiveDate) -> HistoryEntry {
        HistoryEntry {
            id: id.to_string(),
            title: format!("title for {}", id),
            date,
        }
    }

    fn item(id: &str) -> CandidateItem {
        CandidateItem {
            id: id.to_string(),
            title: format!("title for {}", id),
            category: Category::Tech,
            body_excerpt: String::new(),
            published_at: None,
        }
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path().join("history.json"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_load_corrupt_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{not json").unwrap();
        let store = HistoryStore::new(path);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_prune_drops_old_entries() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        let entries = vec![
            entry("old", today - Duration::days(31)),
            entry("edge", today - Duration::days(30)),
            entry("fresh", today - Duration::days(1)),
        ];
        let kept = HistoryStore::prune(entries, today);
        let ids: Vec<&str> = kept.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["edge", "fresh"]);
    }

    #[test]
    fn test_commit_roundtrip_and_no_temp_residue() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        let store = HistoryStore::new(&path);
        let today = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();

        let committed = store
            .commit(Vec::new(), &[item("https://a"), item("https://b")], today)
            .unwrap();
        assert_eq!(committed.len(), 2);
        assert!(!path.with_extension("json.tmp").exists());

        let reloaded = store.load();
        assert_eq!(reloaded, committed);
        assert!(HistoryStore::known_ids(&reloaded).contains("https://a"));
    }

    #[test]
    fn test_commit_overwrites_whole_set() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path().join("history.json"));
        let today = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();

        let first = store.commit(Vec::new(), &[item("https://a")], today).unwrap();
        let pruned = HistoryStore::prune(first, today);
        let second = store.commit(pruned, &[item("https://b")], today).unwrap();

        assert_eq!(store.load(), second);
        assert_eq!(second.len(), 2);
    }

    proptest! {
        #[test]
        fn prop_prune_keeps_only_window(ages in proptest::collection::vec(0i64..120, 0..40)) {
            let today = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
            let entries: Vec<HistoryEntry> = ages
                .iter()
                .enumerate()
                .map(|(i, age)| entry(&format!("id-{}", i), today - Duration::days(*age)))
                .collect();

            let kept = HistoryStore::prune(entries, today);
            for e in &kept {
                prop_assert!(today - e.date <= Duration::days(WINDOW_DAYS));
            }
            let expected = ages.iter().filter(|a| **a <= WINDOW_DAYS).count();
            prop_assert_eq!(kept.len(), expected);
        }
    }
}
