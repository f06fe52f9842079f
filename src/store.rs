// src/store.rs
//! Shared intermediate store: the news collection handed from the collector
//! to the predictor as a single JSON file.
//!
//! The store is unlocked shared state. The supported invocation pattern is a
//! single collect-then-predict sequence per logical request; overlapping
//! requests can overwrite each other mid-read. Callers that need to avoid
//! that hazard should use the in-memory handoff on the predictor instead.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One extracted news article. Every field is best-effort: the backend may
/// omit any of them and extraction never fails the whole collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsRecord {
    pub title: Option<String>,
    pub source: Option<String>,
    pub date: Option<String>,
    pub url: Option<String>,
    pub summary: Option<String>,
}

/// Insertion-ordered mapping `article_1..article_N` -> record, N in backend
/// discovery order. Identity is purely positional; there is no dedup.
pub type NewsCollection = IndexMap<String, NewsRecord>;

/// Key for the 1-based article position.
pub fn article_key(index: usize) -> String {
    format!("article_{index}")
}

/// Write the full collection, replacing any previous content.
pub fn save(path: &Path, collection: &NewsCollection) -> Result<()> {
    let json = serde_json::to_string(collection).context("serializing news collection")?;
    fs::write(path, json).with_context(|| format!("writing news store {}", path.display()))?;
    Ok(())
}

/// Read the collection back. Missing or corrupt files are plain errors for
/// the caller to map (the predictor reports them as DataUnavailable).
pub fn load(path: &Path) -> Result<NewsCollection> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading news store {}", path.display()))?;
    let collection: NewsCollection =
        serde_json::from_str(&data).with_context(|| format!("parsing news store {}", path.display()))?;
    Ok(collection)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_keys_are_one_based() {
        assert_eq!(article_key(1), "article_1");
        assert_eq!(article_key(12), "article_12");
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");

        let mut collection = NewsCollection::new();
        collection.insert(
            article_key(1),
            NewsRecord {
                title: Some("Nikkei rallies".into()),
                source: Some("Reuters".into()),
                date: None,
                url: Some("https://example.com/a".into()),
                summary: Some("Chip stocks lifted the index.".into()),
            },
        );
        collection.insert(article_key(2), NewsRecord::default());

        save(&path, &collection).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded, collection);
        // Insertion order survives the round trip.
        let keys: Vec<_> = loaded.keys().cloned().collect();
        assert_eq!(keys, vec!["article_1", "article_2"]);
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("absent.json")).is_err());
    }
}
