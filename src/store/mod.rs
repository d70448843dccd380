//! Durable state for incremental runs
//!
//! Two JSON documents survive between runs: the sequence of Document Records
//! discovered so far, and the assignment map from visualization reference to
//! screenshot filename index. The assignment map is the dedup ledger: once a
//! reference is assigned it is never captured again, across any number of
//! process restarts.

use crate::config::StateConfig;
use crate::{StateError, StateResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// One discovered release-related document
///
/// Created once per successful document fetch+extract and never mutated.
/// Serialized field names match the on-disk schema of earlier tool versions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Display title, best-effort; may be empty on extraction failure
    pub title: String,

    /// Canonical absolute URL of the document
    pub doc_uri: String,

    /// Ordered visualization references found in this document; may be empty
    #[serde(rename = "vis_urls")]
    pub vis_refs: Vec<String>,

    /// Best-effort summary text; empty when the page carries none
    #[serde(default)]
    pub summary: String,

    /// Normalized `YYYY-MM-DD`, or empty if no date could be parsed.
    /// Empty means "unknown", never "epoch".
    #[serde(default)]
    pub release_date: String,
}

/// In-memory view of the persisted state, sole writer of the state files
pub struct StateStore {
    results_path: PathBuf,
    assignments_path: PathBuf,
    results: Vec<DocumentRecord>,
    assignments: BTreeMap<String, u64>,
}

impl StateStore {
    /// Loads both state files
    ///
    /// A missing or unparseable file is a hard error: an absent assignment
    /// ledger would make every visualization look new and get re-captured.
    /// Seed empty files explicitly with [`StateStore::init`].
    pub fn load(config: &StateConfig) -> StateResult<Self> {
        let results: Vec<DocumentRecord> = read_json(Path::new(&config.results_path))?;
        let assignments: BTreeMap<String, u64> =
            read_json(Path::new(&config.assignments_path))?;

        Ok(Self {
            results_path: PathBuf::from(&config.results_path),
            assignments_path: PathBuf::from(&config.assignments_path),
            results,
            assignments,
        })
    }

    /// Seeds empty state files, refusing to overwrite existing ones
    pub fn init(config: &StateConfig) -> StateResult<()> {
        write_new(Path::new(&config.results_path), "[]")?;
        write_new(Path::new(&config.assignments_path), "{}")?;
        Ok(())
    }

    /// Persists both collections
    ///
    /// The assignment map is written verbatim. The results sequence is
    /// written with exact duplicates collapsed: a record is a duplicate iff
    /// every field is equal. Output order is unspecified by contract; this
    /// implementation keeps first-seen order.
    pub fn save(&self) -> StateResult<()> {
        let mut seen = HashSet::new();
        let deduped: Vec<&DocumentRecord> = self
            .results
            .iter()
            .filter(|record| seen.insert(*record))
            .collect();

        write_json(&self.results_path, &deduped)?;
        write_json(&self.assignments_path, &self.assignments)?;
        Ok(())
    }

    /// Appends one Document Record to the in-memory results sequence
    pub fn push_record(&mut self, record: DocumentRecord) {
        self.results.push(record);
    }

    /// Returns true if the reference already has a screenshot assignment
    pub fn is_assigned(&self, reference: &str) -> bool {
        self.assignments.contains_key(reference)
    }

    /// The index the next successful capture will be filed under
    ///
    /// Monotonically increasing: it equals the number of assignments ever
    /// created, so indices are never reused.
    pub fn next_index(&self) -> u64 {
        self.assignments.len() as u64
    }

    /// Records a successful capture for the reference
    ///
    /// Called at most once per distinct reference for the lifetime of the
    /// store; assignments are never deleted or replaced.
    pub fn assign(&mut self, reference: &str) -> u64 {
        debug_assert!(!self.assignments.contains_key(reference));
        let index = self.next_index();
        self.assignments.insert(reference.to_string(), index);
        index
    }

    /// The crawl cursor: newest release date seen by any previous run
    ///
    /// Computed fresh from the stored records; empty dates are unknown and
    /// never participate. `YYYY-MM-DD` sorts correctly as a plain string.
    pub fn cursor(&self) -> Option<String> {
        self.results
            .iter()
            .map(|record| record.release_date.as_str())
            .filter(|date| !date.is_empty())
            .max()
            .map(str::to_string)
    }

    /// Number of in-memory Document Records (pre-dedup)
    pub fn record_count(&self) -> usize {
        self.results.len()
    }

    /// Number of screenshot assignments
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> StateResult<T> {
    if !path.exists() {
        return Err(StateError::Missing {
            path: path.display().to_string(),
        });
    }
    let content = std::fs::read_to_string(path).map_err(|source| StateError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| StateError::Parse {
        path: path.display().to_string(),
        source,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> StateResult<()> {
    let content = serde_json::to_string_pretty(value).expect("state types serialize infallibly");
    std::fs::write(path, content).map_err(|source| StateError::Write {
        path: path.display().to_string(),
        source,
    })
}

fn write_new(path: &Path, content: &str) -> StateResult<()> {
    if path.exists() {
        return Err(StateError::AlreadyExists {
            path: path.display().to_string(),
        });
    }
    std::fs::write(path, content).map_err(|source| StateError::Write {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn state_config(dir: &TempDir) -> StateConfig {
        StateConfig {
            results_path: dir
                .path()
                .join("results.json")
                .to_string_lossy()
                .into_owned(),
            assignments_path: dir
                .path()
                .join("assignments.json")
                .to_string_lossy()
                .into_owned(),
        }
    }

    fn record(title: &str, date: &str, uri: &str) -> DocumentRecord {
        DocumentRecord {
            title: title.to_string(),
            doc_uri: uri.to_string(),
            vis_refs: vec!["/visualisations/dvc123/chart".to_string()],
            summary: String::new(),
            release_date: date.to_string(),
        }
    }

    #[test]
    fn test_load_missing_files_is_hard_error() {
        let dir = TempDir::new().unwrap();
        let config = state_config(&dir);
        match StateStore::load(&config) {
            Err(StateError::Missing { .. }) => {}
            other => panic!("expected Missing error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_init_then_load_empty() {
        let dir = TempDir::new().unwrap();
        let config = state_config(&dir);
        StateStore::init(&config).unwrap();
        let store = StateStore::load(&config).unwrap();
        assert_eq!(store.record_count(), 0);
        assert_eq!(store.assignment_count(), 0);
        assert_eq!(store.cursor(), None);
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let config = state_config(&dir);
        StateStore::init(&config).unwrap();
        match StateStore::init(&config) {
            Err(StateError::AlreadyExists { .. }) => {}
            other => panic!("expected AlreadyExists, got {:?}", other),
        }
    }

    #[test]
    fn test_load_corrupt_file_is_hard_error() {
        let dir = TempDir::new().unwrap();
        let config = state_config(&dir);
        std::fs::write(&config.results_path, "not json").unwrap();
        std::fs::write(&config.assignments_path, "{}").unwrap();
        match StateStore::load(&config) {
            Err(StateError::Parse { .. }) => {}
            other => panic!("expected Parse error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_save_collapses_exact_duplicates() {
        let dir = TempDir::new().unwrap();
        let config = state_config(&dir);
        StateStore::init(&config).unwrap();

        let mut store = StateStore::load(&config).unwrap();
        store.push_record(record("A", "2024-01-10", "https://x/a"));
        store.push_record(record("A", "2024-01-10", "https://x/a"));
        store.push_record(record("B", "2024-01-05", "https://x/b"));
        store.save().unwrap();

        let reloaded = StateStore::load(&config).unwrap();
        assert_eq!(reloaded.record_count(), 2);
    }

    #[test]
    fn test_near_duplicates_survive() {
        let dir = TempDir::new().unwrap();
        let config = state_config(&dir);
        StateStore::init(&config).unwrap();

        // Same doc_uri, different title: not field-for-field equal
        let mut store = StateStore::load(&config).unwrap();
        store.push_record(record("A", "2024-01-10", "https://x/a"));
        store.push_record(record("A2", "2024-01-10", "https://x/a"));
        store.save().unwrap();

        let reloaded = StateStore::load(&config).unwrap();
        assert_eq!(reloaded.record_count(), 2);
    }

    #[test]
    fn test_assignments_are_stable_across_save_load() {
        let dir = TempDir::new().unwrap();
        let config = state_config(&dir);
        StateStore::init(&config).unwrap();

        let mut store = StateStore::load(&config).unwrap();
        assert_eq!(store.assign("/visualisations/dvc1/a"), 0);
        assert_eq!(store.assign("/visualisations/dvc2/b"), 1);
        store.save().unwrap();

        let reloaded = StateStore::load(&config).unwrap();
        assert!(reloaded.is_assigned("/visualisations/dvc1/a"));
        assert!(reloaded.is_assigned("/visualisations/dvc2/b"));
        assert_eq!(reloaded.next_index(), 2);
    }

    #[test]
    fn test_cursor_is_max_non_empty_date() {
        let dir = TempDir::new().unwrap();
        let config = state_config(&dir);
        StateStore::init(&config).unwrap();

        let mut store = StateStore::load(&config).unwrap();
        store.push_record(record("A", "2024-01-05", "https://x/a"));
        store.push_record(record("B", "2024-01-10", "https://x/b"));
        store.push_record(record("C", "", "https://x/c"));
        assert_eq!(store.cursor().as_deref(), Some("2024-01-10"));
    }

    #[test]
    fn test_legacy_records_without_optional_fields() {
        let dir = TempDir::new().unwrap();
        let config = state_config(&dir);
        std::fs::write(
            &config.results_path,
            r#"[{"title": "Old", "doc_uri": "https://x/old", "vis_urls": []}]"#,
        )
        .unwrap();
        std::fs::write(&config.assignments_path, "{}").unwrap();

        let store = StateStore::load(&config).unwrap();
        assert_eq!(store.record_count(), 1);
        assert_eq!(store.cursor(), None);
    }
}
