//! Static case corpus: historical (situation, thought, reframe) triples
//!
//! The corpus is read once from a CSV resource and shared read-only for the
//! lifetime of the process. A missing or malformed source degrades to an
//! empty dataset so retrieval keeps working with zero matches.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

/// One expert-labelled reframing case. Identity is its position in the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaseRecord {
    pub situation: String,
    pub thought: String,
    pub reframe: String,
}

impl CaseRecord {
    pub fn new(
        situation: impl Into<String>,
        thought: impl Into<String>,
        reframe: impl Into<String>,
    ) -> Self {
        Self {
            situation: situation.into(),
            thought: thought.into(),
            reframe: reframe.into(),
        }
    }
}

/// Ordered, immutable view over the corpus. Cloning shares the same records.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Arc<[CaseRecord]>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CaseRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CaseRecord> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[CaseRecord] {
        &self.records
    }
}

impl From<Vec<CaseRecord>> for Dataset {
    fn from(records: Vec<CaseRecord>) -> Self {
        Self {
            records: records.into(),
        }
    }
}

/// Lazily loaded, process-wide corpus holder.
#[derive(Debug)]
pub struct CaseStore {
    source: Option<PathBuf>,
    dataset: OnceCell<Dataset>,
}

impl CaseStore {
    /// Store backed by a CSV file; nothing is read until the first `load`.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Some(path.into()),
            dataset: OnceCell::new(),
        }
    }

    /// Store over an in-memory corpus.
    pub fn from_records(records: Vec<CaseRecord>) -> Self {
        Self {
            source: None,
            dataset: OnceCell::with_value(Dataset::from(records)),
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Returns the dataset, reading the source on first call only.
    pub fn load(&self) -> &Dataset {
        self.dataset.get_or_init(|| match self.source.as_deref() {
            Some(path) => read_dataset(path).unwrap_or_else(|e| {
                warn!(
                    "Case corpus {} unavailable ({}); retrieval will return no matches",
                    path.display(),
                    e
                );
                Dataset::default()
            }),
            None => Dataset::default(),
        })
    }
}

/// Parse a CSV with `situation`, `thought` and `reframe` headers; extra columns are ignored.
pub fn read_dataset(path: &Path) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let records = reader
        .deserialize::<CaseRecord>()
        .collect::<std::result::Result<Vec<_>, csv::Error>>()?;

    info!(
        "Loaded {} reframing cases from {}",
        records.len(),
        path.display()
    );
    Ok(Dataset::from(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_csv(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "reframe-mind-{}-{}.csv",
            name,
            uuid::Uuid::new_v4()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn missing_source_yields_empty_dataset() {
        let store = CaseStore::from_path("/definitely/not/here.csv");
        assert!(store.load().is_empty());
    }

    #[test]
    fn loads_records_and_ignores_extra_columns() {
        let path = temp_csv(
            "ok",
            "id,situation,thought,reframe,thinking_traps\n\
             1,exam,I will fail,I can prepare more and try my best,fortune telling\n\
             2,\"party, friday\",Nobody likes me,Some people enjoyed talking to me,mind reading\n",
        );
        let store = CaseStore::from_path(&path);
        let dataset = store.load();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.get(0).unwrap().thought, "I will fail");
        assert_eq!(dataset.get(1).unwrap().situation, "party, friday");
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn malformed_source_yields_empty_dataset() {
        let path = temp_csv("bad", "situation,thought\nexam,I will fail\n");
        let store = CaseStore::from_path(&path);
        assert!(store.load().is_empty());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn load_is_idempotent() {
        let path = temp_csv("once", "situation,thought,reframe\na,b,c\n");
        let store = CaseStore::from_path(&path);
        assert_eq!(store.load().len(), 1);
        std::fs::remove_file(&path).ok();
        // Source is gone, but the first read is retained.
        assert_eq!(store.load().len(), 1);
    }

    #[test]
    fn dataset_clones_share_records() {
        let dataset = Dataset::from(vec![CaseRecord::new("s", "t", "r")]);
        let copy = dataset.clone();
        assert!(std::ptr::eq(dataset.as_slice(), copy.as_slice()));
    }
}
