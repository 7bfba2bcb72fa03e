//! Dialogue datasets stored as flat JSON files.
//!
//! A dataset file is a JSON object keyed by record identifier. Keys keep the
//! order they have in the file, which is also the order approximate matching
//! walks them in.

pub mod loader;
pub mod resolver;
pub mod write_back;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::message::Message;

pub use loader::{dialogue_index, load_all, load_dataset, load_sample, loaded_datasets};
pub use resolver::{find_key, resolve, MatchKind, Resolution, ResolvedRecord};
pub use write_back::{HistoryWriter, SavedHistory, WriteBackError};

pub const JSON_SUFFIX: &str = ".json";
pub const SAMPLE_DATA_LABEL: &str = "Sample Data";

/// Identifiers may or may not carry a `.json` suffix; this drops one if present.
pub fn strip_json_suffix(id: &str) -> &str {
    id.strip_suffix(JSON_SUFFIX).unwrap_or(id)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guideline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialogue_history: Option<Vec<Message>>,
    /// Fields this crate does not interpret; written back untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Record {
    pub fn new(guideline: impl Into<String>, generated_data: impl Into<String>) -> Self {
        Self {
            guideline: Some(guideline.into()),
            generated_data: Some(generated_data.into()),
            ..Self::default()
        }
    }

    /// A record without both transcripts is treated as absent.
    pub fn is_complete(&self) -> bool {
        self.guideline.is_some() && self.generated_data.is_some()
    }

    pub fn guideline(&self) -> &str {
        self.guideline.as_deref().unwrap_or_default()
    }

    pub fn generated_data(&self) -> &str {
        self.generated_data.as_deref().unwrap_or_default()
    }
}

/// One value of a dataset file. Values that do not decode as a [`Record`] are
/// kept as raw JSON: they never match an identifier and are written back as
/// they were read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DatasetEntry {
    Record(Record),
    Raw(serde_json::Value),
}

impl DatasetEntry {
    pub fn record(&self) -> Option<&Record> {
        match self {
            DatasetEntry::Record(record) => Some(record),
            DatasetEntry::Raw(_) => None,
        }
    }

    pub fn record_mut(&mut self) -> Option<&mut Record> {
        match self {
            DatasetEntry::Record(record) => Some(record),
            DatasetEntry::Raw(_) => None,
        }
    }
}

impl From<Record> for DatasetEntry {
    fn from(record: Record) -> Self {
        DatasetEntry::Record(record)
    }
}

pub type Dataset = IndexMap<String, DatasetEntry>;

/// Keys of the entries that decoded as records, in file order.
pub fn record_keys(records: &Dataset) -> impl Iterator<Item = &str> {
    records
        .iter()
        .filter(|(_, entry)| entry.record().is_some())
        .map(|(key, _)| key.as_str())
}

/// A dataset together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub path: PathBuf,
    pub label: String,
    pub records: Dataset,
}

impl LoadedDataset {
    pub fn from_file(path: impl Into<PathBuf>, records: Dataset) -> Self {
        let path = path.into();
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            path,
            label,
            records,
        }
    }

    pub fn sample(path: impl Into<PathBuf>, records: Dataset) -> Self {
        Self {
            path: path.into(),
            label: SAMPLE_DATA_LABEL.to_string(),
            records,
        }
    }
}

/// One selectable entry of the record picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialogueEntry {
    pub id: String,
    pub file_path: String,
    pub file_name: String,
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl DatasetError {
    pub fn path(&self) -> &Path {
        match self {
            DatasetError::Io { path, .. } | DatasetError::Parse { path, .. } => path,
        }
    }
}
