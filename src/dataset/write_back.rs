use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{find_key, load_dataset, Dataset, DatasetEntry};
use crate::message::Message;

#[derive(Debug, Error)]
pub enum WriteBackError {
    #[error("No dialogue ID provided")]
    MissingIdentifier,
    #[error("No dialogue history to save")]
    EmptyHistory,
    #[error("Dialogue ID {0} not found in any data file")]
    NotFound(String),
    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("write-back task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedHistory {
    pub path: PathBuf,
    pub key: String,
    pub messages: usize,
}

impl SavedHistory {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Store `history` as `dialogue_history` of the record `id` resolves to, in
/// the first candidate file that contains it. The whole file is rewritten.
pub fn write_history(
    id: &str,
    candidates: &[PathBuf],
    history: &[Message],
) -> Result<SavedHistory, WriteBackError> {
    if id.trim().is_empty() {
        return Err(WriteBackError::MissingIdentifier);
    }
    if history.is_empty() {
        return Err(WriteBackError::EmptyHistory);
    }

    for path in candidates {
        let mut records = match load_dataset(path) {
            Ok(records) => records,
            Err(e) => {
                debug!("Skipping {} for write-back: {}", path.display(), e);
                continue;
            }
        };

        let Some(key) = find_key(id, &records).map(|(key, _)| key.to_string()) else {
            continue;
        };

        if let Some(record) = records.get_mut(&key).and_then(DatasetEntry::record_mut) {
            record.dialogue_history = Some(history.to_vec());
        }
        store(path, &records)?;

        info!(
            "Saved {} messages for {} into {}",
            history.len(),
            key,
            path.display()
        );
        return Ok(SavedHistory {
            path: path.clone(),
            key,
            messages: history.len(),
        });
    }

    Err(WriteBackError::NotFound(id.to_string()))
}

fn store(path: &Path, records: &Dataset) -> Result<(), WriteBackError> {
    let body = serde_json::to_string_pretty(records).map_err(|source| WriteBackError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, body).map_err(|source| WriteBackError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Owns dataset file writes so that only one read-modify-write runs at a time.
#[derive(Debug, Default)]
pub struct HistoryWriter {
    lock: Mutex<()>,
}

impl HistoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn save(
        &self,
        id: &str,
        candidates: &[PathBuf],
        history: &[Message],
    ) -> Result<SavedHistory, WriteBackError> {
        let _guard = self.lock.lock().await;

        let id = id.to_string();
        let candidates = candidates.to_vec();
        let history = history.to_vec();
        tokio::task::spawn_blocking(move || write_history(&id, &candidates, &history)).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Record;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    fn history() -> Vec<Message> {
        vec![Message::user("hello"), Message::assistant("hi there")]
    }

    #[test]
    fn writes_into_alternative_file() {
        let dir = tempdir().unwrap();
        let primary = write(
            dir.path(),
            "primary.json",
            r#"{"OTHER.json":{"guideline":"g","generated_data":"d"}}"#,
        );
        let alt = write(
            dir.path(),
            "alt.json",
            r#"{"first":{"guideline":"g","generated_data":"d"},"ABC123.json":{"guideline":"g","generated_data":"d","domain":"hotel"}}"#,
        );

        let saved = write_history("ABC123", &[primary.clone(), alt.clone()], &history()).unwrap();
        assert_eq!(saved.path, alt);
        assert_eq!(saved.file_name(), "alt.json");
        assert_eq!(saved.key, "ABC123.json");
        assert_eq!(saved.messages, 2);

        let written = load_dataset(&alt).unwrap();
        let keys: Vec<_> = written.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["first", "ABC123.json"]);
        let record = written["ABC123.json"].record().unwrap();
        assert_eq!(record.dialogue_history.as_deref(), Some(history().as_slice()));
        assert_eq!(record.extra["domain"], serde_json::json!("hotel"));

        let untouched = load_dataset(&primary).unwrap();
        assert_eq!(untouched["OTHER.json"].record(), Some(&Record::new("g", "d")));
    }

    #[test]
    fn saves_beside_entries_that_are_not_records() {
        let dir = tempdir().unwrap();
        let path = write(
            dir.path(),
            "mixed.json",
            r#"{"_version":2,"broken":{"guideline":5},"ABC123.json":{"guideline":"g","generated_data":"d"}}"#,
        );

        let saved = write_history("ABC123", std::slice::from_ref(&path), &history()).unwrap();
        assert_eq!(saved.key, "ABC123.json");

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["_version"], serde_json::json!(2));
        assert_eq!(raw["broken"], serde_json::json!({"guideline": 5}));
        assert_eq!(raw["ABC123.json"]["dialogue_history"][1]["content"], "hi there");
        let keys: Vec<_> = raw.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["_version", "broken", "ABC123.json"]);
    }

    #[test]
    fn rejects_missing_identifier_and_empty_history() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "a.json", r#"{"A":{"guideline":"g","generated_data":"d"}}"#);

        assert!(matches!(
            write_history("  ", &[path.clone()], &history()),
            Err(WriteBackError::MissingIdentifier)
        ));
        assert!(matches!(
            write_history("A", &[path], &[]),
            Err(WriteBackError::EmptyHistory)
        ));
    }

    #[test]
    fn unknown_identifier_is_not_found() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "a.json", r#"{"A":{"guideline":"g","generated_data":"d"}}"#);
        let missing = dir.path().join("missing.json");

        let err = write_history("ZZZ", &[missing, path], &history()).unwrap_err();
        assert!(matches!(err, WriteBackError::NotFound(ref id) if id == "ZZZ"));
    }

    #[tokio::test]
    async fn concurrent_saves_do_not_lose_updates() {
        let dir = tempdir().unwrap();
        let path = write(
            dir.path(),
            "a.json",
            r#"{"A":{"guideline":"g","generated_data":"d"},"B":{"guideline":"g","generated_data":"d"}}"#,
        );
        let writer = Arc::new(HistoryWriter::new());
        let candidates = vec![path.clone()];

        let a = {
            let writer = writer.clone();
            let candidates = candidates.clone();
            tokio::spawn(async move { writer.save("A", &candidates, &[Message::user("a")]).await })
        };
        let b = {
            let writer = writer.clone();
            let candidates = candidates.clone();
            tokio::spawn(async move { writer.save("B", &candidates, &[Message::user("b")]).await })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let written = load_dataset(&path).unwrap();
        for (key, text) in [("A", "a"), ("B", "b")] {
            let record = written[key].record().unwrap();
            assert_eq!(record.dialogue_history, Some(vec![Message::user(text)]));
        }
    }
}
