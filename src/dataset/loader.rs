use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{record_keys, strip_json_suffix, Dataset, DatasetError, DialogueEntry, LoadedDataset};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Read one dataset file. A leading byte-order mark is ignored.
pub fn load_dataset(path: &Path) -> Result<Dataset, DatasetError> {
    let raw = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = raw.strip_prefix(BYTE_ORDER_MARK).unwrap_or(&raw);

    serde_json::from_str(raw).map_err(|source| DatasetError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Lazily load candidate files in priority order, skipping any that fail to
/// load or hold no records. The first item is the dataset a page is built from.
pub fn loaded_datasets(candidates: &[PathBuf]) -> impl Iterator<Item = LoadedDataset> + '_ {
    candidates.iter().filter_map(|path| match load_dataset(path) {
        Ok(records) if records.is_empty() => {
            warn!("Dataset {} holds no records, skipping", path.display());
            None
        }
        Ok(records) => {
            info!(
                "Loaded {} dialogue records from {}",
                records.len(),
                path.display()
            );
            Some(LoadedDataset::from_file(path, records))
        }
        Err(e) => {
            warn!("Skipping dataset candidate: {}", e);
            None
        }
    })
}

pub fn load_all(candidates: &[PathBuf]) -> Vec<LoadedDataset> {
    loaded_datasets(candidates).collect()
}

/// The sample dataset used when no candidate file loads.
pub fn load_sample(path: &Path) -> Option<LoadedDataset> {
    if !path.exists() {
        debug!("No sample data at {}", path.display());
        return None;
    }

    match load_dataset(path) {
        Ok(records) => Some(LoadedDataset::sample(path, records)),
        Err(e) => {
            warn!("Error loading sample data file: {}", e);
            None
        }
    }
}

/// Identifiers offered in the record picker: those of the primary dataset, or
/// of the sample data when no candidate file could be loaded.
pub fn dialogue_index(
    primary: Option<&LoadedDataset>,
    sample: Option<&LoadedDataset>,
) -> Vec<DialogueEntry> {
    let entries: Vec<DialogueEntry> = match (primary, sample) {
        (Some(dataset), _) => record_keys(&dataset.records)
            .map(|key| DialogueEntry {
                id: strip_json_suffix(key).to_string(),
                file_path: dataset.path.display().to_string(),
                file_name: dataset.label.clone(),
            })
            .collect(),
        (None, Some(sample)) => {
            info!("Using sample data");
            record_keys(&sample.records)
                .map(|key| DialogueEntry {
                    id: strip_json_suffix(key).to_string(),
                    file_path: "sample_data".to_string(),
                    file_name: sample.label.clone(),
                })
                .collect()
        }
        (None, None) => Vec::new(),
    };

    debug!("Total dialogue IDs available: {}", entries.len());
    entries
}
