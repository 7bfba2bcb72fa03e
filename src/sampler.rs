//! Random, non-overlapping annotation batches drawn from a dataset file.

use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_BATCH_COUNT: usize = 4;
pub const DEFAULT_BATCH_SIZE: usize = 9;

/// Records of a dataset file, keeping whether the file was keyed or a list.
#[derive(Debug, Clone, PartialEq)]
pub enum Collection {
    List(Vec<Value>),
    Keyed(Vec<(String, Value)>),
}

impl Collection {
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Array(items) => Ok(Collection::List(items)),
            Value::Object(map) => Ok(Collection::Keyed(map.into_iter().collect())),
            other => anyhow::bail!("expected a JSON array or object, found {}", kind(&other)),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(&raw);
        let value: Value = serde_json::from_str(raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Self::from_value(value)
    }

    pub fn len(&self) -> usize {
        match self {
            Collection::List(items) => items.len(),
            Collection::Keyed(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shuffle and split into batches, each rendered in the input's shape.
    pub fn into_batches<R: Rng + ?Sized>(
        self,
        batch_count: usize,
        batch_size: usize,
        rng: &mut R,
    ) -> Vec<Value> {
        match self {
            Collection::List(items) => partition(items, batch_count, batch_size, rng)
                .into_iter()
                .map(Value::Array)
                .collect(),
            Collection::Keyed(items) => partition(items, batch_count, batch_size, rng)
                .into_iter()
                .map(|batch| Value::Object(batch.into_iter().collect::<Map<_, _>>()))
                .collect(),
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Records a full run draws, saturating instead of overflowing.
pub fn records_needed(batch_count: usize, batch_size: usize) -> usize {
    batch_count.saturating_mul(batch_size)
}

/// Number of full batches that fit into `available` records.
pub fn effective_batch_count(available: usize, batch_count: usize, batch_size: usize) -> usize {
    if batch_size == 0 {
        return 0;
    }
    batch_count.min(available / batch_size)
}

/// Shuffle `items` uniformly and cut the front into `batch_count` disjoint
/// batches of `batch_size`. Leftover records are discarded.
pub fn partition<T, R: Rng + ?Sized>(
    mut items: Vec<T>,
    batch_count: usize,
    batch_size: usize,
    rng: &mut R,
) -> Vec<Vec<T>> {
    let count = effective_batch_count(items.len(), batch_count, batch_size);
    if count < batch_count {
        warn!(
            "Not enough items ({}) for {} batches of {}; creating {} batches",
            items.len(),
            batch_count,
            batch_size,
            count
        );
    }

    items.shuffle(rng);
    items.truncate(count * batch_size);

    let mut items = items.into_iter();
    (0..count)
        .map(|_| items.by_ref().take(batch_size).collect())
        .collect()
}

/// Write each batch to `<prefix>_<n>.json` (1-based) as UTF-8 with a
/// byte-order mark and two-space indentation.
pub fn write_batches(batches: &[Value], output_dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let mut written = Vec::with_capacity(batches.len());
    for (i, batch) in batches.iter().enumerate() {
        let path = output_dir.join(format!("{prefix}_{}.json", i + 1));
        let body = serde_json::to_string_pretty(batch)?;
        fs::write(&path, format!("\u{feff}{body}"))
            .with_context(|| format!("failed to write {}", path.display()))?;

        let size = match batch {
            Value::Array(items) => items.len(),
            Value::Object(items) => items.len(),
            _ => 0,
        };
        info!("Saved {} items to {}", size, path.display());
        written.push(path);
    }
    Ok(written)
}
