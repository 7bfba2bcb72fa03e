//! Identifier resolution against already-loaded datasets.
//!
//! Lookup order within a dataset is exact key, key with `.json` appended, then
//! approximate substring match on suffix-stripped keys. Exact and suffixed
//! matches in any dataset win over approximate ones. Among approximate matches
//! the first key in file order wins.

use tracing::debug;

use super::{strip_json_suffix, Dataset, LoadedDataset, Record, JSON_SUFFIX};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Suffixed,
    Approximate,
}

#[derive(Debug, Clone, Copy)]
pub struct ResolvedRecord<'a> {
    pub key: &'a str,
    pub kind: MatchKind,
    pub record: &'a Record,
    pub source: &'a LoadedDataset,
}

#[derive(Debug, Clone)]
pub enum Resolution<'a> {
    Found(ResolvedRecord<'a>),
    /// Nothing matched; carries the record to show instead.
    NotFound(Record),
}

impl Resolution<'_> {
    pub fn record(&self) -> &Record {
        match self {
            Resolution::Found(found) => found.record,
            Resolution::NotFound(default) => default,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }
}

type Hit<'a> = (&'a str, &'a Record, MatchKind);

/// Find the key `id` refers to in `records`, accepting only complete records.
pub fn find_key<'a>(id: &str, records: &'a Dataset) -> Option<(&'a str, MatchKind)> {
    find_exact(id, records)
        .or_else(|| find_approximate(id, records))
        .map(|(key, _, kind)| (key, kind))
}

fn complete_entry<'a>(records: &'a Dataset, key: &str) -> Option<(&'a str, &'a Record)> {
    let (key, entry) = records.get_key_value(key)?;
    entry
        .record()
        .filter(|record| record.is_complete())
        .map(|record| (key.as_str(), record))
}

fn find_exact<'a>(id: &str, records: &'a Dataset) -> Option<Hit<'a>> {
    if let Some((key, record)) = complete_entry(records, id) {
        return Some((key, record, MatchKind::Exact));
    }

    if id.ends_with(JSON_SUFFIX) {
        return None;
    }

    let suffixed = format!("{id}{JSON_SUFFIX}");
    complete_entry(records, &suffixed).map(|(key, record)| (key, record, MatchKind::Suffixed))
}

fn find_approximate<'a>(id: &str, records: &'a Dataset) -> Option<Hit<'a>> {
    let needle = strip_json_suffix(id);
    if needle.is_empty() {
        return None;
    }

    records.iter().find_map(|(key, entry)| {
        let record = entry.record().filter(|record| record.is_complete())?;
        let stripped = strip_json_suffix(key);
        let matches =
            !stripped.is_empty() && (stripped.contains(needle) || needle.contains(stripped));
        matches.then_some((key.as_str(), record, MatchKind::Approximate))
    })
}

/// Resolve `id` across `datasets` in order. When nothing matches, the first
/// record of `fallback` (or an empty record) is returned as `NotFound`.
pub fn resolve<'a>(
    id: &str,
    datasets: &'a [LoadedDataset],
    fallback: Option<&Dataset>,
) -> Resolution<'a> {
    let exact = datasets
        .iter()
        .find_map(|dataset| find_exact(id, &dataset.records).map(|hit| (dataset, hit)));
    let hit = exact.or_else(|| {
        datasets
            .iter()
            .find_map(|dataset| find_approximate(id, &dataset.records).map(|hit| (dataset, hit)))
    });

    if let Some((source, (key, record, kind))) = hit {
        debug!("Resolved {} to {} in {} ({:?})", id, key, source.label, kind);
        return Resolution::Found(ResolvedRecord {
            key,
            kind,
            record,
            source,
        });
    }

    let default = fallback
        .and_then(|records| {
            records
                .iter()
                .find_map(|(key, entry)| entry.record().map(|record| (key, record)))
        })
        .map(|(key, record)| {
            debug!("Dialogue {} not found, using default record {}", id, key);
            record.clone()
        })
        .unwrap_or_else(|| Record::new("", ""));
    Resolution::NotFound(default)
}
