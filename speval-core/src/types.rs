//! Core types for speval-core

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Identifier of one scorable unit.
///
/// Derived from a file's base name with the final extension segment removed,
/// or from the first whitespace token of a manifest line.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(String);

impl FileId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive an identifier from a path: base name minus its final extension
    /// (`ch_042.sys.rttm` becomes `ch_042.sys`).
    pub fn from_path(path: &Path) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self(stem)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Payload associated with one identifier in a source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Entry {
    /// Path to a scorable file (directory sources).
    File(PathBuf),
    /// A single joined string: a transcript or a speaker identity.
    Text(String),
    /// Ranked candidate strings, order is rank (best first).
    Ranked(Vec<String>),
}

impl Entry {
    pub fn as_file(&self) -> Option<&Path> {
        match self {
            Entry::File(path) => Some(path),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Entry::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_ranked(&self) -> Option<&[String]> {
        match self {
            Entry::Ranked(candidates) => Some(candidates),
            _ => None,
        }
    }
}

/// Outcome of scoring one unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MetricValue {
    Score(f64),
    /// The external tool produced no recognizable metric.
    Failed,
}

/// Per-unit metric values, keyed and iterated in identifier order.
///
/// Created empty, populated once per identifier as scoring proceeds, then
/// consumed by an aggregator.
#[derive(Debug, Default)]
pub struct MetricRecord {
    values: BTreeMap<FileId, MetricValue>,
}

impl MetricRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, id: FileId, value: MetricValue) {
        self.values.insert(id, value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FileId, &MetricValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_from_path_strips_final_extension_only() {
        assert_eq!(
            FileId::from_path(Path::new("/data/ch_042.sys.rttm")).as_str(),
            "ch_042.sys"
        );
        assert_eq!(FileId::from_path(Path::new("plain")).as_str(), "plain");
    }

    #[test]
    fn record_iterates_in_identifier_order() {
        let mut record = MetricRecord::new();
        record.record(FileId::from("b"), MetricValue::Score(2.0));
        record.record(FileId::from("a"), MetricValue::Score(1.0));

        let ids: Vec<_> = record.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }
}
