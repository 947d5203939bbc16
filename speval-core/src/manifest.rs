//! Line-oriented manifest parsing.
//!
//! A manifest maps one identifier per line to a payload made of the remaining
//! whitespace-separated tokens. How the payload is interpreted depends on the
//! task: a joined transcript string, a single speaker identity, or an ordered
//! list of ranked predictions.

use crate::error::ManifestError;
use crate::types::{Entry, FileId};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// How manifest line payloads are interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ManifestKind {
    /// Remaining tokens joined with single spaces (ASR track-2 transcripts).
    Transcript,
    /// Last token is the payload (speaker-identity references).
    Identity,
    /// Remaining tokens kept in order, best first (ranked predictions).
    Ranked,
}

/// Parse a manifest file into identifier-keyed entries.
///
/// Blank lines are skipped. Duplicate identifiers resolve last-write-wins.
/// Ranked manifests must carry the same token count on every line; a
/// mismatch is fatal before any scoring starts.
pub fn parse(path: &Path, kind: ManifestKind) -> Result<BTreeMap<FileId, Entry>, ManifestError> {
    let content = fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut entries = BTreeMap::new();
    let mut expected_width: Option<usize> = None;

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let line_no = index + 1;
        if tokens.len() < 2 {
            return Err(ManifestError::MissingPayload {
                path: path.to_path_buf(),
                line: line_no,
            });
        }

        if kind == ManifestKind::Ranked {
            let width = *expected_width.get_or_insert(tokens.len());
            if tokens.len() != width {
                return Err(ManifestError::InconsistentRanks {
                    path: path.to_path_buf(),
                    line: line_no,
                    expected: width,
                    got: tokens.len(),
                });
            }
        }

        let id = FileId::new(tokens[0]);
        let entry = match kind {
            ManifestKind::Transcript => Entry::Text(tokens[1..].join(" ")),
            ManifestKind::Identity => Entry::Text(tokens[tokens.len() - 1].to_string()),
            ManifestKind::Ranked => {
                Entry::Ranked(tokens[1..].iter().map(|t| t.to_string()).collect())
            }
        };
        entries.insert(id, entry);
    }

    Ok(entries)
}

/// Number of ranked predictions per line in a ranked manifest.
///
/// This is the structural consistency check run before scoring: every line
/// must carry the same token count, and the prediction count is that width
/// minus the identifier token.
pub fn ranked_width(path: &Path) -> Result<usize, ManifestError> {
    let entries = parse(path, ManifestKind::Ranked)?;
    Ok(entries
        .values()
        .filter_map(Entry::as_ranked)
        .map(<[String]>::len)
        .next()
        .unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn manifest(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("create temp manifest");
        file.write_all(content.as_bytes()).expect("write manifest");
        file
    }

    #[test]
    fn transcript_payload_joins_tokens() {
        let file = manifest("utt1 hello   world\nutt2 go\n");
        let entries = parse(file.path(), ManifestKind::Transcript).unwrap();

        assert_eq!(
            entries[&FileId::from("utt1")],
            Entry::Text("hello world".to_string())
        );
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn identity_payload_takes_last_token() {
        let file = manifest("utt1 extra spk07\n");
        let entries = parse(file.path(), ManifestKind::Identity).unwrap();

        assert_eq!(
            entries[&FileId::from("utt1")],
            Entry::Text("spk07".to_string())
        );
    }

    #[test]
    fn ranked_payload_preserves_order() {
        let file = manifest("utt1 spkB spkA spkC\n");
        let entries = parse(file.path(), ManifestKind::Ranked).unwrap();

        assert_eq!(
            entries[&FileId::from("utt1")],
            Entry::Ranked(vec!["spkB".into(), "spkA".into(), "spkC".into()])
        );
    }

    #[test]
    fn ranked_width_mismatch_is_rejected() {
        let file = manifest("utt1 a b c\nutt2 a b c d\n");
        let err = parse(file.path(), ManifestKind::Ranked).unwrap_err();

        match err {
            ManifestError::InconsistentRanks {
                line,
                expected,
                got,
                ..
            } => {
                assert_eq!(line, 2);
                assert_eq!(expected, 4);
                assert_eq!(got, 5);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn duplicate_identifier_is_last_write_wins() {
        let file = manifest("utt1 first\nutt1 second\n");
        let entries = parse(file.path(), ManifestKind::Transcript).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[&FileId::from("utt1")],
            Entry::Text("second".to_string())
        );
    }

    #[test]
    fn blank_lines_are_skipped() {
        let file = manifest("\nutt1 a\n\n  \nutt2 b\n");
        let entries = parse(file.path(), ManifestKind::Transcript).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn ranked_width_counts_predictions() {
        let file = manifest("utt1 a b c\nutt2 d e f\n");
        assert_eq!(ranked_width(file.path()).unwrap(), 3);
    }
}
