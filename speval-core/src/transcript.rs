//! ASR track-1 transcript extraction.
//!
//! Track-1 systems submit one JSON file per audio file, each holding one
//! utterance object or an array of them with a `words` field. Kaldi's
//! `compute-wer` wants a single `ark:` text archive per side, so a directory
//! of JSON transcripts is normalized and flattened into one sorted manifest
//! written next to the other run artifacts.

use crate::error::TranscriptError;
use crate::types::FileId;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct Utterance {
    words: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TranscriptFile {
    Many(Vec<Utterance>),
    One(Utterance),
}

/// Normalize raw transcript words for scoring.
///
/// Apostrophes are dropped (so contractions survive as single tokens),
/// common punctuation becomes whitespace, `[unk]` placeholders are removed,
/// everything is uppercased, and any token still containing a non-letter is
/// discarded.
pub fn normalize_words(raw: &str) -> String {
    const PUNCT: &[char] = &[',', '.', ';', ':', '@', '#', '?', '!', '&', '$'];

    let no_apostrophes = raw.replace('\'', "");
    let spaced: String = no_apostrophes
        .chars()
        .map(|c| if PUNCT.contains(&c) { ' ' } else { c })
        .collect();
    let cleaned = spaced.replace("[unk]", "").to_uppercase();

    cleaned
        .split_whitespace()
        .filter(|token| token.chars().all(|c| c.is_ascii_alphabetic()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract and normalize the full transcript of one JSON file.
pub fn extract_transcript(path: &Path) -> Result<String, TranscriptError> {
    let content = fs::read_to_string(path)?;
    let parsed: TranscriptFile =
        serde_json::from_str(&content).map_err(|source| TranscriptError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    let utterances = match parsed {
        TranscriptFile::Many(utterances) => utterances,
        TranscriptFile::One(utterance) => vec![utterance],
    };

    let joined = utterances
        .iter()
        .map(|utt| normalize_words(&utt.words))
        .collect::<Vec<_>>()
        .join(" ");

    Ok(joined.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Flatten a directory of JSON transcripts into one sorted manifest file.
///
/// Each line is `<id> <normalized transcript>`, sorted by identifier. The
/// manifest lands in `work_dir` under a `<label>` prefix and its path is
/// returned for the `ark:` argument.
pub fn dir_to_manifest(
    dir: &Path,
    label: &str,
    work_dir: &Path,
) -> Result<PathBuf, TranscriptError> {
    let mut lines = Vec::new();
    for dirent in fs::read_dir(dir)? {
        let path = dirent?.path();
        if !path.is_file() {
            continue;
        }
        let id = FileId::from_path(&path);
        let transcript = extract_transcript(&path)?;
        lines.push(format!("{id} {transcript}"));
    }
    lines.sort();

    let manifest_path = work_dir.join(format!("asr_track1_{label}.txt"));
    fs::write(&manifest_path, lines.join("\n"))?;

    tracing::debug!(
        dir = %dir.display(),
        manifest = %manifest_path.display(),
        files = lines.len(),
        "flattened transcript directory"
    );

    Ok(manifest_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn normalization_strips_punctuation_and_unk() {
        assert_eq!(normalize_words("Let's go, [unk] now!"), "LETS GO NOW");
    }

    #[test]
    fn normalization_drops_non_letter_tokens() {
        assert_eq!(normalize_words("call me at 5pm maybe"), "CALL ME AT MAYBE");
    }

    #[test]
    fn extracts_single_object_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("utt.json");
        fs::write(&path, r#"{"words": "hello, world."}"#).unwrap();

        assert_eq!(extract_transcript(&path).unwrap(), "HELLO WORLD");
    }

    #[test]
    fn extracts_array_file_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("utt.json");
        fs::write(
            &path,
            r#"[{"words": "first segment"}, {"words": "second segment"}]"#,
        )
        .unwrap();

        assert_eq!(
            extract_transcript(&path).unwrap(),
            "FIRST SEGMENT SECOND SEGMENT"
        );
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("utt.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(
            extract_transcript(&path),
            Err(TranscriptError::Json { .. })
        ));
    }

    #[test]
    fn manifest_lines_are_sorted_by_identifier() {
        let dir = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        fs::write(dir.path().join("b.json"), r#"{"words": "beta"}"#).unwrap();
        fs::write(dir.path().join("a.json"), r#"{"words": "alpha"}"#).unwrap();

        let manifest = dir_to_manifest(dir.path(), "ref", work.path()).unwrap();
        let content = fs::read_to_string(manifest).unwrap();

        assert_eq!(content, "a ALPHA\nb BETA");
    }
}
