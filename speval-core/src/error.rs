//! Error types for speval-core organized by pipeline stage.

use crate::types::FileId;
use std::path::PathBuf;
use thiserror::Error;

/// Evaluation pipeline error variants organized by stage.
#[derive(Debug, Error)]
pub enum Error {
    /// File pairing stage error
    #[error(transparent)]
    Pairing(#[from] PairingError),

    /// Manifest parsing stage error
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Aggregation stage error
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    /// External scorer invocation error
    #[error(transparent)]
    Scorer(#[from] ScorerError),

    /// Transcript extraction error
    #[error(transparent)]
    Transcript(#[from] TranscriptError),

    /// Report writing error
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Errors while enumerating and pairing reference/hypothesis sources.
#[derive(Debug, Error)]
pub enum PairingError {
    /// Reference source yielded no entries
    #[error("no reference files found in {}, cannot provide a score", .path.display())]
    EmptyRef { path: PathBuf },

    /// Hypothesis source yielded no entries
    #[error("no system output files found in {}, cannot provide a score", .path.display())]
    EmptyHyp { path: PathBuf },

    /// Reference and hypothesis share no identifiers
    #[error("no common files between reference and hypothesis that can be scored")]
    NoCommonFiles,

    /// IO error while enumerating a source
    #[error("failed to read source {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Manifest format errors.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Ranked manifests must have a uniform token count per line
    #[error(
        "inconsistent manifest {}: line {line} has {got} tokens, expected {expected}; \
         every line must carry the same number of predictions",
        .path.display()
    )]
    InconsistentRanks {
        path: PathBuf,
        line: usize,
        expected: usize,
        got: usize,
    },

    /// A line carried an identifier but no payload tokens
    #[error("manifest {}: line {line} has an identifier but no payload", .path.display())]
    MissingPayload { path: PathBuf, line: usize },

    /// IO error while reading the manifest
    #[error("failed to read manifest {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Aggregation errors.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// Every unit failed scoring, a mean would be 0/0
    #[error("no files were scored successfully, cannot compute an overall result")]
    NothingScored,

    /// An entry had the wrong payload shape for the requested aggregation
    #[error("entry for {id} has the wrong payload kind for this aggregation")]
    EntryKind { id: FileId },
}

/// External scorer invocation errors.
#[derive(Debug, Error)]
pub enum ScorerError {
    /// The scorer process could not be spawned
    #[error("failed to run scorer {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
}

/// ASR JSON transcript extraction errors.
#[derive(Debug, Error)]
pub enum TranscriptError {
    /// Transcript file is not valid JSON of the expected shape
    #[error("malformed transcript {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// IO error while reading or writing transcript data
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Report writing errors.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Refusing to overwrite an existing report
    #[error("cannot overwrite, file exists at {}", .path.display())]
    AlreadyExists { path: PathBuf },

    /// IO error while writing the report
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for speval-core operations.
pub type Result<T> = std::result::Result<T, Error>;
