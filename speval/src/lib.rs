//! speval: CLI wrappers around external speech scoring tools.
//!
//! Each subcommand pairs a reference source with a hypothesis source,
//! delegates metric computation to a third-party tool, and folds the
//! per-file results into a single report.

pub mod asr;
pub mod cli;
pub mod paths;
pub mod sad;
pub mod sd;
pub mod sid;
