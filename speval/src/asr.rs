//! Asr subcommand - corpus word error rate via Kaldi compute-wer.
//!
//! Unlike the per-file tasks, WER is computed in one shot over the whole
//! corpus: both sides are flattened to Kaldi text archives and compute-wer
//! is invoked once.

use eyre::{Result, WrapErr, eyre};
use speval_core::report::Report;
use speval_core::scorer::{run_scorer, value_after_marker};
use speval_core::transcript::dir_to_manifest;
use std::fmt;
use std::path::{Path, PathBuf};

const WER_MARKER: &str = "%WER";

/// Evaluation track: per-file JSON transcripts or one transcript manifest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Track {
    One,
    Two,
}

impl Track {
    /// Parse a track from user input. Numeric input is truncated and its
    /// sign dropped; anything outside {1, 2} falls back to track 1 with a
    /// warning.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(value) if value.abs().trunc() == 1.0 => Track::One,
            Ok(value) if value.abs().trunc() == 2.0 => Track::Two,
            _ => {
                tracing::warn!(input = raw, "invalid track number, valid inputs: 1 or 2; using track 1");
                Track::One
            }
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Track::One => f.write_str("1"),
            Track::Two => f.write_str("2"),
        }
    }
}

/// CLI arguments for ASR scoring.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Reference directory of JSON transcripts (track 1) or manifest file (track 2)
    #[arg(long = "ref")]
    pub reference: PathBuf,

    /// Hypothesis directory of JSON transcripts (track 1) or manifest file (track 2)
    #[arg(long = "hyp")]
    pub hypothesis: PathBuf,

    /// Base path of a local Kaldi installation
    #[arg(long)]
    pub kaldi: PathBuf,

    /// Evaluation track (1 or 2)
    #[arg(long, default_value = "1")]
    pub track: String,

    /// Report path (default: timestamped file in the results directory)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Keep an existing report instead of overwriting it
    #[arg(long)]
    pub no_clobber: bool,
}

/// Resolved configuration for ASR scoring.
#[derive(Debug)]
pub struct Config {
    pub reference: PathBuf,
    pub hypothesis: PathBuf,
    pub compute_wer: PathBuf,
    pub track: Track,
    pub out: PathBuf,
    pub clobber: bool,
}

impl TryFrom<Args> for Config {
    type Error = eyre::Error;

    fn try_from(args: Args) -> Result<Self> {
        let track = Track::parse(&args.track);
        match track {
            Track::One => {
                crate::paths::require_dir(&args.reference)?;
                crate::paths::require_dir(&args.hypothesis)?;
            }
            Track::Two => {
                crate::paths::require_file(&args.reference)?;
                crate::paths::require_file(&args.hypothesis)?;
            }
        }
        crate::paths::require_dir(&args.kaldi)?;

        Ok(Self {
            reference: args.reference,
            hypothesis: args.hypothesis,
            compute_wer: args.kaldi.join("src/bin/compute-wer"),
            track,
            out: crate::paths::resolve_out(args.out, "ASR_WER")?,
            clobber: !args.no_clobber,
        })
    }
}

pub fn execute(config: Config) -> Result<()> {
    let kind = match config.track {
        Track::One => "Directory",
        Track::Two => "File",
    };

    let mut report = Report::new();
    report.banner("ASR system evaluation", 40);
    report.kv(
        "Word Error Rate evaluation for",
        format!("Track-{}", config.track),
    );
    report.kv(
        format!("Ground Truth {kind} Path"),
        config.reference.display(),
    );
    report.kv(
        format!("System Output {kind} Path"),
        config.hypothesis.display(),
    );
    report.blank();

    let (ref_text, hyp_text) = match config.track {
        Track::One => {
            let work_dir = crate::paths::work_dir()?;
            let ref_text = dir_to_manifest(&config.reference, "ref", &work_dir)
                .wrap_err("failed to flatten reference transcripts")?;
            let hyp_text = dir_to_manifest(&config.hypothesis, "hyp", &work_dir)
                .wrap_err("failed to flatten hypothesis transcripts")?;
            ensure_nonempty(&ref_text, "reference")?;
            ensure_nonempty(&hyp_text, "system output")?;
            (ref_text, hyp_text)
        }
        Track::Two => (config.reference.clone(), config.hypothesis.clone()),
    };

    tracing::info!(track = %config.track, "computing corpus WER");

    let output = run_scorer(
        &config.compute_wer,
        [
            "--text".to_string(),
            "--mode=all".to_string(),
            format!("ark:{}", ref_text.display()),
            format!("ark:{}", hyp_text.display()),
        ],
    )?;
    report.tool_output(&output);
    report.blank();

    match value_after_marker(&output, WER_MARKER) {
        Some(wer) => {
            let overall = format!(
                "OVERALL WER Result for ASR Track-{} Task: {wer} %",
                config.track
            );
            report.result(&overall, 60);
            println!("{overall}");
        }
        None => {
            tracing::warn!("error computing WER, check the report for the tool output");
            report.text("Error in computing WER. Please check the output above for logs.");
        }
    }

    report
        .write_to(&config.out, config.clobber)
        .wrap_err("failed to write report")?;
    println!("Scores written to: {}", config.out.display());

    Ok(())
}

/// A flattened transcript archive with no lines means the source directory
/// had no usable files; that is fatal before the scorer runs.
fn ensure_nonempty(manifest: &Path, side: &str) -> Result<()> {
    let content = std::fs::read_to_string(manifest)?;
    if content.trim().is_empty() {
        return Err(eyre!("no {side} files found, cannot provide a score"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_track_numbers() {
        assert_eq!(Track::parse("1"), Track::One);
        assert_eq!(Track::parse("2"), Track::Two);
    }

    #[test]
    fn track_sign_and_fraction_are_dropped() {
        assert_eq!(Track::parse("-2"), Track::Two);
        assert_eq!(Track::parse("1.5"), Track::One);
        assert_eq!(Track::parse("2.9"), Track::Two);
    }

    #[test]
    fn invalid_track_falls_back_to_one() {
        assert_eq!(Track::parse("x"), Track::One);
        assert_eq!(Track::parse("3"), Track::One);
        assert_eq!(Track::parse(""), Track::One);
    }
}
