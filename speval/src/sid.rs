//! Sid subcommand - Top-N speaker identification accuracy.
//!
//! The only task scored entirely in-process: the reference manifest maps
//! each utterance to its true speaker, the hypothesis manifest carries
//! ranked speaker predictions, and a prediction is correct at N when the
//! true speaker appears among the first N candidates.

use eyre::{Result, WrapErr};
use speval_core::aggregate::TopNSummary;
use speval_core::manifest::{self, ManifestKind};
use speval_core::pairing::{DiagnosticsStyle, Source, pair};
use speval_core::report::Report;
use speval_core::types::FileId;
use std::path::PathBuf;

const DEFAULT_TOP_N: usize = 5;

/// CLI arguments for speaker identification scoring.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Reference manifest mapping utterance ids to speaker identities
    #[arg(long = "ref")]
    pub reference: PathBuf,

    /// Hypothesis manifest with ranked speaker predictions per utterance
    #[arg(long = "hyp")]
    pub hypothesis: PathBuf,

    /// N bound for Top-N accuracy scoring
    #[arg(long, default_value_t = 5)]
    pub top_n: i64,

    /// Report path (default: timestamped file in the results directory)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Keep an existing report instead of overwriting it
    #[arg(long)]
    pub no_clobber: bool,
}

/// Resolved configuration for speaker identification scoring.
#[derive(Debug)]
pub struct Config {
    pub reference: PathBuf,
    pub hypothesis: PathBuf,
    pub top_n: usize,
    pub out: PathBuf,
    pub clobber: bool,
}

impl TryFrom<Args> for Config {
    type Error = eyre::Error;

    fn try_from(args: Args) -> Result<Self> {
        crate::paths::require_file(&args.reference)?;
        crate::paths::require_file(&args.hypothesis)?;

        // Structural consistency check of the ranked manifest; also yields
        // the largest N the predictions can support.
        let max_top_n = manifest::ranked_width(&args.hypothesis)
            .wrap_err("hypothesis manifest is not usable for Top-N scoring")?;

        let mut top_n = if args.top_n < 1 {
            tracing::warn!(
                requested = args.top_n,
                "Top-N must be greater than 0, using default"
            );
            DEFAULT_TOP_N
        } else {
            args.top_n as usize
        };
        if top_n > max_top_n {
            tracing::warn!(
                requested = top_n,
                available = max_top_n,
                "Top-N cannot exceed the number of system predictions, clamping"
            );
            top_n = max_top_n;
        }

        Ok(Self {
            reference: args.reference,
            hypothesis: args.hypothesis,
            top_n,
            out: crate::paths::resolve_out(args.out, "SID_TopN")?,
            clobber: !args.no_clobber,
        })
    }
}

pub fn execute(config: Config) -> Result<()> {
    let mut report = Report::new();
    report.banner("SID system evaluation", 40);
    report.kv("Ground Truth File Path", config.reference.display());
    report.kv("System Output File Path", config.hypothesis.display());
    report.kv("N value for Top-N Accuracy Scoring", config.top_n);

    let paired = pair(
        &Source::Manifest {
            path: config.reference.clone(),
            kind: ManifestKind::Identity,
        },
        &Source::Manifest {
            path: config.hypothesis.clone(),
            kind: ManifestKind::Ranked,
        },
    )?;
    paired.describe(&mut report, DiagnosticsStyle::ListMissing);

    tracing::info!(utterances = paired.len(), top_n = config.top_n, "scoring SID output");

    let summary = TopNSummary::score(&paired, config.top_n)?;

    report.text("Individual results (per file) written to the following paths:");
    for split in summary.splits() {
        let side_path = crate::paths::log_path_for(&config.out, &format!(".Top-{}", split.n))?;
        write_side_report(split, &side_path)?;
        report.text(side_path.display().to_string());
    }

    report.blank();
    report.banner("Top-N Accuracy System Evaluation Results", 40);
    for split in summary.splits() {
        report.kv(format!("Top-{} Accuracy", split.n), format!("{} %", split.accuracy()));
    }

    let headline = summary.headline();
    let overall = format!(
        "Top-{} Accuracy Result for SID Task : {} %",
        headline.n,
        headline.accuracy()
    );
    report.blank();
    report.result(&overall, 50);
    println!("{overall}");

    report
        .write_to(&config.out, config.clobber)
        .wrap_err("failed to write report")?;
    println!("Scores written to: {}", config.out.display());

    Ok(())
}

/// One side report per N: which utterances were classified correct and
/// incorrect at that bound.
fn write_side_report(
    split: &speval_core::aggregate::RankSplit,
    path: &std::path::Path,
) -> Result<()> {
    fn joined(ids: &[FileId]) -> String {
        ids.iter().map(FileId::as_str).collect::<Vec<_>>().join(" ")
    }

    let mut side = Report::new();
    side.banner(format!("Per File SID Top-{} Accuracy Results", split.n), 40);
    side.blank();
    side.text(format!("Correct Predictions:\n{}", joined(&split.correct)));
    side.blank();
    side.text(format!(
        "Incorrect Predictions:\n{}",
        joined(&split.incorrect)
    ));

    side.write_to(path, true)
        .wrap_err_with(|| format!("failed to write side report: {}", path.display()))?;
    Ok(())
}
