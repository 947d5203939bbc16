//! Sad subcommand - speech activity detection cost via the NIST scorer.
//!
//! Each paired file is scored by the NIST `scoreFile_SAD.pl` script through
//! a Perl interpreter. The script prints a DCF table covering every collar;
//! the value for the requested collar is read from its fixed row.

use eyre::{Result, WrapErr};
use speval_core::aggregate::{MeanSummary, round_to};
use speval_core::collar::Collar;
use speval_core::pairing::{DiagnosticsStyle, Source, pair};
use speval_core::report::Report;
use speval_core::scorer::{run_scorer, sad_dcf_from_table};
use speval_core::types::{FileId, MetricRecord, MetricValue};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_COLLAR: Collar = Collar::Half;

/// CLI arguments for speech activity detection scoring.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Reference directory holding ground-truth SAD files
    #[arg(long = "ref")]
    pub reference: PathBuf,

    /// Hypothesis directory holding SAD system output files
    #[arg(long = "hyp")]
    pub hypothesis: PathBuf,

    /// Path to the NIST scoreFile_SAD.pl script
    #[arg(long)]
    pub scorer: PathBuf,

    /// Perl interpreter used to run the scorer
    #[arg(long, default_value = "perl")]
    pub perl: String,

    /// Forgiveness collar in seconds (0, 0.25, 0.5, 1, 2)
    #[arg(long, default_value_t = 0.5)]
    pub collar: f64,

    /// Report path (default: timestamped file in the results directory)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Keep an existing report instead of overwriting it
    #[arg(long)]
    pub no_clobber: bool,
}

/// Resolved configuration for speech activity detection scoring.
#[derive(Debug)]
pub struct Config {
    pub reference: PathBuf,
    pub hypothesis: PathBuf,
    pub scorer: PathBuf,
    pub perl: String,
    pub collar: Collar,
    pub out: PathBuf,
    pub clobber: bool,
}

impl TryFrom<Args> for Config {
    type Error = eyre::Error;

    fn try_from(args: Args) -> Result<Self> {
        crate::paths::require_dir(&args.reference)?;
        crate::paths::require_dir(&args.hypothesis)?;
        crate::paths::require_file(&args.scorer)?;

        let collar = Collar::parse(args.collar).unwrap_or_else(|| {
            tracing::warn!(
                requested = args.collar,
                default = DEFAULT_COLLAR.as_arg(),
                "collar not allowed, using default; allowed: 0, 0.25, 0.5, 1, 2"
            );
            DEFAULT_COLLAR
        });

        Ok(Self {
            reference: args.reference,
            hypothesis: args.hypothesis,
            scorer: args.scorer,
            perl: args.perl,
            collar,
            out: crate::paths::resolve_out(args.out, "SAD_DCF")?,
            clobber: !args.no_clobber,
        })
    }
}

pub fn execute(config: Config) -> Result<()> {
    let mut report = Report::new();
    report.banner("SAD system evaluation", 40);
    report.kv("Ground Truth Directory Path", config.reference.display());
    report.kv("System Output Directory Path", config.hypothesis.display());
    report.kv("Forgiveness collar for SAD evaluation", config.collar);

    let paired = pair(
        &Source::Directory(config.reference.clone()),
        &Source::Directory(config.hypothesis.clone()),
    )?;
    paired.describe(&mut report, DiagnosticsStyle::ListScored);

    tracing::info!(files = paired.len(), collar = %config.collar, "scoring SAD output");

    let work_dir = crate::paths::work_dir()?;
    let mut record = MetricRecord::new();
    for (id, ref_entry, hyp_entry) in paired.iter() {
        let ref_file = ref_entry.as_file().expect("directory sources yield files");
        let hyp_file = hyp_entry.as_file().expect("directory sources yield files");
        let dcf = score_file(&config, id, ref_file, hyp_file, &work_dir)?;
        record.record(id.clone(), dcf);
    }

    let summary = MeanSummary::from_record(&record)
        .wrap_err("DCF aggregation failed, no file was scored successfully")?;

    if !summary.failed.is_empty() {
        report.text(format!(
            "The following files could not be scored:\n\t{}\nPlease check the system output for errors.",
            summary
                .failed
                .iter()
                .map(FileId::as_str)
                .collect::<Vec<_>>()
                .join(" ")
        ));
    }
    report.kv("Files Successfully Evaluated", summary.scored);

    report.blank();
    report.text("\t---Individual DCF Scores---");
    report.text("   File Name\t:\t  DCF");
    for (id, value) in record.iter() {
        if let MetricValue::Score(dcf) = value {
            report.score_row(id, dcf);
        }
    }

    let overall = format!(
        "OVERALL DCF Result for SAD Task: {} ({} %)",
        summary.mean,
        round_to(summary.mean * 100.0, 3)
    );
    report.blank();
    report.result(&overall, 60);
    println!("{overall}");

    report
        .write_to(&config.out, config.clobber)
        .wrap_err("failed to write report")?;
    println!("Scores written to: {}", config.out.display());

    Ok(())
}

/// Score one reference/hypothesis pair through the NIST scorer.
///
/// The scorer insists on writing a `-o` output file; it is given a work-dir
/// path and removed afterwards, only the captured table matters.
fn score_file(
    config: &Config,
    id: &FileId,
    ref_file: &Path,
    hyp_file: &Path,
    work_dir: &Path,
) -> Result<MetricValue> {
    let temp_out = work_dir.join(format!("{id}.out"));
    let _ = fs::remove_file(&temp_out);

    let output = run_scorer(
        &config.perl,
        [
            config.scorer.as_os_str(),
            "-r".as_ref(),
            ref_file.as_os_str(),
            "-h".as_ref(),
            hyp_file.as_os_str(),
            "-s".as_ref(),
            "2".as_ref(),
            "-e".as_ref(),
            "3".as_ref(),
            "-g".as_ref(),
            "4".as_ref(),
            "-t".as_ref(),
            "5".as_ref(),
            "-f".as_ref(),
            "6".as_ref(),
            "-u".as_ref(),
            "7".as_ref(),
            "-o".as_ref(),
            temp_out.as_os_str(),
        ],
    )?;
    let _ = fs::remove_file(&temp_out);

    match sad_dcf_from_table(&output, config.collar) {
        Some(dcf) => Ok(MetricValue::Score(dcf)),
        None => {
            tracing::warn!(file = %id, "no DCF value in scorer output");
            Ok(MetricValue::Failed)
        }
    }
}
