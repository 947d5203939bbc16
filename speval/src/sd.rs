//! Sd subcommand - diarization error rate via the dscore toolkit.
//!
//! Each paired RTTM file is validated and scored by two dscore scripts run
//! through a Python interpreter; the per-file DER values are averaged into
//! the overall result.

use eyre::{Result, WrapErr, eyre};
use speval_core::aggregate::MeanSummary;
use speval_core::collar::Collar;
use speval_core::pairing::{DiagnosticsStyle, Source, pair};
use speval_core::report::Report;
use speval_core::scorer::{run_scorer, value_after_marker};
use speval_core::types::{FileId, MetricRecord, MetricValue};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

const OVERALL_MARKER: &str = "*** OVERALL ***";
const DEFAULT_COLLAR: Collar = Collar::Quarter;

/// CLI arguments for diarization scoring.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Reference directory holding ground-truth RTTM/ and UEM/ folders
    #[arg(long = "ref")]
    pub reference: PathBuf,

    /// Hypothesis directory holding system output RTTM files
    #[arg(long = "hyp")]
    pub hypothesis: PathBuf,

    /// Directory of a dscore checkout (validate_rttm.py, score.py)
    #[arg(long)]
    pub scorer: PathBuf,

    /// Python interpreter used to run dscore
    #[arg(long, default_value = "python")]
    pub python: String,

    /// Forgiveness collar in seconds (0, 0.25, 0.5, 1, 2)
    #[arg(long, default_value_t = 0.25)]
    pub collar: f64,

    /// Report path (default: timestamped file in the results directory)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Keep an existing report instead of overwriting it
    #[arg(long)]
    pub no_clobber: bool,
}

/// Resolved configuration for diarization scoring.
#[derive(Debug)]
pub struct Config {
    pub rttm_dir: PathBuf,
    pub uem_dir: PathBuf,
    pub hypothesis: PathBuf,
    pub validate_script: PathBuf,
    pub score_script: PathBuf,
    pub python: String,
    pub collar: Collar,
    pub out: PathBuf,
    pub clobber: bool,
}

impl TryFrom<Args> for Config {
    type Error = eyre::Error;

    fn try_from(args: Args) -> Result<Self> {
        crate::paths::require_dir(&args.reference)?;
        crate::paths::require_dir(&args.hypothesis)?;

        let rttm_dir = args.reference.join("RTTM");
        let uem_dir = args.reference.join("UEM");
        if !rttm_dir.is_dir() {
            return Err(eyre!("ground truth RTTM folder does not exist in ref path"));
        }
        if !uem_dir.is_dir() {
            return Err(eyre!("ground truth UEM folder does not exist in ref path"));
        }
        check_ref_consistency(&rttm_dir, &uem_dir)?;

        let validate_script = args.scorer.join("validate_rttm.py");
        let score_script = args.scorer.join("score.py");
        crate::paths::require_file(&validate_script)?;
        crate::paths::require_file(&score_script)?;

        let collar = Collar::parse(args.collar).unwrap_or_else(|| {
            tracing::warn!(
                requested = args.collar,
                default = DEFAULT_COLLAR.as_arg(),
                "collar not allowed, using default; allowed: 0, 0.25, 0.5, 1, 2"
            );
            DEFAULT_COLLAR
        });

        Ok(Self {
            rttm_dir,
            uem_dir,
            hypothesis: args.hypothesis,
            validate_script,
            score_script,
            python: args.python,
            collar,
            out: crate::paths::resolve_out(args.out, "SD_DER")?,
            clobber: !args.no_clobber,
        })
    }
}

/// The ground-truth RTTM and UEM folders must cover the same identifiers.
fn check_ref_consistency(rttm_dir: &Path, uem_dir: &Path) -> Result<()> {
    let list_ids = |dir: &Path| -> Result<BTreeSet<FileId>> {
        let mut ids = BTreeSet::new();
        for dirent in
            fs::read_dir(dir).wrap_err_with(|| format!("failed to read {}", dir.display()))?
        {
            let path = dirent?.path();
            if path.is_file() {
                ids.insert(FileId::from_path(&path));
            }
        }
        Ok(ids)
    };

    let rttm_ids = list_ids(rttm_dir)?;
    let uem_ids = list_ids(uem_dir)?;
    if rttm_ids.is_empty() {
        return Err(eyre!("no RTTM files found in ref path, cannot provide score"));
    }
    if uem_ids.is_empty() {
        return Err(eyre!("no UEM files found in ref path, cannot provide score"));
    }

    let missing_uem: Vec<String> = rttm_ids
        .difference(&uem_ids)
        .map(|id| format!("{id}.uem"))
        .collect();
    let missing_rttm: Vec<String> = uem_ids
        .difference(&rttm_ids)
        .map(|id| format!("{id}.rttm"))
        .collect();

    if !missing_uem.is_empty() || !missing_rttm.is_empty() {
        let mut missing = missing_uem;
        missing.extend(missing_rttm);
        return Err(eyre!(
            "uncommon files between ground truth RTTM and UEM folders, missing: {}",
            missing.join(" ")
        ));
    }
    Ok(())
}

pub fn execute(config: Config) -> Result<()> {
    let mut report = Report::new();
    report.banner("SD system evaluation", 60);
    report.kv(
        "Ground Truth Directory Path",
        config.rttm_dir.parent().unwrap_or(&config.rttm_dir).display(),
    );
    report.kv("System Output Directory Path", config.hypothesis.display());
    report.kv("Forgiveness collar for SD evaluation", config.collar);

    let paired = pair(
        &Source::Directory(config.rttm_dir.clone()),
        &Source::Directory(config.hypothesis.clone()),
    )?;
    paired.describe(&mut report, DiagnosticsStyle::ListScored);

    tracing::info!(files = paired.len(), collar = %config.collar, "scoring diarization output");

    let mut record = MetricRecord::new();
    let mut log = Report::new();
    for (id, ref_entry, hyp_entry) in paired.iter() {
        let ref_rttm = ref_entry.as_file().expect("directory entry");
        let hyp_rttm = hyp_entry.as_file().expect("directory entry");
        let ref_uem = config.uem_dir.join(format!("{id}.uem"));

        let der = score_file(&config, id, ref_rttm, hyp_rttm, &ref_uem, &mut log)?;
        record.record(id.clone(), der);
    }

    let log_path = crate::paths::log_path_for(&config.out, ".log")?;
    log.write_to(&log_path, true)
        .wrap_err("failed to write scoring log")?;
    println!("Scoring log written to: {}", log_path.display());

    let summary = MeanSummary::from_record(&record)
        .wrap_err("DER aggregation failed, no file was scored successfully")?;

    report.blank();
    report.kv("Number of Files to be Evaluated", paired.len());
    report.kv("Number of Files Successfully Evaluated", summary.scored);
    if !summary.failed.is_empty() {
        report.text(format!(
            "Files that could not be evaluated:\n\t{}",
            summary
                .failed
                .iter()
                .map(FileId::as_str)
                .collect::<Vec<_>>()
                .join(" ")
        ));
    }

    report.blank();
    report.text("\t---Individual DER Scores---");
    report.text("   File Name\t:\t  DER");
    for (id, value) in record.iter() {
        if let MetricValue::Score(der) = value {
            report.score_row(id, der);
        }
    }

    let overall = format!("OVERALL DER Result for SD Task: {} %", summary.mean);
    report.blank();
    report.result(&overall, 50);
    println!("{overall}");

    report
        .write_to(&config.out, config.clobber)
        .wrap_err("failed to write report")?;
    println!("Scores written to: {}", config.out.display());

    Ok(())
}

/// Validate and score one RTTM pair; tool output goes to the scoring log.
fn score_file(
    config: &Config,
    id: &FileId,
    ref_rttm: &Path,
    hyp_rttm: &Path,
    ref_uem: &Path,
    log: &mut Report,
) -> Result<MetricValue> {
    let validate_out = run_scorer(
        &config.python,
        [
            config.validate_script.as_os_str(),
            ref_rttm.as_os_str(),
            hyp_rttm.as_os_str(),
        ],
    )?;

    let score_out = run_scorer(
        &config.python,
        [
            config.score_script.as_os_str(),
            "--ignore_overlaps".as_ref(),
            "--collar".as_ref(),
            config.collar.as_arg().as_ref(),
            "-u".as_ref(),
            ref_uem.as_os_str(),
            "-r".as_ref(),
            ref_rttm.as_os_str(),
            "-s".as_ref(),
            hyp_rttm.as_os_str(),
        ],
    )?;

    log.text(format!("---Scoring Log for file: {id}---"));
    log.tool_output(&validate_out);
    log.tool_output(&score_out);
    log.blank();

    match value_after_marker(&score_out, OVERALL_MARKER) {
        Some(der) => Ok(MetricValue::Score(der)),
        None => {
            tracing::warn!(file = %id, "error in scoring, see the log file");
            Ok(MetricValue::Failed)
        }
    }
}
