//! External scorer invocation and output scraping.
//!
//! All metric computation is delegated to third-party tools (Kaldi
//! `compute-wer`, dscore, the NIST SAD scorer). Each tool is run as a
//! blocking subprocess and its combined stdout/stderr text is scraped for a
//! fixed marker; the token after the marker is the metric. The marker
//! strings and token positions are the wire contract with those tools and
//! must not change. Nothing outside this module touches subprocess
//! mechanics.

use crate::collar::Collar;
use crate::error::ScorerError;
use std::ffi::OsStr;
use std::process::Command;

/// Run an external scorer and capture its combined stdout/stderr text.
///
/// Blocking, no timeout: a hung tool hangs the run. Sequential invocation is
/// part of the design, there is no parallel scoring.
pub fn run_scorer<I, S>(program: impl AsRef<OsStr>, args: I) -> Result<String, ScorerError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let program = program.as_ref();
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|source| ScorerError::Spawn {
            program: program.to_string_lossy().into_owned(),
            source,
        })?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    if !output.stderr.is_empty() {
        text.push('\n');
        text.push_str(&String::from_utf8_lossy(&output.stderr));
    }

    tracing::debug!(
        program = %program.to_string_lossy(),
        status = ?output.status.code(),
        bytes = text.len(),
        "scorer finished"
    );

    Ok(text)
}

/// The token immediately following the last occurrence of `marker`, parsed
/// as a number. `None` when the marker is absent or the token is not
/// numeric; the caller records that unit as failed.
pub fn value_after_marker(output: &str, marker: &str) -> Option<f64> {
    let (_, tail) = output.rsplit_once(marker)?;
    tail.split_whitespace().next()?.parse().ok()
}

/// DCF value for one collar from the NIST SAD scorer's output table.
///
/// The scorer prints a fixed-layout table: after collapsing doubled blank
/// lines and dropping the two header lines, each collar's DCF sits at a
/// known row, third token.
pub fn sad_dcf_from_table(output: &str, collar: Collar) -> Option<f64> {
    let collapsed = output.trim().replace("\n\n", "\n");
    let row = collapsed
        .lines()
        .map(str::trim)
        .skip(2)
        .nth(collar.sad_table_row())?;
    row.split_whitespace().nth(2)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_token_after_last_marker() {
        let output = "%WER 50.0 [ 2 / 4 ]\nnoise\n%WER 10.53 [ 2 / 19, 0 ins ]\n";
        assert_eq!(value_after_marker(output, "%WER"), Some(10.53));
    }

    #[test]
    fn missing_marker_is_none() {
        assert_eq!(value_after_marker("no result here", "%WER"), None);
    }

    #[test]
    fn non_numeric_token_is_none() {
        assert_eq!(value_after_marker("%WER oops 1.0", "%WER"), None);
    }

    #[test]
    fn der_marker_spans_lines() {
        let output = "file scores...\n*** OVERALL ***\n  12.34  5.0  1.2\n";
        assert_eq!(value_after_marker(output, "*** OVERALL ***"), Some(12.34));
    }

    fn sad_table() -> String {
        // header (2 lines dropped) + 4 rows per collar block
        let mut lines = vec!["cmd echo".to_string(), "header".to_string()];
        for (collar, dcf) in [
            ("0.0", "0.101"),
            ("0.25", "0.202"),
            ("0.5", "0.303"),
            ("1.0", "0.404"),
            ("2.0", "0.505"),
        ] {
            lines.push(format!("collar {collar}"));
            lines.push("TPR FPR".to_string());
            lines.push("0.9 0.1".to_string());
            lines.push(format!("DCF = {dcf}"));
        }
        lines.join("\n")
    }

    #[test]
    fn sad_table_row_per_collar() {
        let table = sad_table();
        assert_eq!(sad_dcf_from_table(&table, Collar::Zero), Some(0.101));
        assert_eq!(sad_dcf_from_table(&table, Collar::Half), Some(0.303));
        assert_eq!(sad_dcf_from_table(&table, Collar::Two), Some(0.505));
    }

    #[test]
    fn truncated_sad_table_is_none() {
        assert_eq!(sad_dcf_from_table("a\nb\nc\n", Collar::Two), None);
    }
}
