//! Default output locations and run artifacts.
//!
//! Reports land under the user's local data directory unless an explicit
//! output path is given; per-run side files (scoring logs, Top-N lists,
//! temp manifests) go next to them.

use chrono::Local;
use eyre::{OptionExt, Result, WrapErr, eyre};
use std::fs;
use std::path::{Path, PathBuf};

fn base_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("speval")
}

fn ensure(dir: PathBuf) -> Result<PathBuf> {
    fs::create_dir_all(&dir)
        .wrap_err_with(|| format!("failed to create directory: {}", dir.display()))?;
    Ok(dir)
}

/// Directory for result reports, created on demand.
pub fn results_dir() -> Result<PathBuf> {
    ensure(base_dir().join("results"))
}

/// Directory for scoring logs and per-N side reports, created on demand.
pub fn logs_dir() -> Result<PathBuf> {
    ensure(base_dir().join("logs"))
}

/// Directory for transient run artifacts (flattened manifests, scorer temp
/// files), created on demand.
pub fn work_dir() -> Result<PathBuf> {
    ensure(base_dir().join("work"))
}

/// Timestamp suffix for default report names, e.g. `07Aug2026_14-03-59`.
pub fn timestamp() -> String {
    Local::now().format("%d%b%Y_%H-%M-%S").to_string()
}

/// Default report path for a task, e.g. `SD_DER_Result_<timestamp>.txt`.
pub fn default_out(prefix: &str) -> Result<PathBuf> {
    Ok(results_dir()?.join(format!("{prefix}_Result_{}.txt", timestamp())))
}

/// Side-file path in the logs directory derived from the report name:
/// `<logs>/<report file name><suffix>`.
pub fn log_path_for(out: &Path, suffix: &str) -> Result<PathBuf> {
    let name = out
        .file_name()
        .ok_or_eyre("report path has no file name")?
        .to_string_lossy();
    Ok(logs_dir()?.join(format!("{name}{suffix}")))
}

/// Validate that a path names an existing directory.
pub fn require_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        return Err(eyre!(
            "{} is not a directory or does not exist",
            path.display()
        ));
    }
    Ok(())
}

/// Validate that a path names an existing regular file.
pub fn require_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(eyre!("{} does not exist", path.display()));
    }
    Ok(())
}

/// Resolve the report path: explicit path, or task default. The parent
/// directory of an explicit path must already exist.
pub fn resolve_out(out: Option<PathBuf>, prefix: &str) -> Result<PathBuf> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
                && !parent.is_dir()
            {
                return Err(eyre!(
                    "directory of report path does not exist: {}",
                    parent.display()
                ));
            }
            Ok(path)
        }
        None => default_out(prefix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_out_requires_existing_parent() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("result.txt");
        assert_eq!(resolve_out(Some(good.clone()), "SD_DER").unwrap(), good);

        let bad = dir.path().join("missing/result.txt");
        assert!(resolve_out(Some(bad), "SD_DER").is_err());
    }

    #[test]
    fn timestamp_has_no_path_separators() {
        let stamp = timestamp();
        assert!(!stamp.contains('/'));
        assert!(!stamp.contains(' '));
    }
}
