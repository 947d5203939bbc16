//! Reference/hypothesis file pairing.
//!
//! Both sides of an evaluation are enumerated into identifier-keyed entries,
//! then reduced to the set of identifiers present on both sides. Identifiers
//! missing from either side are kept for diagnostics but never scored.

use crate::error::PairingError;
use crate::manifest::{self, ManifestKind};
use crate::report::Report;
use crate::types::{Entry, FileId};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A reference or hypothesis source of scorable units.
#[derive(Clone, Debug)]
pub enum Source {
    /// Directory whose every regular file is one unit. Not recursive.
    Directory(PathBuf),
    /// Line-oriented manifest file.
    Manifest { path: PathBuf, kind: ManifestKind },
}

impl Source {
    pub fn path(&self) -> &Path {
        match self {
            Source::Directory(path) => path,
            Source::Manifest { path, .. } => path,
        }
    }

    /// Enumerate this source into identifier-keyed entries.
    ///
    /// Duplicate identifiers within one source resolve last-write-wins; two
    /// files whose names differ only in extension collapse to one entry.
    pub fn entries(&self) -> crate::error::Result<BTreeMap<FileId, Entry>> {
        match self {
            Source::Directory(dir) => {
                let mut entries = BTreeMap::new();
                let read_dir = fs::read_dir(dir).map_err(|source| PairingError::Io {
                    path: dir.clone(),
                    source,
                })?;
                for dirent in read_dir {
                    let dirent = dirent.map_err(|source| PairingError::Io {
                        path: dir.clone(),
                        source,
                    })?;
                    let path = dirent.path();
                    if path.is_file() {
                        entries.insert(FileId::from_path(&path), Entry::File(path));
                    }
                }
                Ok(entries)
            }
            Source::Manifest { path, kind } => Ok(manifest::parse(path, *kind)?),
        }
    }
}

/// The pairing outcome: identifiers common to both sides, plus what is
/// missing from each side.
#[derive(Debug)]
pub struct PairedFiles {
    common: Vec<FileId>,
    missing_from_hyp: Vec<FileId>,
    missing_from_ref: Vec<FileId>,
    ref_entries: BTreeMap<FileId, Entry>,
    hyp_entries: BTreeMap<FileId, Entry>,
}

impl PairedFiles {
    /// Common identifiers, lexicographically ascending.
    pub fn common(&self) -> &[FileId] {
        &self.common
    }

    /// Reference identifiers with no hypothesis counterpart, ascending.
    pub fn missing_from_hyp(&self) -> &[FileId] {
        &self.missing_from_hyp
    }

    /// Hypothesis identifiers with no reference counterpart, ascending.
    pub fn missing_from_ref(&self) -> &[FileId] {
        &self.missing_from_ref
    }

    pub fn len(&self) -> usize {
        self.common.len()
    }

    pub fn is_empty(&self) -> bool {
        self.common.is_empty()
    }

    /// Reference entry for a common identifier.
    pub fn ref_entry(&self, id: &FileId) -> Option<&Entry> {
        self.ref_entries.get(id)
    }

    /// Hypothesis entry for a common identifier.
    pub fn hyp_entry(&self, id: &FileId) -> Option<&Entry> {
        self.hyp_entries.get(id)
    }

    /// Iterate common identifiers with both entries, in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (&FileId, &Entry, &Entry)> {
        self.common
            .iter()
            .map(|id| (id, &self.ref_entries[id], &self.hyp_entries[id]))
    }

    /// Append pairing diagnostics to a report.
    ///
    /// Always reports how many units will be scored. Directory-backed runs
    /// list every identifier to be scored; manifest-backed runs list the
    /// identifiers missing on each side, when any are.
    pub fn describe(&self, report: &mut Report, style: DiagnosticsStyle) {
        fn joined(ids: &[FileId]) -> String {
            ids.iter()
                .map(FileId::as_str)
                .collect::<Vec<_>>()
                .join(" ")
        }

        report.blank();
        report.kv("Total Files to be Evaluated", self.len());
        match style {
            DiagnosticsStyle::ListScored => {
                report.text(format!("Scoring File Names:\n{}", joined(&self.common)));
            }
            DiagnosticsStyle::ListMissing => {
                if self.missing_from_hyp.is_empty() && self.missing_from_ref.is_empty() {
                    report.text("No files missing from evaluation list.");
                }
                if !self.missing_from_hyp.is_empty() {
                    report.kv(
                        "Files missing from system output",
                        self.missing_from_hyp.len(),
                    );
                    report.text(format!(
                        "Missing File Names:\n{}",
                        joined(&self.missing_from_hyp)
                    ));
                }
                if !self.missing_from_ref.is_empty() {
                    report.kv(
                        "Files missing from reference",
                        self.missing_from_ref.len(),
                    );
                    report.text(format!(
                        "Missing File Names:\n{}",
                        joined(&self.missing_from_ref)
                    ));
                }
            }
        }
        report.blank();
    }
}

/// How pairing diagnostics list identifiers in the report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticsStyle {
    /// List every identifier that will be scored (directory sources).
    ListScored,
    /// List only identifiers missing on either side (manifest sources).
    ListMissing,
}

/// Pair a reference source with a hypothesis source.
///
/// Fails when either side is empty or when the two sides share no
/// identifiers. Missing identifiers on either side are informational and do
/// not abort the run.
pub fn pair(ref_source: &Source, hyp_source: &Source) -> crate::error::Result<PairedFiles> {
    let mut ref_entries = ref_source.entries()?;
    let mut hyp_entries = hyp_source.entries()?;

    if ref_entries.is_empty() {
        return Err(PairingError::EmptyRef {
            path: ref_source.path().to_path_buf(),
        }
        .into());
    }
    if hyp_entries.is_empty() {
        return Err(PairingError::EmptyHyp {
            path: hyp_source.path().to_path_buf(),
        }
        .into());
    }

    let missing_from_hyp: Vec<FileId> = ref_entries
        .keys()
        .filter(|id| !hyp_entries.contains_key(id))
        .cloned()
        .collect();
    let missing_from_ref: Vec<FileId> = hyp_entries
        .keys()
        .filter(|id| !ref_entries.contains_key(id))
        .cloned()
        .collect();

    let common: Vec<FileId> = ref_entries
        .keys()
        .filter(|id| hyp_entries.contains_key(id))
        .cloned()
        .collect();

    if common.is_empty() {
        return Err(PairingError::NoCommonFiles.into());
    }

    tracing::debug!(
        common = common.len(),
        missing_from_hyp = missing_from_hyp.len(),
        missing_from_ref = missing_from_ref.len(),
        "paired sources"
    );

    ref_entries.retain(|id, _| hyp_entries.contains_key(id));
    hyp_entries.retain(|id, _| ref_entries.contains_key(id));

    Ok(PairedFiles {
        common,
        missing_from_hyp,
        missing_from_ref,
        ref_entries,
        hyp_entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn dir_with(names: &[&str]) -> TempDir {
        let dir = TempDir::new().expect("create temp dir");
        for name in names {
            File::create(dir.path().join(name)).expect("create file");
        }
        dir
    }

    fn sources(ref_names: &[&str], hyp_names: &[&str]) -> (TempDir, TempDir) {
        (dir_with(ref_names), dir_with(hyp_names))
    }

    fn ids(list: &[FileId]) -> Vec<&str> {
        list.iter().map(FileId::as_str).collect()
    }

    #[test]
    fn common_set_is_sorted_intersection() {
        let (ref_dir, hyp_dir) = sources(
            &["c.rttm", "a.rttm", "b.rttm"],
            &["b.rttm", "d.rttm", "a.rttm"],
        );
        let paired = pair(
            &Source::Directory(ref_dir.path().to_path_buf()),
            &Source::Directory(hyp_dir.path().to_path_buf()),
        )
        .unwrap();

        assert_eq!(ids(paired.common()), ["a", "b"]);
        assert_eq!(ids(paired.missing_from_hyp()), ["c"]);
        assert_eq!(ids(paired.missing_from_ref()), ["d"]);
    }

    #[test]
    fn pairing_is_idempotent() {
        let (ref_dir, hyp_dir) = sources(&["a.txt", "b.txt", "x.txt"], &["b.txt", "a.txt"]);
        let ref_source = Source::Directory(ref_dir.path().to_path_buf());
        let hyp_source = Source::Directory(hyp_dir.path().to_path_buf());

        let first = pair(&ref_source, &hyp_source).unwrap();
        let second = pair(&ref_source, &hyp_source).unwrap();

        assert_eq!(first.common(), second.common());
        assert_eq!(first.missing_from_hyp(), second.missing_from_hyp());
        assert_eq!(first.missing_from_ref(), second.missing_from_ref());
    }

    #[test]
    fn common_is_disjoint_from_missing() {
        let (ref_dir, hyp_dir) = sources(&["a.txt", "b.txt", "c.txt"], &["b.txt", "c.txt", "d.txt"]);
        let paired = pair(
            &Source::Directory(ref_dir.path().to_path_buf()),
            &Source::Directory(hyp_dir.path().to_path_buf()),
        )
        .unwrap();

        for id in paired.common() {
            assert!(!paired.missing_from_hyp().contains(id));
            assert!(!paired.missing_from_ref().contains(id));
        }
    }

    #[test]
    fn common_is_strictly_ascending_without_duplicates() {
        let (ref_dir, hyp_dir) = sources(
            &["u3.json", "u1.json", "u2.json"],
            &["u2.json", "u3.json", "u1.json"],
        );
        let paired = pair(
            &Source::Directory(ref_dir.path().to_path_buf()),
            &Source::Directory(hyp_dir.path().to_path_buf()),
        )
        .unwrap();

        let common = paired.common();
        assert!(common.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn empty_ref_side_is_fatal() {
        let (ref_dir, hyp_dir) = sources(&[], &["a.txt"]);
        let err = pair(
            &Source::Directory(ref_dir.path().to_path_buf()),
            &Source::Directory(hyp_dir.path().to_path_buf()),
        )
        .unwrap_err();

        assert!(matches!(err, Error::Pairing(PairingError::EmptyRef { .. })));
    }

    #[test]
    fn empty_hyp_side_is_fatal() {
        let (ref_dir, hyp_dir) = sources(&["a.txt"], &[]);
        let err = pair(
            &Source::Directory(ref_dir.path().to_path_buf()),
            &Source::Directory(hyp_dir.path().to_path_buf()),
        )
        .unwrap_err();

        assert!(matches!(err, Error::Pairing(PairingError::EmptyHyp { .. })));
    }

    #[test]
    fn disjoint_sides_are_fatal() {
        let (ref_dir, hyp_dir) = sources(&["a.txt"], &["b.txt"]);
        let err = pair(
            &Source::Directory(ref_dir.path().to_path_buf()),
            &Source::Directory(hyp_dir.path().to_path_buf()),
        )
        .unwrap_err();

        assert!(matches!(err, Error::Pairing(PairingError::NoCommonFiles)));
    }

    #[test]
    fn manifest_sources_pair_by_first_token() {
        let dir = TempDir::new().unwrap();
        let ref_path = dir.path().join("ref.txt");
        let hyp_path = dir.path().join("hyp.txt");
        let mut ref_file = File::create(&ref_path).unwrap();
        writeln!(ref_file, "u1 spkA\nu2 spkB").unwrap();
        let mut hyp_file = File::create(&hyp_path).unwrap();
        writeln!(hyp_file, "u2 spkB spkC\nu3 spkA spkD").unwrap();

        let paired = pair(
            &Source::Manifest {
                path: ref_path,
                kind: ManifestKind::Identity,
            },
            &Source::Manifest {
                path: hyp_path,
                kind: ManifestKind::Ranked,
            },
        )
        .unwrap();

        assert_eq!(ids(paired.common()), ["u2"]);
        assert_eq!(ids(paired.missing_from_hyp()), ["u1"]);
        assert_eq!(ids(paired.missing_from_ref()), ["u3"]);
        assert_eq!(
            paired.hyp_entry(&FileId::from("u2")).unwrap().as_ranked(),
            Some(&["spkB".to_string(), "spkC".to_string()][..])
        );
    }

    #[test]
    fn diagnostics_list_scored_identifiers() {
        let (ref_dir, hyp_dir) = sources(&["a.txt", "b.txt"], &["a.txt", "b.txt", "c.txt"]);
        let paired = pair(
            &Source::Directory(ref_dir.path().to_path_buf()),
            &Source::Directory(hyp_dir.path().to_path_buf()),
        )
        .unwrap();

        let mut report = Report::new();
        paired.describe(&mut report, DiagnosticsStyle::ListScored);
        let text = report.render();

        assert!(text.contains("Total Files to be Evaluated : 2"));
        assert!(text.contains("Scoring File Names:\na b"));
    }

    #[test]
    fn diagnostics_list_missing_identifiers_per_side() {
        let (ref_dir, hyp_dir) = sources(&["a.txt", "b.txt"], &["a.txt", "c.txt"]);
        let paired = pair(
            &Source::Directory(ref_dir.path().to_path_buf()),
            &Source::Directory(hyp_dir.path().to_path_buf()),
        )
        .unwrap();

        let mut report = Report::new();
        paired.describe(&mut report, DiagnosticsStyle::ListMissing);
        let text = report.render();

        assert!(text.contains("Files missing from system output : 1"));
        assert!(text.contains("Files missing from reference : 1"));
        assert!(!text.contains("No files missing"));
    }

    #[test]
    fn subdirectories_are_not_entries() {
        let ref_dir = dir_with(&["a.txt"]);
        std::fs::create_dir(ref_dir.path().join("nested")).unwrap();
        let hyp_dir = dir_with(&["a.txt"]);

        let paired = pair(
            &Source::Directory(ref_dir.path().to_path_buf()),
            &Source::Directory(hyp_dir.path().to_path_buf()),
        )
        .unwrap();

        assert_eq!(ids(paired.common()), ["a"]);
    }
}
