//! Structured result reports.
//!
//! Aggregation code records typed report lines; nothing is formatted until
//! the whole run has finished, when the report is rendered once and written
//! atomically. Failed runs therefore never leave a partial report behind.

use crate::error::ReportError;
use crate::types::FileId;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// One typed report line.
#[derive(Clone, Debug, PartialEq)]
pub enum Line {
    /// Star-framed section header.
    Banner { text: String, width: usize },
    /// Indented `key : value` pair.
    KeyValue { key: String, value: String },
    /// Per-file score row.
    ScoreRow { id: FileId, value: String },
    /// Star-framed overall-result line.
    Result { text: String, width: usize },
    /// Captured external tool output, embedded verbatim.
    ToolOutput(String),
    /// Free-form text.
    Text(String),
    Blank,
}

/// An ordered sequence of report lines, rendered to text only at the end.
#[derive(Debug, Default)]
pub struct Report {
    lines: Vec<Line>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: Line) {
        self.lines.push(line);
    }

    pub fn banner(&mut self, text: impl Into<String>, width: usize) {
        self.push(Line::Banner {
            text: text.into(),
            width,
        });
    }

    pub fn kv(&mut self, key: impl Into<String>, value: impl ToString) {
        self.push(Line::KeyValue {
            key: key.into(),
            value: value.to_string(),
        });
    }

    pub fn score_row(&mut self, id: &FileId, value: impl ToString) {
        self.push(Line::ScoreRow {
            id: id.clone(),
            value: value.to_string(),
        });
    }

    pub fn result(&mut self, text: impl Into<String>, width: usize) {
        self.push(Line::Result {
            text: text.into(),
            width,
        });
    }

    pub fn tool_output(&mut self, output: impl Into<String>) {
        self.push(Line::ToolOutput(output.into()));
    }

    pub fn text(&mut self, text: impl Into<String>) {
        self.push(Line::Text(text.into()));
    }

    pub fn blank(&mut self) {
        self.push(Line::Blank);
    }

    /// Render the report to its final text form. Pure: rendering does not
    /// consume or alter the report.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match line {
                Line::Banner { text, width } => {
                    let stars = "*".repeat(*width);
                    let _ = writeln!(out, "\t\t{stars}");
                    let _ = writeln!(out, "\t\t--{text}--");
                    let _ = writeln!(out, "\t\t{stars}");
                }
                Line::KeyValue { key, value } => {
                    let _ = writeln!(out, "\t{key} : {value}");
                }
                Line::ScoreRow { id, value } => {
                    let _ = writeln!(out, "{id}\t:\t{value}");
                }
                Line::Result { text, width } => {
                    let stars = "*".repeat(*width);
                    let _ = writeln!(out, "\t{stars}");
                    let _ = writeln!(out, "\t{text}");
                    let _ = writeln!(out, "\t{stars}");
                }
                Line::ToolOutput(output) => {
                    let _ = writeln!(out, "{output}");
                }
                Line::Text(text) => {
                    let _ = writeln!(out, "{text}");
                }
                Line::Blank => out.push('\n'),
            }
        }
        out
    }

    /// Render and write the report in one atomic step.
    ///
    /// The text is written to a sibling temp file and renamed into place, so
    /// an interrupt mid-write leaves either the old report or none at all.
    /// With `clobber` unset an existing file is never replaced.
    pub fn write_to(&self, path: &Path, clobber: bool) -> Result<(), ReportError> {
        if !clobber && path.exists() {
            return Err(ReportError::AlreadyExists {
                path: path.to_path_buf(),
            });
        }

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = std::path::PathBuf::from(tmp);

        fs::write(&tmp, self.render())?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}
