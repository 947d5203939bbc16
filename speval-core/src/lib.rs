//! speval-core: file pairing and result aggregation for speech-system
//! evaluation.
//!
//! Metric computation itself (WER, DER, DCF) is delegated to external tools;
//! this crate supplies everything around those tools:
//!
//! - [`pairing`]: match reference and hypothesis sources by derived
//!   identifier, with diagnostics for what is missing on each side
//! - [`manifest`]: line-oriented manifest parsing (transcripts, identities,
//!   ranked predictions)
//! - [`aggregate`]: fold per-file metric values into an overall mean or a
//!   Top-N accuracy table
//! - [`scorer`]: the subprocess seam and marker-based output scraping
//! - [`report`]: typed report lines rendered and written once, at the end
//! - [`transcript`]: ASR track-1 JSON transcript flattening
//!
//! # Quick Start
//!
//! ```no_run
//! use speval_core::pairing::{pair, Source};
//! use speval_core::types::{MetricRecord, MetricValue};
//! use speval_core::aggregate::MeanSummary;
//!
//! # fn main() -> speval_core::error::Result<()> {
//! let paired = pair(
//!     &Source::Directory("ref/".into()),
//!     &Source::Directory("hyp/".into()),
//! )?;
//!
//! let mut record = MetricRecord::new();
//! for (id, _ref_entry, _hyp_entry) in paired.iter() {
//!     record.record(id.clone(), MetricValue::Score(0.0));
//! }
//!
//! let summary = MeanSummary::from_record(&record)?;
//! println!("overall: {}", summary.mean);
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod collar;
pub mod error;
pub mod manifest;
pub mod pairing;
pub mod report;
pub mod scorer;
pub mod transcript;
pub mod types;
