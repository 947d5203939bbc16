//! Result aggregation.
//!
//! Two shapes of summary: the arithmetic mean over per-file metric values
//! (DER, DCF), and rank-based Top-N accuracy over speaker-identity
//! predictions. Both consume the identifier-ordered structures produced by
//! pairing and scoring, so report iteration order is reproducible.

use crate::error::AggregateError;
use crate::pairing::PairedFiles;
use crate::types::{FileId, MetricRecord, MetricValue};

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Mean of all successfully scored values, with the failures excluded and
/// listed separately.
#[derive(Debug)]
pub struct MeanSummary {
    /// Arithmetic mean over successful scores, rounded to 5 decimal places.
    pub mean: f64,
    /// Number of successfully scored units.
    pub scored: usize,
    /// Units whose external scoring produced no usable value.
    pub failed: Vec<FileId>,
}

impl MeanSummary {
    /// Aggregate a metric record into a mean.
    ///
    /// Failed units are excluded from the mean. A record where every unit
    /// failed has no defined mean and is an error, never a silent 0/0.
    pub fn from_record(record: &MetricRecord) -> Result<Self, AggregateError> {
        let mut sum = 0.0;
        let mut scored = 0usize;
        let mut failed = Vec::new();

        for (id, value) in record.iter() {
            match value {
                MetricValue::Score(score) => {
                    sum += score;
                    scored += 1;
                }
                MetricValue::Failed => failed.push(id.clone()),
            }
        }

        if scored == 0 {
            return Err(AggregateError::NothingScored);
        }

        Ok(Self {
            mean: round_to(sum / scored as f64, 5),
            scored,
            failed,
        })
    }
}

/// Correct/incorrect split of all units at one rank bound.
#[derive(Debug)]
pub struct RankSplit {
    /// The N of this Top-N classification.
    pub n: usize,
    /// Units whose reference identity appears in the first N predictions.
    pub correct: Vec<FileId>,
    /// Units whose reference identity does not.
    pub incorrect: Vec<FileId>,
}

impl RankSplit {
    /// Accuracy percentage, rounded to 3 decimal places.
    pub fn accuracy(&self) -> f64 {
        let total = self.correct.len() + self.incorrect.len();
        round_to(100.0 * self.correct.len() as f64 / total as f64, 3)
    }
}

/// Top-N accuracy over ranked speaker-identity predictions.
#[derive(Debug)]
pub struct TopNSummary {
    splits: Vec<RankSplit>,
    headline_n: usize,
}

impl TopNSummary {
    /// Classify every paired unit at every N in `1..=bound` in one pass.
    ///
    /// The headline accuracy is reported at N = 5 whenever five predictions
    /// exist, even when the caller asked for a smaller bound; with fewer
    /// predictions the headline N is the prediction count. `bound` must
    /// already be clamped to the prediction count by the caller.
    pub fn score(paired: &PairedFiles, bound: usize) -> Result<Self, AggregateError> {
        let predictions = paired
            .iter()
            .next()
            .and_then(|(_, _, hyp)| hyp.as_ranked())
            .map_or(0, <[String]>::len);
        let headline_n = 5.min(predictions).max(1);
        let top = bound.max(headline_n);

        let mut splits: Vec<RankSplit> = (1..=top)
            .map(|n| RankSplit {
                n,
                correct: Vec::new(),
                incorrect: Vec::new(),
            })
            .collect();

        for (id, ref_entry, hyp_entry) in paired.iter() {
            let identity = ref_entry
                .as_text()
                .ok_or_else(|| AggregateError::EntryKind { id: id.clone() })?;
            let ranked = hyp_entry
                .as_ranked()
                .ok_or_else(|| AggregateError::EntryKind { id: id.clone() })?;

            for split in &mut splits {
                let hit = ranked
                    .iter()
                    .take(split.n)
                    .any(|candidate| candidate == identity);
                if hit {
                    split.correct.push(id.clone());
                } else {
                    split.incorrect.push(id.clone());
                }
            }
        }

        Ok(Self { splits, headline_n })
    }

    /// All computed splits, ascending by N.
    pub fn splits(&self) -> &[RankSplit] {
        &self.splits
    }

    /// The headline split (Top-5, or Top-count when fewer predictions exist).
    pub fn headline(&self) -> &RankSplit {
        &self.splits[self.headline_n - 1]
    }
}
