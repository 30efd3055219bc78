//! Summarize stage: fold the outcome stream into a [`RunSummary`].

use crate::error::StageError;
use crate::record::DuplicateOutcome;
use crate::report::RunSummary;
use std::fmt::Display;
use tracing::{error, info};

/// Serialize an outcome for transport to the aggregator.
pub fn encode_outcome(outcome: &DuplicateOutcome) -> Result<String, serde_json::Error> {
    serde_json::to_string(outcome)
}

/// Decode a stream of transported outcomes lazily, one read per item.
pub fn decode_outcomes(
    encoded: &[String],
) -> impl Iterator<Item = Result<DuplicateOutcome, serde_json::Error>> + '_ {
    encoded.iter().map(|raw| serde_json::from_str(raw))
}

/// Single pass over `outcomes`, bucketed by kind in encounter order.
///
/// The first read error stops the pass; the summary then holds only what was
/// read before it and is marked incomplete.
pub fn aggregate<I, E>(outcomes: I) -> RunSummary
where
    I: IntoIterator<Item = Result<DuplicateOutcome, E>>,
    E: Display,
{
    let mut summary = RunSummary::default();
    let mut read = 0usize;
    for item in outcomes {
        match item {
            Ok(outcome) => {
                summary.record(outcome);
                read += 1;
            }
            Err(e) => {
                let err = StageError::Aggregation {
                    read,
                    reason: e.to_string(),
                };
                error!(error = %err, "returning partial summary");
                return summary;
            }
        }
    }
    summary.complete = true;
    info!(
        successes = summary.success_count(),
        errors = summary.error_count(),
        "aggregated outcomes"
    );
    summary
}
