//! The run summary and the sinks it can be handed to.

use crate::record::{DuplicateOutcome, RecordIdentity};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use tracing::{info, warn};

/// A delete that the store refused.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedDelete {
    pub identity: RecordIdentity,
    pub cause: Option<String>,
}

/// Aggregate result of a run, in outcome encounter order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub successes: Vec<RecordIdentity>,
    pub errors: Vec<FailedDelete>,
    /// False when reading the outcome stream failed part-way.
    pub complete: bool,
    /// True when no delete reached the store; successes are only intents.
    #[serde(default)]
    pub dry_run: bool,
}

impl RunSummary {
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub(crate) fn record(&mut self, outcome: DuplicateOutcome) {
        if outcome.is_success() {
            self.successes.push(outcome.identity);
        } else {
            self.errors.push(FailedDelete {
                identity: outcome.identity,
                cause: outcome.cause,
            });
        }
    }
}

/// External consumer of the end-of-run report.
pub trait ReportSink {
    fn publish(&self, summary: &RunSummary) -> Result<()>;
}

/// Logs the counts and identity lists through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn publish(&self, summary: &RunSummary) -> Result<()> {
        let successes: Vec<String> = summary.successes.iter().map(ToString::to_string).collect();
        let errors: Vec<String> = summary.errors.iter().map(|e| e.identity.to_string()).collect();
        info!(
            success_count = summary.success_count(),
            error_count = summary.error_count(),
            complete = summary.complete,
            dry_run = summary.dry_run,
            ?successes,
            ?errors,
            "dedup run summary"
        );
        if !summary.complete {
            warn!("summary is partial: the outcome stream ended early");
        }
        Ok(())
    }
}

/// Writes the summary as pretty JSON.
#[derive(Clone, Debug)]
pub struct JsonFileSink(pub PathBuf);

impl ReportSink for JsonFileSink {
    fn publish(&self, summary: &RunSummary) -> Result<()> {
        let json = serde_json::to_string_pretty(summary).context("Failed to encode run summary")?;
        std::fs::write(&self.0, json)
            .with_context(|| format!("Failed to write run summary to {}", self.0.display()))
    }
}

/// Keeps every published summary in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    published: Mutex<Vec<RunSummary>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn published(&self) -> Vec<RunSummary> {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn last(&self) -> Option<RunSummary> {
        self.published().pop()
    }
}

impl ReportSink for MemorySink {
    fn publish(&self, summary: &RunSummary) -> Result<()> {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(summary.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ParentId;
    use crate::testing::TempFilePath;

    fn identity(id: &str) -> RecordIdentity {
        RecordIdentity {
            parent_id: ParentId::parse("RA-1").expect("valid parent id"),
            record_type: "ItemRcpt".into(),
            id: id.into(),
        }
    }

    #[test]
    fn json_sink_round_trips_summary() -> Result<()> {
        let mut summary = RunSummary {
            complete: true,
            dry_run: true,
            ..Default::default()
        };
        summary.record(DuplicateOutcome::deleted(identity("11")));
        summary.record(DuplicateOutcome::failed(identity("12"), "locked"));

        let tmp = TempFilePath::with_extension("json")?;
        JsonFileSink(tmp.path().to_path_buf()).publish(&summary)?;
        let back: RunSummary = serde_json::from_str(&std::fs::read_to_string(tmp.path())?)?;
        assert_eq!(back, summary);
        assert!(back.dry_run);
        assert_eq!(back.errors[0].cause.as_deref(), Some("locked"));
        Ok(())
    }

    #[test]
    fn memory_sink_keeps_order() -> Result<()> {
        let sink = MemorySink::new();
        sink.publish(&RunSummary::default())?;
        let full = RunSummary {
            complete: true,
            ..Default::default()
        };
        sink.publish(&full)?;
        assert_eq!(sink.published().len(), 2);
        assert_eq!(sink.last(), Some(full));
        Ok(())
    }
}
