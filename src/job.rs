//! The batch job: enumerate → partition → resolve → aggregate.
//!
//! ```no_run
//! use ironsweep::*;
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let store = Arc::new(InMemoryStore::new());
//! let job = DedupJob::with_store(JobConfig::default(), store)?;
//! let summary = job.run(&StaticParams("RA-1\nRA-2".into()), &TracingSink)?;
//! println!("{} deleted, {} failed", summary.success_count(), summary.error_count());
//! # Ok(())
//! # }
//! ```

use crate::collection::from_vec;
use crate::config::JobConfig;
use crate::params::{ParameterSource, parse_parent_ids};
use crate::pipeline::Pipeline;
use crate::record::ParentId;
use crate::report::{ReportSink, RunSummary};
use crate::stages::{
    Enumerator, aggregate, decode_outcomes, encode_outcome, encode_record, partition, resolve_partition,
};
use crate::store::{DescendantSearch, DryRunDeleter, RecordDeleter};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct DedupJob {
    config: JobConfig,
    search: Arc<dyn DescendantSearch>,
    deleter: Arc<dyn RecordDeleter>,
}

impl DedupJob {
    /// Build a job; the config is validated here.
    pub fn new(
        config: JobConfig,
        search: Arc<dyn DescendantSearch>,
        deleter: Arc<dyn RecordDeleter>,
    ) -> Result<Self> {
        config.validate().context("Invalid job config")?;
        Ok(Self {
            config,
            search,
            deleter,
        })
    }

    /// Build a job whose store provides both search and delete.
    pub fn with_store<S>(config: JobConfig, store: Arc<S>) -> Result<Self>
    where
        S: DescendantSearch + RecordDeleter + 'static,
    {
        let search: Arc<dyn DescendantSearch> = store.clone();
        let deleter: Arc<dyn RecordDeleter> = store;
        Self::new(config, search, deleter)
    }

    #[must_use]
    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    /// Run from a parameter source and hand the summary to `sink`.
    ///
    /// Only an unreadable parameter source or an engine fault is returned as an
    /// error. Stage failures are logged and reflected in the summary, and a
    /// failing sink is logged.
    pub fn run(&self, params: &dyn ParameterSource, sink: &dyn ReportSink) -> Result<RunSummary> {
        let raw = params.raw_parent_ids().context("Failed to read parent ids")?;
        let ids = parse_parent_ids(&raw);
        let summary = self.run_ids(&ids)?;
        if let Err(e) = sink.publish(&summary) {
            error!(error = %e, "failed to publish run summary");
        }
        Ok(summary)
    }

    /// Run for an already normalized set of parent ids.
    pub fn run_ids(&self, parent_ids: &[ParentId]) -> Result<RunSummary> {
        info!(parents = parent_ids.len(), dry_run = self.config.dry_run, "starting dedup run");

        let records = Enumerator::new(self.search.as_ref(), &self.config).enumerate(parent_ids);
        let payloads: Vec<String> = records
            .iter()
            .filter_map(|r| match encode_record(r) {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!(error = %e, "skipping candidate");
                    None
                }
            })
            .collect();

        let rule = Arc::new(self.config.rule.clone());
        let deleter: Arc<dyn RecordDeleter> = if self.config.dry_run {
            Arc::new(DryRunDeleter)
        } else {
            Arc::clone(&self.deleter)
        };

        let p = Pipeline::default();
        let encoded: Vec<String> = from_vec(&p, payloads)
            .try_map_or_drop("partition", |raw: &String| partition(raw))
            .group_by_key()
            .flat_map(move |(parent, group): &(ParentId, Vec<String>)| {
                resolve_partition(rule.as_ref(), deleter.as_ref(), parent, group)
                    .outcomes
                    .iter()
                    .filter_map(|o| match encode_outcome(o) {
                        Ok(s) => Some(s),
                        Err(e) => {
                            error!(parent_id = %parent, error = %e, "could not emit outcome");
                            None
                        }
                    })
                    .collect::<Vec<String>>()
            })
            .collect_with(&self.config.exec.runner())
            .context("dedup pipeline failed")?;

        let mut summary = aggregate(decode_outcomes(&encoded));
        summary.dry_run = self.config.dry_run;
        Ok(summary)
    }
}
