//! # Ironsweep
//!
//! A batch **deduplication job** for descendant transactions, built on a small
//! staged map/reduce engine.
//!
//! Given a list of parent document ids, a run:
//!
//! 1. **Enumerates** every descendant created from those parents, draining a
//!    paged search ordered by transaction number.
//! 2. **Partitions** the candidates by parent id (the map stage).
//! 3. **Resolves** each partition independently (the reduce stage): at most
//!    `max_per_parent` records of each of two tracked subtypes survive, later
//!    instances are deleted, and every deletion attempt yields a
//!    [`DuplicateOutcome`].
//! 4. **Aggregates** the outcomes into a [`RunSummary`] handed to a
//!    [`ReportSink`].
//!
//! No stage failure aborts a run. Failures are logged through `tracing` and,
//! for deletions, recorded as `error-delete` outcomes.
//!
//! ## Quick Start
//!
//! ```
//! use ironsweep::*;
//! use ironsweep::testing::RecordBuilder;
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let store = Arc::new(InMemoryStore::new());
//! store.insert(RecordBuilder::new("RA-1", "ItemRcpt", "10").tran("IR-1").build());
//! store.insert(RecordBuilder::new("RA-1", "ItemRcpt", "11").tran("IR-2").build());
//!
//! let job = DedupJob::with_store(JobConfig::default(), store.clone())?;
//! let sink = MemorySink::new();
//! let summary = job.run(&StaticParams("RA-1\n\nRA-1".into()), &sink)?;
//!
//! assert_eq!(summary.success_count(), 1);
//! assert!(store.contains("10"));
//! assert!(!store.contains("11"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Engine
//!
//! The stages run on a deferred pipeline graph: [`from_vec`] attaches a
//! source, [`PCollection::map`], [`PCollection::flat_map`] and
//! [`PCollection::group_by_key`] add stages, and a collect call executes the
//! plan sequentially or on a rayon pool. Grouping is stable: the values of a
//! key reach the reduce stage in the order the map stage emitted them, in both
//! execution modes.
//!
//! ## Module Overview
//!
//! - [`stages`] - enumerate, partition, resolve, aggregate
//! - [`store`] - search/delete collaborator traits and an in-memory store
//! - [`params`] - parent-id sources and normalization
//! - [`config`] - [`JobConfig`] (TOML via the `config-toml` feature)
//! - [`report`] - [`RunSummary`] and report sinks
//! - [`job`] - [`DedupJob`] orchestration
//! - [`runner`] / [`pipeline`] / [`collection`] - the map/reduce engine
//! - [`testing`] - builders, fixtures, and assertions for tests

pub mod collection;
pub mod config;
pub mod error;
pub mod job;
pub mod logging;
pub mod node;
pub mod params;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod runner;
pub mod stages;
pub mod store;
pub mod testing;
pub mod type_token;

mod helpers;

pub use collection::{PCollection, RFBound, from_vec};
pub use config::{DedupRule, ExecConfig, JobConfig};
pub use error::{StageError, StoreError};
pub use job::DedupJob;
pub use params::{EnvParams, FileParams, ParameterSource, StaticParams, parse_parent_ids};
pub use pipeline::{NodeId, Pipeline};
pub use record::{CandidateRecord, DuplicateOutcome, OutcomeKind, ParentId, RecordIdentity};
pub use report::{FailedDelete, JsonFileSink, MemorySink, ReportSink, RunSummary, TracingSink};
pub use runner::{ExecMode, Runner};
pub use store::{DescendantQuery, DescendantSearch, DryRunDeleter, InMemoryStore, RecordDeleter, SearchPage};
pub use type_token::Partition;
