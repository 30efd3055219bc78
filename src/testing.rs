//! Testing utilities for dedup jobs.
//!
//! - **Builders**: [`RecordBuilder`] for candidate records
//! - **Fixtures**: ready-made stores such as [`return_auth_scenario`]
//! - **Assertions**: collection and summary comparisons
//! - **Temp files**: [`TempFilePath`] and [`temp_params_file`] for file-backed
//!   parameter sources and report sinks
//!
//! ```
//! use ironsweep::*;
//! use ironsweep::testing::*;
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let store = Arc::new(return_auth_scenario());
//! let job = DedupJob::with_store(scenario_config(), store.clone())?;
//! let summary = job.run_ids(&parent_ids(&["RA-1", "RA-2"]))?;
//! assert_summary_counts(&summary, 1, 0);
//! assert!(!store.contains("11"));
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod mock_io;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
pub use mock_io::*;

use crate::Pipeline;

/// A test-focused wrapper around [`Pipeline`].
#[derive(Clone, Default)]
pub struct TestPipeline {
    pipeline: Pipeline,
}

impl TestPipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes in the pipeline graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.pipeline.node_count()
    }

    /// Number of edges in the pipeline graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        let (_, edges) = self.pipeline.snapshot();
        edges.len()
    }
}

// Allow TestPipeline to be used wherever Pipeline is expected
impl std::ops::Deref for TestPipeline {
    type Target = Pipeline;

    fn deref(&self) -> &Self::Target {
        &self.pipeline
    }
}
