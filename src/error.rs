//! Error types at the collaborator seams and the stage failure taxonomy.
//!
//! Nothing here aborts a run: stages convert these into log entries and, for
//! deletions, into `error-delete` outcomes.

use crate::record::ParentId;

/// Failure reported by an external store collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("record {record_type}/{id} not found")]
    NotFound { record_type: String, id: String },

    #[error("store rejected the request: {0}")]
    Rejected(String),

    #[error("page {page} unavailable: {reason}")]
    Paging { page: usize, reason: String },
}

/// A recovered failure in one of the pipeline stages.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("enumeration failed: {0}")]
    Enumeration(#[source] StoreError),

    #[error("dropped record payload: {reason}")]
    Partition { reason: String },

    #[error("delete of {record_type}/{id} failed: {source}")]
    Deletion {
        record_type: String,
        id: String,
        #[source]
        source: StoreError,
    },

    #[error("partition {parent_id} abandoned: {reason}")]
    PartitionProcessing { parent_id: ParentId, reason: String },

    #[error("outcome stream failed after {read} outcomes: {reason}")]
    Aggregation { read: usize, reason: String },
}
