//! Narrow interfaces to the external document store.
//!
//! The core only needs two capabilities: a paged search for descendants of a
//! set of parents, and deletion of a single document. Both are blocking from
//! the pipeline's point of view and must be safe to call from several reduce
//! workers at once.

mod memory;

pub use memory::InMemoryStore;

use crate::error::StoreError;
use crate::record::{CandidateRecord, ParentId};
use serde::{Deserialize, Serialize};

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Search for descendants created from any of `parent_ids`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescendantQuery {
    pub parent_ids: Vec<ParentId>,
    /// Kind of the parent document the "created from" relation must point at.
    pub parent_kind: String,
    /// Only top-level rows, never child lines.
    pub main_line_only: bool,
    pub page_size: usize,
}

impl DescendantQuery {
    #[must_use]
    pub fn new(parent_ids: Vec<ParentId>, parent_kind: impl Into<String>, page_size: usize) -> Self {
        Self {
            parent_ids,
            parent_kind: parent_kind.into(),
            main_line_only: true,
            page_size,
        }
    }
}

/// One page of search results, ordered ascending by transaction number.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchPage {
    pub records: Vec<CandidateRecord>,
    /// Total number of pages in the result set.
    pub page_count: usize,
}

pub trait DescendantSearch: Send + Sync {
    /// Fetch page `page` (zero-based) of the result set for `query`.
    fn search_page(&self, query: &DescendantQuery, page: usize) -> Result<SearchPage, StoreError>;
}

pub trait RecordDeleter: Send + Sync {
    fn delete(&self, record_type: &str, id: &str) -> Result<(), StoreError>;
}

impl<S: DescendantSearch + ?Sized> DescendantSearch for std::sync::Arc<S> {
    fn search_page(&self, query: &DescendantQuery, page: usize) -> Result<SearchPage, StoreError> {
        (**self).search_page(query, page)
    }
}

impl<D: RecordDeleter + ?Sized> RecordDeleter for std::sync::Arc<D> {
    fn delete(&self, record_type: &str, id: &str) -> Result<(), StoreError> {
        (**self).delete(record_type, id)
    }
}

/// A deleter that only logs what it would remove. Every call succeeds.
#[derive(Clone, Copy, Debug, Default)]
pub struct DryRunDeleter;

impl RecordDeleter for DryRunDeleter {
    fn delete(&self, record_type: &str, id: &str) -> Result<(), StoreError> {
        tracing::info!(record_type, id, "dry run: would delete");
        Ok(())
    }
}
