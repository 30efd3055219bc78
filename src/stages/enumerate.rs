//! Candidate enumeration: one paged descendant search, fully drained.

use crate::config::JobConfig;
use crate::error::StageError;
use crate::record::{CandidateRecord, ParentId};
use crate::store::{DescendantQuery, DescendantSearch};
use tracing::{error, info};

pub struct Enumerator<'a> {
    search: &'a dyn DescendantSearch,
    parent_kind: &'a str,
    page_size: usize,
}

impl<'a> Enumerator<'a> {
    #[must_use]
    pub fn new(search: &'a dyn DescendantSearch, config: &'a JobConfig) -> Self {
        Self {
            search,
            parent_kind: &config.parent_kind,
            page_size: config.page_size,
        }
    }

    /// All descendants of `parent_ids`, ascending by transaction number.
    ///
    /// A search or paging failure is logged and yields an empty list, which
    /// turns the run into a no-op instead of aborting it.
    pub fn enumerate(&self, parent_ids: &[ParentId]) -> Vec<CandidateRecord> {
        if parent_ids.is_empty() {
            info!("no parent ids supplied, skipping search");
            return Vec::new();
        }
        match self.try_enumerate(parent_ids) {
            Ok(records) => {
                info!(parents = parent_ids.len(), candidates = records.len(), "enumerated candidates");
                records
            }
            Err(e) => {
                error!(error = %e, "candidate enumeration failed, continuing with no work");
                Vec::new()
            }
        }
    }

    /// Drain every page in page order.
    pub fn try_enumerate(&self, parent_ids: &[ParentId]) -> Result<Vec<CandidateRecord>, StageError> {
        let query = DescendantQuery::new(parent_ids.to_vec(), self.parent_kind, self.page_size);
        let first = self
            .search
            .search_page(&query, 0)
            .map_err(StageError::Enumeration)?;
        let page_count = first.page_count;
        let mut records = first.records;
        for page in 1..page_count {
            let next = self
                .search
                .search_page(&query, page)
                .map_err(StageError::Enumeration)?;
            records.extend(next.records);
        }
        Ok(records)
    }
}
