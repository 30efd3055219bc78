use super::{DescendantQuery, DescendantSearch, RecordDeleter, SearchPage};
use crate::error::StoreError;
use crate::record::CandidateRecord;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Clone, Debug)]
struct StoredDoc {
    record: CandidateRecord,
    created_from: String,
    parent_kind: String,
    main_line: bool,
}

#[derive(Default)]
struct Inner {
    docs: Vec<StoredDoc>,
    failing_deletes: HashSet<String>,
    failing_page: Option<usize>,
    delete_attempts: Vec<(String, String)>,
    deleted: Vec<(String, String)>,
    search_calls: usize,
}

/// An in-process document store with real pagination and failure injection.
///
/// Records are inserted as main-line descendants of a `"RtnAuth"` parent unless
/// [`InMemoryStore::insert_with`] says otherwise.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, record: CandidateRecord) {
        self.insert_with(record, "RtnAuth", true);
    }

    pub fn insert_with(&self, record: CandidateRecord, parent_kind: &str, main_line: bool) {
        self.lock().docs.push(StoredDoc {
            created_from: record.parent_id.trim().to_string(),
            record,
            parent_kind: parent_kind.to_string(),
            main_line,
        });
    }

    /// Insert a record whose "created from" relation targets `created_from`
    /// even though the record's own `parent_id` column may not resolve.
    pub fn insert_linked(&self, record: CandidateRecord, created_from: &str) {
        self.lock().docs.push(StoredDoc {
            record,
            created_from: created_from.to_string(),
            parent_kind: "RtnAuth".to_string(),
            main_line: true,
        });
    }

    pub fn extend(&self, records: impl IntoIterator<Item = CandidateRecord>) {
        for r in records {
            self.insert(r);
        }
    }

    /// Make every delete of `id` fail with [`StoreError::Rejected`].
    pub fn fail_delete_of(&self, id: &str) {
        self.lock().failing_deletes.insert(id.to_string());
    }

    /// Make the search fail when page `page` is requested.
    pub fn fail_search_on_page(&self, page: usize) {
        self.lock().failing_page = Some(page);
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.lock().docs.iter().any(|d| d.record.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().docs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(record_type, id)` of every delete requested, in call order.
    #[must_use]
    pub fn delete_attempts(&self) -> Vec<(String, String)> {
        self.lock().delete_attempts.clone()
    }

    /// `(record_type, id)` of every delete that succeeded, in call order.
    #[must_use]
    pub fn deleted(&self) -> Vec<(String, String)> {
        self.lock().deleted.clone()
    }

    #[must_use]
    pub fn search_calls(&self) -> usize {
        self.lock().search_calls
    }
}

impl DescendantSearch for InMemoryStore {
    fn search_page(&self, query: &DescendantQuery, page: usize) -> Result<SearchPage, StoreError> {
        if query.page_size == 0 {
            return Err(StoreError::Rejected("page size must be positive".into()));
        }
        let mut g = self.lock();
        g.search_calls += 1;
        if g.failing_page == Some(page) {
            return Err(StoreError::Paging {
                page,
                reason: "injected failure".into(),
            });
        }

        let mut hits: Vec<&StoredDoc> = g
            .docs
            .iter()
            .filter(|d| d.parent_kind == query.parent_kind)
            .filter(|d| !query.main_line_only || d.main_line)
            .filter(|d| query.parent_ids.iter().any(|p| p.as_str() == d.created_from))
            .collect();
        hits.sort_by(|a, b| {
            a.record
                .transaction_number
                .cmp(&b.record.transaction_number)
                .then_with(|| a.record.id.cmp(&b.record.id))
        });

        let page_count = hits.len().div_ceil(query.page_size);
        let records = hits
            .into_iter()
            .skip(page * query.page_size)
            .take(query.page_size)
            .map(|d| d.record.clone())
            .collect();
        Ok(SearchPage {
            records,
            page_count,
        })
    }
}

impl RecordDeleter for InMemoryStore {
    fn delete(&self, record_type: &str, id: &str) -> Result<(), StoreError> {
        let mut g = self.lock();
        g.delete_attempts.push((record_type.to_string(), id.to_string()));
        if g.failing_deletes.contains(id) {
            return Err(StoreError::Rejected(format!("delete of {id} refused")));
        }
        let before = g.docs.len();
        g.docs
            .retain(|d| !(d.record.id == id && d.record.record_type == record_type));
        if g.docs.len() == before {
            return Err(StoreError::NotFound {
                record_type: record_type.to_string(),
                id: id.to_string(),
            });
        }
        g.deleted.push((record_type.to_string(), id.to_string()));
        Ok(())
    }
}
