//! Reduce stage: find and delete excess duplicates within one partition.
//!
//! Work is split in two steps:
//!
//! 1. [`detect_excess`] is pure. Walking the partition in delivery order, it
//!    flags every tracked-subtype record whose running count would exceed
//!    `max_per_parent`.
//! 2. [`apply_deletions`] issues one delete per flagged record and emits an
//!    outcome for each, keeping a [`SubtypeTally`] of documents presumed to
//!    still exist: a successful delete gives its increment back, a failed one
//!    does not.
//!
//! A record's fate never depends on earlier delete results: after a success the
//! count is back at the limit, after a failure it is above it, and either way
//! the next record of that subtype exceeds it. This is why detection can run
//! without a store.
//!
//! Decisions are made on the enumeration snapshot only. Nothing is re-checked
//! against the live store before a delete.

use crate::config::DedupRule;
use crate::error::{StageError, StoreError};
use crate::record::{CandidateRecord, DuplicateOutcome, ParentId};
use crate::store::RecordDeleter;
use tracing::{error, info, warn};

/// One of the two subtypes the rule counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Subtype {
    A,
    B,
}

impl DedupRule {
    /// Which tracked subtype `record_type` is, if any.
    #[must_use]
    pub fn classify(&self, record_type: &str) -> Option<Subtype> {
        if record_type == self.subtype_a {
            Some(Subtype::A)
        } else if record_type == self.subtype_b {
            Some(Subtype::B)
        } else {
            None
        }
    }
}

/// Per-invocation counters. Never shared between partitions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SubtypeTally {
    pub a: u32,
    pub b: u32,
}

impl SubtypeTally {
    fn slot(&mut self, subtype: Subtype) -> &mut u32 {
        match subtype {
            Subtype::A => &mut self.a,
            Subtype::B => &mut self.b,
        }
    }

    #[must_use]
    pub fn get(&self, subtype: Subtype) -> u32 {
        match subtype {
            Subtype::A => self.a,
            Subtype::B => self.b,
        }
    }

    /// Increment and return the new count.
    pub fn increment(&mut self, subtype: Subtype) -> u32 {
        let slot = self.slot(subtype);
        *slot += 1;
        *slot
    }

    pub fn decrement(&mut self, subtype: Subtype) {
        let slot = self.slot(subtype);
        *slot = slot.saturating_sub(1);
    }
}

/// A record flagged for deletion and the subtype it was counted under.
#[derive(Clone, Copy, Debug)]
pub struct Flagged<'r> {
    pub subtype: Subtype,
    pub record: &'r CandidateRecord,
}

/// Flag every tracked record beyond the first `max_per_parent` of its subtype,
/// in delivery order. Untracked subtypes are never flagged.
#[must_use]
pub fn detect_excess<'r>(rule: &DedupRule, records: &'r [CandidateRecord]) -> Vec<Flagged<'r>> {
    let mut seen = SubtypeTally::default();
    records
        .iter()
        .filter_map(|record| {
            let subtype = rule.classify(&record.record_type)?;
            (seen.increment(subtype) > rule.max_per_parent).then_some(Flagged { subtype, record })
        })
        .collect()
}

/// Outcomes of one partition plus the final presumed-existing counts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    pub outcomes: Vec<DuplicateOutcome>,
    pub tally: SubtypeTally,
}

/// Delete every flagged record, emitting one outcome per attempt.
///
/// A record the store no longer has counts as removed and emits no outcome, so
/// re-resolving an already cleaned snapshot reports nothing.
pub fn apply_deletions<D>(
    rule: &DedupRule,
    deleter: &D,
    parent: &ParentId,
    records: &[CandidateRecord],
    flagged: &[Flagged<'_>],
) -> Resolution
where
    D: RecordDeleter + ?Sized,
{
    // Survivors come before every flagged record of their subtype, so seeding
    // the tally with them reproduces the running count at each flagged record.
    let mut tally = SubtypeTally::default();
    for record in records {
        if let Some(subtype) = rule.classify(&record.record_type) {
            if tally.get(subtype) < rule.max_per_parent {
                tally.increment(subtype);
            }
        }
    }

    let mut outcomes = Vec::with_capacity(flagged.len());
    for f in flagged {
        let count = tally.increment(f.subtype);
        let identity = f.record.identity(parent);
        match deleter.delete(&f.record.record_type, &f.record.id) {
            Ok(()) => {
                tally.decrement(f.subtype);
                info!(
                    parent_id = %parent,
                    record_type = %f.record.record_type,
                    id = %f.record.id,
                    "deleted duplicate"
                );
                outcomes.push(DuplicateOutcome::deleted(identity));
            }
            Err(StoreError::NotFound { .. }) => {
                // The snapshot may be stale: the duplicate is already gone.
                tally.decrement(f.subtype);
                info!(
                    parent_id = %parent,
                    record_type = %f.record.record_type,
                    id = %f.record.id,
                    "duplicate already removed"
                );
            }
            Err(source) => {
                let cause = source.to_string();
                let err = StageError::Deletion {
                    record_type: f.record.record_type.clone(),
                    id: f.record.id.clone(),
                    source,
                };
                warn!(parent_id = %parent, presumed_existing = count, error = %err, "duplicate delete failed");
                outcomes.push(DuplicateOutcome::failed(identity, cause));
            }
        }
    }
    Resolution { outcomes, tally }
}

/// Detect then apply, for already decoded records.
pub fn resolve<D>(rule: &DedupRule, deleter: &D, parent: &ParentId, records: &[CandidateRecord]) -> Resolution
where
    D: RecordDeleter + ?Sized,
{
    let flagged = detect_excess(rule, records);
    apply_deletions(rule, deleter, parent, records, &flagged)
}

/// Decode a partition's payloads and resolve it.
///
/// A payload that does not decode, or that belongs to another parent, abandons
/// the whole partition before any delete is issued.
pub fn resolve_partition<D>(rule: &DedupRule, deleter: &D, parent: &ParentId, payloads: &[String]) -> Resolution
where
    D: RecordDeleter + ?Sized,
{
    match decode_partition(parent, payloads) {
        Ok(records) => resolve(rule, deleter, parent, &records),
        Err(e) => {
            error!(parent_id = %parent, error = %e, "abandoning partition");
            Resolution::default()
        }
    }
}

fn decode_partition(parent: &ParentId, payloads: &[String]) -> Result<Vec<CandidateRecord>, StageError> {
    payloads
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let record: CandidateRecord =
                serde_json::from_str(raw).map_err(|e| StageError::PartitionProcessing {
                    parent_id: parent.clone(),
                    reason: format!("payload {i} is malformed: {e}"),
                })?;
            if record.parent_key().as_ref() != Some(parent) {
                return Err(StageError::PartitionProcessing {
                    parent_id: parent.clone(),
                    reason: format!("record {} belongs to parent {:?}", record.id, record.parent_id),
                });
            }
            Ok(record)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::OutcomeKind;
    use crate::store::InMemoryStore;
    use crate::testing::RecordBuilder;

    fn rule() -> DedupRule {
        DedupRule {
            subtype_a: "A".into(),
            subtype_b: "B".into(),
            max_per_parent: 1,
        }
    }

    fn parent(s: &str) -> ParentId {
        ParentId::parse(s).expect("valid parent id")
    }

    fn recs(parent: &str, rows: &[(&str, &str)]) -> Vec<CandidateRecord> {
        rows.iter()
            .map(|(ty, id)| RecordBuilder::new(parent, ty, id).build())
            .collect()
    }

    fn flagged_ids(rule: &DedupRule, records: &[CandidateRecord]) -> Vec<String> {
        detect_excess(rule, records)
            .iter()
            .map(|f| f.record.id.clone())
            .collect()
    }

    #[test]
    fn at_most_one_each_flags_nothing() {
        let records = recs("RA-1", &[("A", "1"), ("B", "2"), ("C", "3")]);
        assert!(detect_excess(&rule(), &records).is_empty());
    }

    #[test]
    fn later_instances_are_flagged_first_survives() {
        let records = recs("RA-1", &[("A", "10"), ("A", "11"), ("B", "12"), ("A", "13"), ("B", "14")]);
        assert_eq!(flagged_ids(&rule(), &records), vec!["11", "13", "14"]);
    }

    #[test]
    fn untracked_subtypes_never_flagged() {
        let records = recs("RA-1", &[("C", "1"), ("C", "2"), ("C", "3")]);
        assert!(detect_excess(&rule(), &records).is_empty());
    }

    #[test]
    fn higher_limit_keeps_more() {
        let r = DedupRule {
            max_per_parent: 2,
            ..rule()
        };
        let records = recs("RA-1", &[("A", "1"), ("A", "2"), ("A", "3")]);
        assert_eq!(flagged_ids(&r, &records), vec!["3"]);
    }

    #[test]
    fn failed_delete_leaves_counter_raised() {
        let store = InMemoryStore::new();
        let records = recs("RA-1", &[("A", "10"), ("A", "11"), ("A", "13")]);
        store.extend(records.clone());
        store.fail_delete_of("11");

        let res = resolve(&rule(), &store, &parent("RA-1"), &records);
        let kinds: Vec<_> = res.outcomes.iter().map(|o| o.kind).collect();
        assert_eq!(kinds, vec![OutcomeKind::ErrorDelete, OutcomeKind::SuccessDelete]);
        assert_eq!(res.outcomes[0].identity.id, "11");
        assert!(res.outcomes[0].cause.is_some());
        assert_eq!(res.outcomes[1].identity.id, "13");
        // 10 survives, 11 could not be removed.
        assert_eq!(res.tally.a, 2);
        assert!(store.contains("11"));
        assert!(!store.contains("13"));
    }

    #[test]
    fn successful_deletes_restore_tally() {
        let store = InMemoryStore::new();
        let records = recs("RA-1", &[("A", "1"), ("A", "2"), ("B", "3"), ("B", "4"), ("B", "5")]);
        store.extend(records.clone());
        let res = resolve(&rule(), &store, &parent("RA-1"), &records);
        assert_eq!(res.outcomes.len(), 3);
        assert!(res.outcomes.iter().all(DuplicateOutcome::is_success));
        assert_eq!(res.tally, SubtypeTally { a: 1, b: 1 });
    }

    #[test]
    fn foreign_record_abandons_partition() -> anyhow::Result<()> {
        let store = InMemoryStore::new();
        let payloads = vec![
            serde_json::to_string(&RecordBuilder::new("RA-1", "A", "1").build())?,
            serde_json::to_string(&RecordBuilder::new("RA-2", "A", "2").build())?,
        ];
        let res = resolve_partition(&rule(), &store, &parent("RA-1"), &payloads);
        assert!(res.outcomes.is_empty());
        assert!(store.delete_attempts().is_empty());
        Ok(())
    }

    #[test]
    fn malformed_payload_abandons_partition() -> anyhow::Result<()> {
        let store = InMemoryStore::new();
        let payloads = vec![
            serde_json::to_string(&RecordBuilder::new("RA-1", "A", "1").build())?,
            serde_json::to_string(&RecordBuilder::new("RA-1", "A", "2").build())?,
            "{\"id\":".to_string(),
        ];
        let res = resolve_partition(&rule(), &store, &parent("RA-1"), &payloads);
        assert_eq!(res, Resolution::default());
        assert!(store.delete_attempts().is_empty());
        Ok(())
    }

    #[test]
    fn resolving_a_stale_snapshot_twice_is_clean() {
        let store = InMemoryStore::new();
        let records = recs("RA-1", &[("A", "10"), ("A", "11"), ("B", "12")]);
        store.extend(records.clone());

        let first = resolve(&rule(), &store, &parent("RA-1"), &records);
        assert_eq!(first.outcomes.len(), 1);
        assert!(first.outcomes[0].is_success());

        let second = resolve(&rule(), &store, &parent("RA-1"), &records);
        assert!(second.outcomes.is_empty());
        assert_eq!(second.tally, SubtypeTally { a: 1, b: 1 });
        let attempts: Vec<String> = store.delete_attempts().into_iter().map(|(_, id)| id).collect();
        assert_eq!(attempts, vec!["11", "11"]);
        assert!(store.contains("10"));
    }

    #[test]
    fn abandoned_partition_does_not_block_others() -> anyhow::Result<()> {
        let store = InMemoryStore::new();
        let healthy = recs("RA-2", &[("A", "20"), ("A", "21")]);
        store.extend(healthy.clone());
        store.extend(recs("RA-1", &[("A", "10"), ("A", "11")]));

        let mut payloads: Vec<(ParentId, String)> = vec![
            (parent("RA-1"), serde_json::to_string(&RecordBuilder::new("RA-1", "A", "10").build())?),
            (parent("RA-1"), "{\"id\":".to_string()),
            (parent("RA-1"), serde_json::to_string(&RecordBuilder::new("RA-1", "A", "11").build())?),
        ];
        for r in &healthy {
            payloads.push((parent("RA-2"), serde_json::to_string(r)?));
        }

        let p = crate::Pipeline::default();
        let rule = std::sync::Arc::new(rule());
        let deleter = std::sync::Arc::new(store);
        let worker_store = std::sync::Arc::clone(&deleter);
        let outcomes = crate::from_vec(&p, payloads)
            .group_by_key()
            .flat_map(move |(key, group): &(ParentId, Vec<String>)| {
                resolve_partition(rule.as_ref(), worker_store.as_ref(), key, group).outcomes
            })
            .collect_par(Some(2), Some(2))?;

        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].is_success());
        assert_eq!(outcomes[0].identity.to_string(), "RA-2/A/21");
        let attempts: Vec<String> = deleter.delete_attempts().into_iter().map(|(_, id)| id).collect();
        assert_eq!(attempts, vec!["21"]);
        assert!(deleter.contains("11"));
        Ok(())
    }
}
