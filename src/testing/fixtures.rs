//! Pre-built stores and configs for common dedup scenarios.

use super::builders::records_for;
use crate::config::{DedupRule, JobConfig};
use crate::record::ParentId;
use crate::store::InMemoryStore;

/// Rule with single-letter subtypes `A` and `B`, at most one of each.
#[must_use]
pub fn scenario_rule() -> DedupRule {
    DedupRule {
        subtype_a: "A".to_string(),
        subtype_b: "B".to_string(),
        max_per_parent: 1,
    }
}

/// Default config using [`scenario_rule`] and sequential execution.
#[must_use]
pub fn scenario_config() -> JobConfig {
    let mut cfg = JobConfig {
        rule: scenario_rule(),
        ..Default::default()
    };
    cfg.exec.sequential = true;
    cfg
}

/// RA-1 holds `A:10, A:11, B:12`; RA-2 holds `A:20`.
///
/// Under [`scenario_rule`] the only duplicate is id 11.
#[must_use]
pub fn return_auth_scenario() -> InMemoryStore {
    let store = InMemoryStore::new();
    store.extend(records_for("RA-1", &[("A", "10"), ("A", "11"), ("B", "12")]));
    store.extend(records_for("RA-2", &[("A", "20")]));
    store
}

/// Parse a list of literal ids, skipping blanks.
#[must_use]
pub fn parent_ids(raw: &[&str]) -> Vec<ParentId> {
    raw.iter().filter_map(|s| ParentId::parse(s)).collect()
}
