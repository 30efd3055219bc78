//! Assertion functions for pipeline outputs and run summaries.

use crate::report::RunSummary;
use crate::store::InMemoryStore;
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

/// Assert that two collections are equal in order and content.
///
/// # Panics
///
/// Panics if the collections differ in length or content.
pub fn assert_collections_equal<T: Debug + PartialEq>(actual: &[T], expected: &[T]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Collection length mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert_eq!(a, e, "Collection mismatch at index {i}:\n  Expected: {expected:?}\n  Actual: {actual:?}");
    }
}

/// Assert that two collections contain the same elements, ignoring order.
///
/// # Panics
///
/// Panics if the collections differ in content (ignoring order).
pub fn assert_collections_unordered_equal<T: Debug + Eq + Hash>(actual: &[T], expected: &[T]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Collection length mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
    let actual_set: HashSet<_> = actual.iter().collect();
    let expected_set: HashSet<_> = expected.iter().collect();
    if actual_set != expected_set {
        let missing: Vec<_> = expected_set.difference(&actual_set).collect();
        let extra: Vec<_> = actual_set.difference(&expected_set).collect();
        panic!("Collection content mismatch:\n  Missing elements: {missing:?}\n  Extra elements: {extra:?}");
    }
}

/// Assert the success and error counts of a summary.
///
/// # Panics
///
/// Panics if either count differs.
pub fn assert_summary_counts(summary: &RunSummary, successes: usize, errors: usize) {
    assert_eq!(
        (summary.success_count(), summary.error_count()),
        (successes, errors),
        "Summary count mismatch (successes, errors):\n  Summary: {summary:?}"
    );
}

/// Ids of the successfully deleted records, in summary order.
#[must_use]
pub fn deleted_ids(summary: &RunSummary) -> Vec<String> {
    summary.successes.iter().map(|i| i.id.clone()).collect()
}

/// Assert which ids the store was asked to delete, in call order.
///
/// # Panics
///
/// Panics if the attempted ids differ from `expected`.
pub fn assert_delete_attempts(store: &InMemoryStore, expected: &[&str]) {
    let actual: Vec<String> = store.delete_attempts().into_iter().map(|(_, id)| id).collect();
    let expected: Vec<String> = expected.iter().map(ToString::to_string).collect();
    assert_collections_equal(&actual, &expected);
}
