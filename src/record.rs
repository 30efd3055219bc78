//! Records that flow through the dedup stages.
//!
//! A [`CandidateRecord`] is a point-in-time snapshot of one descendant
//! transaction, taken once by the enumerator. Later stages only read it (or its
//! JSON encoding); deleting the business document behind it never mutates it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the originating parent document; the partition key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParentId(String);

impl ParentId {
    /// Build from raw text. Returns `None` for blank or whitespace-only input.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One descendant document eligible for the dedup check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRecord {
    /// Store-assigned identifier.
    pub id: String,
    pub transaction_number: String,
    /// Free-form type tag from the store.
    pub document_type: String,
    /// Concrete subtype key used for classification.
    pub record_type: String,
    pub transaction_date: String,
    pub date_created: String,
    /// May be blank when the store could not resolve the relation; such records
    /// are dropped by the partitioner.
    pub parent_id: String,
    pub created_by: String,
}

impl CandidateRecord {
    /// The partition key, if the parent relation resolved.
    #[must_use]
    pub fn parent_key(&self) -> Option<ParentId> {
        ParentId::parse(&self.parent_id)
    }

    #[must_use]
    pub fn identity(&self, parent: &ParentId) -> RecordIdentity {
        RecordIdentity {
            parent_id: parent.clone(),
            record_type: self.record_type.clone(),
            id: self.id.clone(),
        }
    }
}

/// Composite identity reported for every deletion attempt.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordIdentity {
    pub parent_id: ParentId,
    pub record_type: String,
    pub id: String,
}

impl fmt::Display for RecordIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.parent_id, self.record_type, self.id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeKind {
    SuccessDelete,
    ErrorDelete,
}

/// Result of a single deletion attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateOutcome {
    pub kind: OutcomeKind,
    pub identity: RecordIdentity,
    /// Store-reported cause, present for `ErrorDelete` only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl DuplicateOutcome {
    #[must_use]
    pub fn deleted(identity: RecordIdentity) -> Self {
        Self {
            kind: OutcomeKind::SuccessDelete,
            identity,
            cause: None,
        }
    }

    #[must_use]
    pub fn failed(identity: RecordIdentity, cause: impl Into<String>) -> Self {
        Self {
            kind: OutcomeKind::ErrorDelete,
            identity,
            cause: Some(cause.into()),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.kind == OutcomeKind::SuccessDelete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_id_rejects_blank() {
        assert!(ParentId::parse("").is_none());
        assert!(ParentId::parse("  \t").is_none());
        assert_eq!(ParentId::parse(" RA-1 ").map(|p| p.to_string()), Some("RA-1".into()));
    }

    #[test]
    fn identity_displays_as_composite() {
        let id = RecordIdentity {
            parent_id: ParentId("RA-1".into()),
            record_type: "ItemRcpt".into(),
            id: "11".into(),
        };
        assert_eq!(id.to_string(), "RA-1/ItemRcpt/11");
    }

    #[test]
    fn outcome_kind_wire_names() -> anyhow::Result<()> {
        assert_eq!(serde_json::to_string(&OutcomeKind::SuccessDelete)?, "\"success-delete\"");
        assert_eq!(serde_json::to_string(&OutcomeKind::ErrorDelete)?, "\"error-delete\"");
        Ok(())
    }
}
