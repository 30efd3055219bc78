//! Map stage: key each candidate by its parent.
//!
//! Records cross the stage boundary as JSON payloads. The partitioner decodes
//! each one, checks that its parent relation resolved, and emits
//! `(parent_id, payload)` unchanged.

use crate::error::StageError;
use crate::record::{CandidateRecord, ParentId};

/// Serialize a record for transport to the map stage.
pub fn encode_record(record: &CandidateRecord) -> Result<String, StageError> {
    serde_json::to_string(record).map_err(|e| StageError::Partition {
        reason: format!("record {} could not be encoded: {e}", record.id),
    })
}

/// Key one payload by its parent id.
pub fn partition(payload: &str) -> Result<(ParentId, String), StageError> {
    let record: CandidateRecord = serde_json::from_str(payload).map_err(|e| StageError::Partition {
        reason: format!("malformed payload: {e}"),
    })?;
    let Some(key) = record.parent_key() else {
        return Err(StageError::Partition {
            reason: format!(
                "record {} ({}) has no resolvable parent",
                record.id, record.transaction_number
            ),
        });
    };
    Ok((key, payload.to_string()))
}
