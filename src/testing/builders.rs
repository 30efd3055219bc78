//! Fluent construction of [`CandidateRecord`]s.

use crate::record::CandidateRecord;

/// Builds a candidate record with plausible defaults for every field.
///
/// ```
/// use ironsweep::testing::RecordBuilder;
///
/// let r = RecordBuilder::new("RA-1", "ItemRcpt", "10").tran("IR-0001").build();
/// assert_eq!(r.parent_id, "RA-1");
/// assert_eq!(r.transaction_number, "IR-0001");
/// ```
#[derive(Clone, Debug)]
pub struct RecordBuilder {
    record: CandidateRecord,
}

impl RecordBuilder {
    #[must_use]
    pub fn new(parent_id: &str, record_type: &str, id: &str) -> Self {
        Self {
            record: CandidateRecord {
                id: id.to_string(),
                transaction_number: format!("{record_type}-{id:0>6}"),
                document_type: record_type.to_string(),
                record_type: record_type.to_string(),
                transaction_date: "2024-01-15".to_string(),
                date_created: "2024-01-15 09:30".to_string(),
                parent_id: parent_id.to_string(),
                created_by: "system".to_string(),
            },
        }
    }

    #[must_use]
    pub fn tran(mut self, transaction_number: &str) -> Self {
        self.record.transaction_number = transaction_number.to_string();
        self
    }

    #[must_use]
    pub fn document_type(mut self, document_type: &str) -> Self {
        self.record.document_type = document_type.to_string();
        self
    }

    #[must_use]
    pub fn created_by(mut self, who: &str) -> Self {
        self.record.created_by = who.to_string();
        self
    }

    #[must_use]
    pub fn build(self) -> CandidateRecord {
        self.record
    }
}

/// Records for one parent from `(record_type, id)` pairs, with transaction
/// numbers ascending in the given order.
#[must_use]
pub fn records_for(parent_id: &str, rows: &[(&str, &str)]) -> Vec<CandidateRecord> {
    rows.iter()
        .enumerate()
        .map(|(n, (ty, id))| {
            RecordBuilder::new(parent_id, ty, id)
                .tran(&format!("{parent_id}-T{n:04}"))
                .build()
        })
        .collect()
}
