//! The four dedup stages, in run order.

pub mod aggregate;
pub mod enumerate;
pub mod partition;
pub mod resolve;

pub use aggregate::{aggregate, decode_outcomes, encode_outcome};
pub use enumerate::Enumerator;
pub use partition::{encode_record, partition};
pub use resolve::{
    Flagged, Resolution, Subtype, SubtypeTally, apply_deletions, detect_excess, resolve, resolve_partition,
};
