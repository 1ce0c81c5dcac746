//! Upsert gate: decides whether a freshly projected row must be appended
//!
//! The comparison walks the columns of the *stored* row only. A column that
//! exists in the candidate but not in the stored row never triggers an
//! insert on its own, so widening a table does not rewrite every history.

use crate::projection::{ColumnValue, RowRecord, SYNC_TIME_COLUMN};

/// Why a candidate row is appended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertReason {
    /// No row has been stored for this business key yet
    FirstSighting,
    /// The named stored column differs from (or is missing in) the candidate
    ColumnChanged(String),
}

/// Outcome of comparing a candidate against the latest stored row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Insert(InsertReason),
    Skip,
}

impl Decision {
    pub fn is_insert(&self) -> bool {
        matches!(self, Self::Insert(_))
    }
}

/// Compare `candidate` against `latest`
pub fn decide(latest: Option<&RowRecord>, candidate: Option<&RowRecord>) -> Decision {
    let Some(latest) = latest else {
        return Decision::Insert(InsertReason::FirstSighting);
    };
    let Some(candidate) = candidate.filter(|c| !c.is_empty()) else {
        return Decision::Skip;
    };

    for (column, stored) in latest.iter() {
        if column == SYNC_TIME_COLUMN {
            continue;
        }
        let current = candidate.get(column);
        let changed = match (stored, current) {
            (ColumnValue::Null, Some(value)) => !value.is_null(),
            (ColumnValue::Null, None) => false,
            (_, None) => true,
            (stored, Some(value)) => stored != value,
        };
        if changed {
            return Decision::Insert(InsertReason::ColumnChanged(column.to_string()));
        }
    }

    Decision::Skip
}
