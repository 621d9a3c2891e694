use crate::error::StoreError;
use crate::record::{Record, RecordId, Stamp};

/// The stamps involved in a rejected write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conflict {
    pub id: RecordId,
    /// The stamp the caller read before editing.
    pub expected: Option<Stamp>,
    /// The stamp found at commit time, if the row is still known.
    pub actual: Option<Stamp>,
}

impl From<Conflict> for StoreError {
    fn from(conflict: Conflict) -> Self {
        StoreError::Conflict {
            id: conflict.id,
            expected: conflict.expected,
            actual: conflict.actual,
        }
    }
}

/// Result of committing an update.
#[must_use = "a conflict or missing record must be handled"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The write was applied; carries the stored record with its new stamp.
    Updated(Record),
    /// Nothing differed. The stored record is returned with its stamp unchanged.
    Unchanged(Record),
    /// The record changed since the caller read it. Nothing was written.
    Conflict(Conflict),
    /// The record no longer exists.
    NotFound(RecordId),
}

impl UpdateOutcome {
    /// Whether the store now holds the caller's values.
    pub fn is_saved(&self) -> bool {
        matches!(self, UpdateOutcome::Updated(_) | UpdateOutcome::Unchanged(_))
    }

    pub fn record(&self) -> Option<&Record> {
        match self {
            UpdateOutcome::Updated(record) | UpdateOutcome::Unchanged(record) => Some(record),
            _ => None,
        }
    }

    pub fn into_result(self) -> Result<Record, StoreError> {
        match self {
            UpdateOutcome::Updated(record) | UpdateOutcome::Unchanged(record) => Ok(record),
            UpdateOutcome::Conflict(conflict) => Err(conflict.into()),
            UpdateOutcome::NotFound(id) => Err(StoreError::NotFound { id }),
        }
    }
}

/// Result of committing a delete.
#[must_use = "a conflict or missing record must be handled"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The row was removed; carries the record as it was stored.
    Deleted(Record),
    Conflict(Conflict),
    NotFound(RecordId),
}

impl DeleteOutcome {
    pub fn is_deleted(&self) -> bool {
        matches!(self, DeleteOutcome::Deleted(_))
    }

    pub fn into_result(self) -> Result<Record, StoreError> {
        match self {
            DeleteOutcome::Deleted(record) => Ok(record),
            DeleteOutcome::Conflict(conflict) => Err(conflict.into()),
            DeleteOutcome::NotFound(id) => Err(StoreError::NotFound { id }),
        }
    }
}
