use thiserror::Error;

use crate::notify::NotifyError;
use crate::record::{RecordId, Stamp, ValidationError};
use crate::table::TableError;

/// Errors surfaced by the record store and the components built on it.
///
/// `Conflict` and `LockDenied` are expected outcomes of concurrent editing:
/// reload the record and retry. `DuplicateKey`, `InvalidField` and
/// `Validation` are caller mistakes. None of them leave a partial write behind.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("phone {phone} already belongs to record {existing}")]
    DuplicateKey { phone: String, existing: RecordId },

    #[error("record {id} was changed by another session (read at {expected:?}, stored {actual:?})")]
    Conflict {
        id: RecordId,
        expected: Option<Stamp>,
        actual: Option<Stamp>,
    },

    #[error("record {id} not found")]
    NotFound { id: RecordId },

    #[error("unknown field: {0}")]
    InvalidField(String),

    #[error("record {record_id} is being edited by {}", .holder.as_deref().unwrap_or("another session"))]
    LockDenied {
        record_id: RecordId,
        holder: Option<String>,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("record has no id")]
    MissingId,

    #[error("record already has id {0}")]
    AlreadyPersisted(RecordId),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error("store lock poisoned during {0}")]
    Poisoned(&'static str),
}

impl StoreError {
    /// Whether a reload-and-retry can succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StoreError::Conflict { .. } | StoreError::LockDenied { .. })
    }
}
