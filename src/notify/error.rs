use std::io;

use thiserror::Error;

/// A wire message that is not one of the known notification forms.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseNotificationError {
    #[error("empty notification")]
    Empty,
    #[error("unknown notification kind: {0}")]
    UnknownKind(String),
    #[error("{kind} notification is missing its {part}")]
    MissingPart {
        kind: &'static str,
        part: &'static str,
    },
    #[error("invalid record id: {0}")]
    BadRecordId(String),
    #[error("lock meta is not valid base64url utf-8: {0}")]
    BadMeta(String),
}

/// Failure of a notifier operation.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error(transparent)]
    Parse(#[from] ParseNotificationError),
    #[error("failed to spawn subscriber worker: {0}")]
    Spawn(#[from] io::Error),
}
