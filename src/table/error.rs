use thiserror::Error;

/// Failure reported by a [`ContactTable`](super::ContactTable).
///
/// The store never retries these; they propagate to the caller and the index
/// stays as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// The backing storage could not be reached.
    #[error("table unavailable: {0}")]
    Unavailable(String),
    /// A row could not be encoded or decoded.
    #[error("row encoding failed: {0}")]
    Encoding(String),
    /// The table refused the write (e.g. a unique constraint).
    #[error("constraint violated: {0}")]
    Constraint(String),
    /// The table's own lock was poisoned.
    #[error("table lock poisoned during {0}")]
    Poisoned(&'static str),
}
