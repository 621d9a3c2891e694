//! ContactTable - the persistent collaborator behind the record store.
//!
//! The store only needs a narrow CRUD contract from its backing storage.
//! Conditional writes take the stamp the caller expects to find and report
//! how many rows they touched; zero rows means the row was changed or removed
//! underneath the caller, which the store reports as a conflict.
//!
//! ```text
//! ┌──────────────┐   find_all / find_by_key / find_by_id
//! │ RecordStore  │──────────────────────────────────────────┐
//! │ (index cache)│   insert / update(expected) / delete      ▼
//! └──────────────┘                                  ┌──────────────────┐
//!                                                   │  ContactTable    │
//!                                                   │  InMemoryTable   │
//!                                                   │  (SQL, external) │
//!                                                   └──────────────────┘
//! ```

mod error;
mod in_memory;

use std::sync::Arc;

use crate::record::{Record, RecordId, Stamp};

pub use error::TableError;
pub use in_memory::InMemoryTable;

/// CRUD contract the store consumes.
pub trait ContactTable: Send + Sync {
    /// Every row, ordered by name.
    fn find_all(&self) -> Result<Vec<Record>, TableError>;

    fn find_by_key(&self, phone: &str) -> Result<Option<Record>, TableError>;

    fn find_by_id(&self, id: RecordId) -> Result<Option<Record>, TableError>;

    /// Persist a new row and return the id the table assigned.
    fn insert(&self, record: &Record) -> Result<RecordId, TableError>;

    /// Overwrite the row with `record.id` if its stamp still equals
    /// `expected`. `None` matches a row that was never stamped. Returns the
    /// number of rows written.
    fn update(&self, record: &Record, expected: Option<Stamp>) -> Result<u64, TableError>;

    /// Remove the row with `record.id` if its stamp still equals `expected`.
    /// Returns the number of rows removed.
    fn delete(&self, record: &Record, expected: Option<Stamp>) -> Result<u64, TableError>;
}

impl<T: ContactTable + ?Sized> ContactTable for Arc<T> {
    fn find_all(&self) -> Result<Vec<Record>, TableError> {
        (**self).find_all()
    }

    fn find_by_key(&self, phone: &str) -> Result<Option<Record>, TableError> {
        (**self).find_by_key(phone)
    }

    fn find_by_id(&self, id: RecordId) -> Result<Option<Record>, TableError> {
        (**self).find_by_id(id)
    }

    fn insert(&self, record: &Record) -> Result<RecordId, TableError> {
        (**self).insert(record)
    }

    fn update(&self, record: &Record, expected: Option<Stamp>) -> Result<u64, TableError> {
        (**self).update(record, expected)
    }

    fn delete(&self, record: &Record, expected: Option<Stamp>) -> Result<u64, TableError> {
        (**self).delete(record, expected)
    }
}
