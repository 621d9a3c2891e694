//! A table whose writes can be switched off to simulate an outage.

use std::sync::atomic::{AtomicBool, Ordering};

use phonebook::{ContactTable, InMemoryTable, Record, RecordId, Stamp, TableError};

#[derive(Default)]
pub struct FlakyTable {
    inner: InMemoryTable,
    failing: AtomicBool,
}

impl FlakyTable {
    pub fn new(inner: InMemoryTable) -> Self {
        Self {
            inner,
            failing: AtomicBool::new(false),
        }
    }

    pub fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &InMemoryTable {
        &self.inner
    }

    fn check(&self) -> Result<(), TableError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(TableError::Unavailable("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

impl ContactTable for FlakyTable {
    fn find_all(&self) -> Result<Vec<Record>, TableError> {
        self.inner.find_all()
    }

    fn find_by_key(&self, phone: &str) -> Result<Option<Record>, TableError> {
        self.inner.find_by_key(phone)
    }

    fn find_by_id(&self, id: RecordId) -> Result<Option<Record>, TableError> {
        self.inner.find_by_id(id)
    }

    fn insert(&self, record: &Record) -> Result<RecordId, TableError> {
        self.check()?;
        self.inner.insert(record)
    }

    fn update(&self, record: &Record, expected: Option<Stamp>) -> Result<u64, TableError> {
        self.check()?;
        self.inner.update(record, expected)
    }

    fn delete(&self, record: &Record, expected: Option<Stamp>) -> Result<u64, TableError> {
        self.check()?;
        self.inner.delete(record, expected)
    }
}
