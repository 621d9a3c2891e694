//! InMemoryTable - BTreeMap-backed contact table for tests and single-process use.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use super::{ContactTable, TableError};
use crate::record::{by_name, Record, RecordId, Stamp};

/// Internal stored representation of a row.
struct StoredRow {
    bytes: Vec<u8>,
    phone: String,
    last_modified: Option<Stamp>,
}

impl StoredRow {
    fn encode(record: &Record) -> Result<Self, TableError> {
        let bytes =
            bitcode::serialize(record).map_err(|e| TableError::Encoding(e.to_string()))?;
        Ok(Self {
            bytes,
            phone: record.phone.clone(),
            last_modified: record.last_modified,
        })
    }

    fn decode(&self) -> Result<Record, TableError> {
        bitcode::deserialize(&self.bytes).map_err(|e| TableError::Encoding(e.to_string()))
    }
}

/// In-process contact table.
///
/// Rows are kept encoded, so every read hands out a fresh copy. Ids are one
/// greater than the current maximum. Like a SQL table with a unique phone
/// column, it refuses a second row with the same non-empty phone.
/// Clone-friendly via Arc.
#[derive(Clone, Default)]
pub struct InMemoryTable {
    rows: Arc<RwLock<BTreeMap<RecordId, StoredRow>>>,
}

impl InMemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from unsaved records, assigning ids 1.. in order and
    /// stamping every row with `stamp`.
    pub fn seeded(
        records: impl IntoIterator<Item = Record>,
        stamp: Stamp,
    ) -> Result<Self, TableError> {
        let table = Self::new();
        for mut record in records {
            record.last_modified = Some(stamp);
            table.insert(&record)?;
        }
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn phone_taken(
        rows: &BTreeMap<RecordId, StoredRow>,
        phone: &str,
        except: Option<RecordId>,
    ) -> bool {
        !phone.is_empty()
            && rows
                .iter()
                .any(|(id, row)| Some(*id) != except && row.phone == phone)
    }
}

impl ContactTable for InMemoryTable {
    fn find_all(&self) -> Result<Vec<Record>, TableError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| TableError::Poisoned("find_all"))?;
        let mut records = rows
            .values()
            .map(StoredRow::decode)
            .collect::<Result<Vec<_>, _>>()?;
        records.sort_by(by_name);
        Ok(records)
    }

    fn find_by_key(&self, phone: &str) -> Result<Option<Record>, TableError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| TableError::Poisoned("find_by_key"))?;
        rows.values()
            .find(|row| row.phone == phone)
            .map(StoredRow::decode)
            .transpose()
    }

    fn find_by_id(&self, id: RecordId) -> Result<Option<Record>, TableError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| TableError::Poisoned("find_by_id"))?;
        rows.get(&id).map(StoredRow::decode).transpose()
    }

    fn insert(&self, record: &Record) -> Result<RecordId, TableError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| TableError::Poisoned("insert"))?;

        if Self::phone_taken(&rows, &record.phone, None) {
            return Err(TableError::Constraint(format!(
                "duplicate phone {}",
                record.phone
            )));
        }

        let id = rows.keys().next_back().map(|max| max + 1).unwrap_or(1);
        let mut row = record.clone();
        row.id = Some(id);
        rows.insert(id, StoredRow::encode(&row)?);
        Ok(id)
    }

    fn update(&self, record: &Record, expected: Option<Stamp>) -> Result<u64, TableError> {
        let Some(id) = record.id else {
            return Ok(0);
        };
        let mut rows = self
            .rows
            .write()
            .map_err(|_| TableError::Poisoned("update"))?;

        match rows.get(&id) {
            Some(row) if row.last_modified == expected => {}
            _ => return Ok(0),
        }
        if Self::phone_taken(&rows, &record.phone, Some(id)) {
            return Err(TableError::Constraint(format!(
                "duplicate phone {}",
                record.phone
            )));
        }

        rows.insert(id, StoredRow::encode(record)?);
        Ok(1)
    }

    fn delete(&self, record: &Record, expected: Option<Stamp>) -> Result<u64, TableError> {
        let Some(id) = record.id else {
            return Ok(0);
        };
        let mut rows = self
            .rows
            .write()
            .map_err(|_| TableError::Poisoned("delete"))?;

        match rows.get(&id) {
            Some(row) if row.last_modified == expected => {
                rows.remove(&id);
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}
