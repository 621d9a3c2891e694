//! Immutable index snapshots and the cell that swaps them.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::StoreError;
use crate::record::{by_name, Record, RecordId};

/// One consistent view of the store: every row by id, the unique phone
/// index, the id → phone reverse index and the rows in listing order.
///
/// Published snapshots are never mutated. A mutation clones the current one,
/// patches the clone and swaps it in, so readers see the old state or the
/// new one, nothing else. `ordered` is kept sorted by [`by_name`] and patched
/// by binary search.
#[derive(Debug, Default, Clone)]
pub(crate) struct Index {
    rows: HashMap<RecordId, Arc<Record>>,
    by_key: HashMap<String, Arc<Record>>,
    key_of: HashMap<RecordId, String>,
    ordered: Vec<Arc<Record>>,
}

impl Index {
    /// Build from persisted rows. Rows without an id are skipped.
    pub(crate) fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        let rows = records
            .into_iter()
            .filter_map(|record| record.id.map(|id| (id, Arc::new(record))))
            .collect();
        Self::build(rows)
    }

    fn build(rows: HashMap<RecordId, Arc<Record>>) -> Self {
        let mut by_key = HashMap::with_capacity(rows.len());
        let mut key_of = HashMap::with_capacity(rows.len());
        for (id, record) in &rows {
            if let Some(key) = record.key() {
                by_key.insert(key.to_string(), Arc::clone(record));
                key_of.insert(*id, key.to_string());
            }
        }

        let mut ordered: Vec<Arc<Record>> = rows.values().cloned().collect();
        ordered.sort_by(|a, b| by_name(a, b));

        Self {
            rows,
            by_key,
            key_of,
            ordered,
        }
    }

    /// The next snapshot with `record` inserted or replaced.
    pub(crate) fn with_upsert(&self, record: Record) -> Self {
        let mut next = self.clone();
        if let Some(id) = record.id {
            next.unlink(id);
            next.link(id, Arc::new(record));
        }
        next
    }

    /// The next snapshot without `id`.
    pub(crate) fn with_removed(&self, id: RecordId) -> Self {
        let mut next = self.clone();
        next.unlink(id);
        next
    }

    fn unlink(&mut self, id: RecordId) {
        let Some(old) = self.rows.remove(&id) else {
            return;
        };
        if let Some(key) = self.key_of.remove(&id) {
            self.by_key.remove(&key);
        }
        if let Ok(at) = self.ordered.binary_search_by(|row| by_name(row, &old)) {
            self.ordered.remove(at);
        }
    }

    fn link(&mut self, id: RecordId, record: Arc<Record>) {
        if let Some(key) = record.key() {
            self.by_key.insert(key.to_string(), Arc::clone(&record));
            self.key_of.insert(id, key.to_string());
        }
        let at = self
            .ordered
            .binary_search_by(|row| by_name(row, &record))
            .unwrap_or_else(|at| at);
        self.ordered.insert(at, Arc::clone(&record));
        self.rows.insert(id, record);
    }

    pub(crate) fn get(&self, id: RecordId) -> Option<&Record> {
        self.rows.get(&id).map(|record| record.as_ref())
    }

    pub(crate) fn get_by_key(&self, phone: &str) -> Option<&Record> {
        self.by_key.get(phone).map(|record| record.as_ref())
    }

    pub(crate) fn key_of(&self, id: RecordId) -> Option<&str> {
        self.key_of.get(&id).map(String::as_str)
    }

    /// The record owning `phone`, unless it is `except`.
    pub(crate) fn key_owner(&self, phone: &str, except: Option<RecordId>) -> Option<RecordId> {
        if phone.is_empty() {
            return None;
        }
        self.get_by_key(phone)
            .and_then(|owner| owner.id)
            .filter(|owner| Some(*owner) != except)
    }

    pub(crate) fn ordered(&self) -> impl Iterator<Item = &Record> {
        self.ordered.iter().map(|record| record.as_ref())
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Holds the current snapshot. Loads are cheap `Arc` clones.
#[derive(Debug, Default)]
pub(crate) struct IndexCell {
    current: RwLock<Arc<Index>>,
}

impl IndexCell {
    pub(crate) fn load(&self) -> Result<Arc<Index>, StoreError> {
        self.current
            .read()
            .map(|index| Arc::clone(&index))
            .map_err(|_| StoreError::Poisoned("index read"))
    }

    pub(crate) fn swap(&self, next: Index) -> Result<(), StoreError> {
        let mut current = self
            .current
            .write()
            .map_err(|_| StoreError::Poisoned("index swap"))?;
        *current = Arc::new(next);
        Ok(())
    }
}
