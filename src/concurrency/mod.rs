//! Concurrency Controller - optimistic concurrency for every mutation.
//!
//! Each record's `last_modified` stamp doubles as its version token. A caller
//! reads a record, edits it, and hands it back with the stamp it read. The
//! controller compares that stamp with the stored one inside a single critical
//! section that also covers the collaborator write and the index swap, so two
//! writers that read the same stamp can never both win.
//!
//! ```text
//!   commit_update(candidate)
//!     lock gate ─┬─ stored = index[id]         → NotFound
//!                ├─ stored.stamp != candidate  → Conflict   (nothing written)
//!                ├─ no field differs           → Unchanged  (stamp kept)
//!                ├─ phone owned elsewhere      → DuplicateKey
//!                ├─ table.update(expected)     → 0 rows → Conflict
//!                └─ swap index                 → Updated(fresh stamp)
//! ```

mod outcome;

use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::StoreError;
use crate::record::{Record, Stamp};
use crate::store::index::{Index, IndexCell};
use crate::table::ContactTable;

pub use outcome::{Conflict, DeleteOutcome, UpdateOutcome};

/// Serializes mutations and issues strictly increasing stamps.
pub struct ConcurrencyController {
    /// Last stamp handed out. Guarding it doubles as the mutation lock.
    gate: Mutex<Stamp>,
    clock: Arc<dyn Clock>,
}

impl ConcurrencyController {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            gate: Mutex::new(Stamp::ZERO),
            clock,
        }
    }

    /// A stamp later than both the last one issued and `previous`, even if
    /// the clock went backwards.
    fn issue(last: &mut Stamp, clock: &dyn Clock, previous: Option<Stamp>) -> Stamp {
        let floor = previous.map_or(last.next(), |prev| prev.max(*last).next());
        let stamp = clock.now().max(floor);
        *last = stamp;
        stamp
    }

    /// Insert a new record. Uniqueness is checked against the index inside
    /// the same critical section that assigns the id.
    pub(crate) fn commit_insert<T: ContactTable + ?Sized>(
        &self,
        table: &T,
        cell: &IndexCell,
        candidate: Record,
    ) -> Result<Record, StoreError> {
        if let Some(id) = candidate.id {
            return Err(StoreError::AlreadyPersisted(id));
        }

        let mut last = self
            .gate
            .lock()
            .map_err(|_| StoreError::Poisoned("commit_insert"))?;
        let current = cell.load()?;

        if let Some(existing) = current.key_owner(&candidate.phone, None) {
            debug!(phone = %candidate.phone, existing, "insert rejected: duplicate key");
            return Err(StoreError::DuplicateKey {
                phone: candidate.phone,
                existing,
            });
        }

        let mut record = candidate;
        record.last_modified = Some(Self::issue(&mut last, self.clock.as_ref(), None));
        let id = table.insert(&record).map_err(|err| {
            warn!(error = %err, "insert failed in table; index untouched");
            err
        })?;
        record.id = Some(id);

        cell.swap(current.with_upsert(record.clone()))?;
        debug!(id, phone = %record.phone, "record inserted");
        Ok(record)
    }

    pub(crate) fn commit_update<T: ContactTable + ?Sized>(
        &self,
        table: &T,
        cell: &IndexCell,
        candidate: Record,
    ) -> Result<UpdateOutcome, StoreError> {
        let id = candidate.id.ok_or(StoreError::MissingId)?;

        let mut last = self
            .gate
            .lock()
            .map_err(|_| StoreError::Poisoned("commit_update"))?;
        let current = cell.load()?;

        let Some(stored) = current.get(id) else {
            return Ok(UpdateOutcome::NotFound(id));
        };
        if stored.last_modified != candidate.last_modified {
            info!(
                id,
                expected = ?candidate.last_modified,
                actual = ?stored.last_modified,
                "update rejected: stale stamp"
            );
            return Ok(UpdateOutcome::Conflict(Conflict {
                id,
                expected: candidate.last_modified,
                actual: stored.last_modified,
            }));
        }
        if stored.same_content(&candidate) {
            return Ok(UpdateOutcome::Unchanged(stored.clone()));
        }
        if let Some(existing) = current.key_owner(&candidate.phone, Some(id)) {
            debug!(id, phone = %candidate.phone, existing, "update rejected: duplicate key");
            return Err(StoreError::DuplicateKey {
                phone: candidate.phone,
                existing,
            });
        }

        let expected = stored.last_modified;
        let mut record = candidate;
        record.last_modified = Some(Self::issue(&mut last, self.clock.as_ref(), expected));

        let written = table.update(&record, expected).map_err(|err| {
            warn!(id, error = %err, "update failed in table; index untouched");
            err
        })?;
        if written == 0 {
            warn!(id, "table rejected update for a stamp the index still holds; reload advised");
            return Ok(UpdateOutcome::Conflict(Conflict {
                id,
                expected,
                actual: None,
            }));
        }

        cell.swap(current.with_upsert(record.clone()))?;
        debug!(id, previous = ?expected, stamp = ?record.last_modified, "record updated");
        Ok(UpdateOutcome::Updated(record))
    }

    pub(crate) fn commit_delete<T: ContactTable + ?Sized>(
        &self,
        table: &T,
        cell: &IndexCell,
        candidate: &Record,
    ) -> Result<DeleteOutcome, StoreError> {
        let id = candidate.id.ok_or(StoreError::MissingId)?;

        let _last = self
            .gate
            .lock()
            .map_err(|_| StoreError::Poisoned("commit_delete"))?;
        let current = cell.load()?;

        let Some(stored) = current.get(id) else {
            return Ok(DeleteOutcome::NotFound(id));
        };
        if stored.last_modified != candidate.last_modified {
            info!(
                id,
                expected = ?candidate.last_modified,
                actual = ?stored.last_modified,
                "delete rejected: stale stamp"
            );
            return Ok(DeleteOutcome::Conflict(Conflict {
                id,
                expected: candidate.last_modified,
                actual: stored.last_modified,
            }));
        }

        let expected = stored.last_modified;
        let removed = table.delete(stored, expected).map_err(|err| {
            warn!(id, error = %err, "delete failed in table; index untouched");
            err
        })?;
        if removed == 0 {
            warn!(id, "table rejected delete for a stamp the index still holds; reload advised");
            return Ok(DeleteOutcome::Conflict(Conflict {
                id,
                expected,
                actual: None,
            }));
        }

        let record = stored.clone();
        cell.swap(current.with_removed(id))?;
        debug!(id, "record deleted");
        Ok(DeleteOutcome::Deleted(record))
    }

    /// Rebuild the index from the table, serialized with mutations.
    pub(crate) fn reload<T: ContactTable + ?Sized>(
        &self,
        table: &T,
        cell: &IndexCell,
    ) -> Result<usize, StoreError> {
        let mut last = self
            .gate
            .lock()
            .map_err(|_| StoreError::Poisoned("reload"))?;

        let index = Index::from_records(table.find_all()?);
        // stamps read back from the table must stay below what we issue next
        if let Some(newest) = index.ordered().filter_map(|r| r.last_modified).max() {
            *last = (*last).max(newest);
        }
        let rows = index.len();
        cell.swap(index)?;
        debug!(rows, "index reloaded");
        Ok(rows)
    }
}
