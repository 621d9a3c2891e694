//! Record Store - the canonical record set and its lookup indexes.
//!
//! Reads go to an immutable index snapshot and never wait on writers.
//! Writes go through the `ConcurrencyController`, which writes the
//! collaborator first and swaps the snapshot only once the write succeeded.
//! After the swap the store bumps the notifier version, so a session that
//! sees the new version also sees the new data.
//!
//! ```text
//!  get / get_by_key / list / page ──▶ IndexCell ──▶ Arc<Index>
//!
//!  insert / update / delete
//!    validate ─▶ ConcurrencyController ─▶ ContactTable ─▶ swap Index
//!                                                      └▶ notifier.bump_version()
//! ```

pub(crate) mod index;

use std::sync::Arc;

use tracing::{debug, info};

use crate::clock::Clock;
use crate::concurrency::{ConcurrencyController, DeleteOutcome, UpdateOutcome};
use crate::error::StoreError;
use crate::notify::ChangeNotifier;
use crate::query::RecordSource;
use crate::record::{Record, RecordId, ValidationRules};
use crate::table::ContactTable;

use index::IndexCell;

/// Shared record set over a [`ContactTable`].
///
/// Thread-safe; wrap it in an `Arc` to share between sessions.
pub struct RecordStore<T> {
    table: T,
    index: IndexCell,
    controller: ConcurrencyController,
    notifier: ChangeNotifier,
    rules: ValidationRules,
}

impl<T: ContactTable> RecordStore<T> {
    /// Build the store and load the index from `table`.
    pub fn open(
        table: T,
        notifier: ChangeNotifier,
        clock: Arc<dyn Clock>,
        rules: ValidationRules,
    ) -> Result<Self, StoreError> {
        let store = Self {
            table,
            index: IndexCell::default(),
            controller: ConcurrencyController::new(clock),
            notifier,
            rules,
        };
        let rows = store.reload()?;
        info!(rows, "record store opened");
        Ok(store)
    }

    pub fn get(&self, id: RecordId) -> Result<Option<Record>, StoreError> {
        Ok(self.index.load()?.get(id).cloned())
    }

    pub fn get_by_key(&self, phone: &str) -> Result<Option<Record>, StoreError> {
        Ok(self.index.load()?.get_by_key(phone).cloned())
    }

    /// Copy of every record, ordered by name.
    pub fn list(&self) -> Result<Vec<Record>, StoreError> {
        Ok(self.index.load()?.ordered().cloned().collect())
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        Ok(self.index.load()?.len())
    }

    /// A window of [`list`](Self::list).
    pub fn page(&self, offset: usize, limit: usize) -> Result<Vec<Record>, StoreError> {
        Ok(self
            .index
            .load()?
            .ordered()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    /// Whether `phone` can be saved on the record being edited. An empty
    /// phone is always available.
    pub fn is_key_available(
        &self,
        phone: &str,
        editing: Option<RecordId>,
    ) -> Result<bool, StoreError> {
        Ok(self.index.load()?.key_owner(phone, editing).is_none())
    }

    /// Persist a new record and return it with its id and stamp.
    pub fn insert(&self, record: Record) -> Result<Record, StoreError> {
        self.rules.check(&record)?;
        let saved = self
            .controller
            .commit_insert(&self.table, &self.index, record)?;
        let version = self.notifier.bump_version();
        debug!(id = ?saved.id, version, "insert published");
        Ok(saved)
    }

    /// Commit `record` if its stamp still matches the stored one.
    pub fn update(&self, record: Record) -> Result<UpdateOutcome, StoreError> {
        self.rules.check(&record)?;
        let outcome = self
            .controller
            .commit_update(&self.table, &self.index, record)?;
        if let UpdateOutcome::Updated(saved) = &outcome {
            let version = self.notifier.bump_version();
            debug!(id = ?saved.id, version, "update published");
        }
        Ok(outcome)
    }

    /// Remove `record` if its stamp still matches the stored one.
    pub fn delete(&self, record: &Record) -> Result<DeleteOutcome, StoreError> {
        let outcome = self
            .controller
            .commit_delete(&self.table, &self.index, record)?;
        if outcome.is_deleted() {
            let version = self.notifier.bump_version();
            debug!(id = ?record.id, version, "delete published");
        }
        Ok(outcome)
    }

    /// Rebuild the index from the table. Does not change the version.
    pub fn reload(&self) -> Result<usize, StoreError> {
        self.controller.reload(&self.table, &self.index)
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }
}

impl<T: ContactTable> RecordSource for RecordStore<T> {
    fn snapshot(&self) -> Result<Vec<Record>, StoreError> {
        self.list()
    }
}
