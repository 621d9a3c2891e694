//! Phonebook - the shared context every session works through.
//!
//! Builds one record store, one lock coordinator, one notifier and one query
//! engine, wired to each other, and hands out cheap clones. There is no
//! global instance; pass the context (or a clone) to whoever needs it.
//!
//! ## Example
//!
//! ```
//! use phonebook::{Phonebook, PhonebookConfig, Record};
//!
//! let book = Phonebook::in_memory(PhonebookConfig::default()).unwrap();
//! let amy = book.store().insert(Record::new("Amy", "222")).unwrap();
//!
//! let mut session = book.session("session-A").unwrap();
//! let mut draft = session.begin_edit(amy.id.unwrap()).unwrap();
//! draft.city = "Oslo".into();
//! let saved = session.save(draft).unwrap();
//! assert_eq!(saved.city, "Oslo");
//! ```

use std::sync::Arc;

use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::config::PhonebookConfig;
use crate::error::StoreError;
use crate::lock::{InMemoryLockCoordinator, LockCoordinator};
use crate::notify::ChangeNotifier;
use crate::query::{Page, Query, QueryEngine};
use crate::record::Record;
use crate::session::EditSession;
use crate::store::RecordStore;
use crate::table::{ContactTable, InMemoryTable};

pub struct Phonebook<T: ContactTable = InMemoryTable> {
    store: Arc<RecordStore<T>>,
    locks: Arc<dyn LockCoordinator>,
    notifier: ChangeNotifier,
    queries: Arc<QueryEngine<Arc<RecordStore<T>>>>,
    config: Arc<PhonebookConfig>,
}

impl<T: ContactTable> Clone for Phonebook<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            locks: Arc::clone(&self.locks),
            notifier: self.notifier.clone(),
            queries: Arc::clone(&self.queries),
            config: Arc::clone(&self.config),
        }
    }
}

impl<T: ContactTable> Phonebook<T> {
    /// Open a phonebook over `table`, stamping writes with the system clock.
    pub fn new(config: PhonebookConfig, table: T) -> Result<Self, StoreError> {
        Self::with_clock(config, table, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: PhonebookConfig,
        table: T,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StoreError> {
        let notifier = ChangeNotifier::with_worker_prefix(config.worker_name_prefix.clone());
        let locks = InMemoryLockCoordinator::new(notifier.clone());
        Self::with_parts(config, table, clock, notifier, Arc::new(locks))
    }

    /// Wire a phonebook from explicit parts. `locks` should publish through
    /// `notifier` so sessions see lock traffic.
    pub fn with_parts(
        config: PhonebookConfig,
        table: T,
        clock: Arc<dyn Clock>,
        notifier: ChangeNotifier,
        locks: Arc<dyn LockCoordinator>,
    ) -> Result<Self, StoreError> {
        let store = Arc::new(RecordStore::open(
            table,
            notifier.clone(),
            clock,
            config.validation.clone(),
        )?);
        let queries = Arc::new(QueryEngine::new(Arc::clone(&store)));
        info!(
            records = store.count()?,
            worker_prefix = %config.worker_name_prefix,
            "phonebook ready"
        );

        Ok(Self {
            store,
            locks,
            notifier,
            queries,
            config: Arc::new(config),
        })
    }

    pub fn store(&self) -> &RecordStore<T> {
        &self.store
    }

    pub fn locks(&self) -> &dyn LockCoordinator {
        self.locks.as_ref()
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    pub fn queries(&self) -> &QueryEngine<Arc<RecordStore<T>>> {
        &self.queries
    }

    pub fn config(&self) -> &PhonebookConfig {
        &self.config
    }

    pub fn query(&self, query: &Query) -> Result<Page, StoreError> {
        self.queries.run(query)
    }

    /// Open an edit session for `holder`. Holder ids should be unique per
    /// session; two sessions sharing one id share its locks.
    pub fn session(&self, holder: impl Into<String>) -> Result<EditSession<T>, StoreError> {
        EditSession::open(self, holder)
    }
}

impl Phonebook<InMemoryTable> {
    /// An empty phonebook backed by the in-process table.
    pub fn in_memory(config: PhonebookConfig) -> Result<Self, StoreError> {
        Self::new(config, InMemoryTable::new())
    }

    /// A phonebook preloaded with unsaved `records`. Ids are assigned in
    /// order starting at 1. Seed rows are not validated.
    pub fn seeded(
        config: PhonebookConfig,
        records: impl IntoIterator<Item = Record>,
    ) -> Result<Self, StoreError> {
        let table = InMemoryTable::seeded(records, SystemClock.now())?;
        Self::new(config, table)
    }
}
