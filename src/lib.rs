mod clock;
mod concurrency;
mod config;
mod error;
mod lock;
mod notify;
mod phonebook;
mod query;
mod record;
mod session;
mod store;
mod table;

pub use clock::{Clock, ManualClock, SystemClock};
pub use concurrency::{Conflict, DeleteOutcome, UpdateOutcome};
pub use config::PhonebookConfig;
pub use error::StoreError;
pub use lock::{InMemoryLockCoordinator, LockCoordinator};
pub use notify::{
    ChangeNotifier, Notification, NotifyError, ParseNotificationError, Subscription,
    VersionWatch, DATA_UPDATED,
};
pub use phonebook::Phonebook;
pub use query::{
    CompiledQuery, Page, Query, QueryEngine, RecordSource, SortDirection, TableSource,
};
pub use record::{
    by_name, Field, FieldValue, Record, RecordId, Stamp, ValidationError, ValidationRules,
};
pub use session::EditSession;
pub use store::RecordStore;
pub use table::{ContactTable, InMemoryTable, TableError};
