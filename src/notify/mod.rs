//! Change Notifier - version counter plus fan-out broadcast.
//!
//! ## Architecture
//!
//! ```text
//!            publish(n)                     per-subscriber FIFO
//! ┌───────────────────────┐   send    ┌──────────┐   recv   ┌──────────────┐
//! │ ChangeNotifier        │──────────▶│ channel 1│─────────▶│ worker 1     │─▶ handler
//! │  version: AtomicU64   │──────────▶│ channel 2│─────────▶│ worker 2     │─▶ handler
//! │  subscribers: map     │    ...    └──────────┘          └──────────────┘
//! └───────────────────────┘
//! ```
//!
//! Publishing never waits on a handler. Each subscriber owns a channel and a
//! worker thread, so a slow or panicking handler only delays itself. Sessions
//! that prefer polling compare [`ChangeNotifier::current_version`] against the
//! last version they saw, via [`VersionWatch`].
//!
//! ## Example
//!
//! ```
//! use std::sync::mpsc;
//! use phonebook::{ChangeNotifier, Notification};
//!
//! let notifier = ChangeNotifier::new();
//! let (tx, rx) = mpsc::channel();
//! let subscription = notifier
//!     .subscribe(move |n: &Notification| {
//!         let _ = tx.send(n.to_string());
//!     })
//!     .unwrap();
//!
//! assert_eq!(notifier.bump_version(), 1);
//! assert_eq!(rx.recv().unwrap(), "DATA_UPDATED");
//!
//! notifier.unsubscribe(subscription);
//! ```

mod error;
mod message;

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

pub use error::{NotifyError, ParseNotificationError};
pub use message::{Notification, DATA_UPDATED};

const DEFAULT_WORKER_PREFIX: &str = "phonebook-notify";

struct Shared {
    version: AtomicU64,
    next_subscriber: AtomicU64,
    subscribers: Mutex<HashMap<u64, Sender<Notification>>>,
    worker_prefix: String,
}

impl Shared {
    fn remove(&self, id: u64) -> bool {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some()
    }
}

/// Process-wide version counter and broadcast channel.
///
/// Clone-friendly via Arc; every clone publishes to the same subscribers.
#[derive(Clone)]
pub struct ChangeNotifier {
    shared: Arc<Shared>,
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::with_worker_prefix(DEFAULT_WORKER_PREFIX)
    }

    /// Worker threads are named `<prefix>-<subscriber id>`.
    pub fn with_worker_prefix(prefix: impl Into<String>) -> Self {
        Self {
            shared: Arc::new(Shared {
                version: AtomicU64::new(0),
                next_subscriber: AtomicU64::new(1),
                subscribers: Mutex::new(HashMap::new()),
                worker_prefix: prefix.into(),
            }),
        }
    }

    /// The number of successful mutations announced so far.
    pub fn current_version(&self) -> u64 {
        self.shared.version.load(Ordering::SeqCst)
    }

    /// Count one mutation and broadcast `DATA_UPDATED`. Returns the new version.
    pub fn bump_version(&self) -> u64 {
        let version = self.shared.version.fetch_add(1, Ordering::SeqCst) + 1;
        self.publish(Notification::DataUpdated);
        version
    }

    /// Queue `notification` for every subscriber and return how many it
    /// reached. Never blocks on a handler.
    pub fn publish(&self, notification: Notification) -> usize {
        let mut subscribers = self
            .shared
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // a send only fails once the worker is gone
        subscribers.retain(|_, tx| tx.send(notification.clone()).is_ok());
        subscribers.len()
    }

    /// Parse a wire message and publish it.
    pub fn publish_message(&self, message: &str) -> Result<usize, NotifyError> {
        let notification = message.parse::<Notification>()?;
        Ok(self.publish(notification))
    }

    /// Register `handler` on its own worker thread. Messages arrive in the
    /// order they were published. A panic inside the handler is logged and
    /// the worker keeps going.
    pub fn subscribe<F>(&self, handler: F) -> Result<Subscription, NotifyError>
    where
        F: FnMut(&Notification) + Send + 'static,
    {
        let id = self.shared.next_subscriber.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel::<Notification>();
        let mut handler = handler;

        let worker = thread::Builder::new()
            .name(format!("{}-{}", self.shared.worker_prefix, id))
            .spawn(move || {
                for notification in rx {
                    let delivered =
                        panic::catch_unwind(AssertUnwindSafe(|| handler(&notification)));
                    if delivered.is_err() {
                        warn!(subscriber = id, notification = %notification, "subscriber panicked");
                    }
                }
                debug!(subscriber = id, "subscriber worker stopped");
            })?;

        self.shared
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, tx);
        debug!(subscriber = id, "subscribed");

        Ok(Subscription {
            id,
            shared: Arc::downgrade(&self.shared),
            worker: Some(worker),
        })
    }

    /// Stop delivering to `subscription`. Messages already queued are still
    /// handed to it. Returns false if it was already gone.
    pub fn unsubscribe(&self, mut subscription: Subscription) -> bool {
        subscription.shared = Weak::new();
        self.shared.remove(subscription.id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Start tracking versions from now.
    pub fn watch(&self) -> VersionWatch {
        VersionWatch {
            notifier: self.clone(),
            seen: self.current_version(),
        }
    }
}

/// Handle returned by [`ChangeNotifier::subscribe`]. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    shared: Weak<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Unsubscribe and wait until every queued message has been handled.
    /// Must not be called from inside this subscription's own handler.
    pub fn join(mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.remove(self.id);
        }
        self.shared = Weak::new();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.remove(self.id);
        }
        // Don't join on drop - the worker drains and exits on its own
    }
}

/// Pull-mode view of the version counter for one session.
pub struct VersionWatch {
    notifier: ChangeNotifier,
    seen: u64,
}

impl VersionWatch {
    /// Whether any mutation happened since the last [`mark_seen`](Self::mark_seen).
    pub fn has_changed(&self) -> bool {
        self.notifier.current_version() != self.seen
    }

    /// Acknowledge everything up to now. Returns the version acknowledged.
    pub fn mark_seen(&mut self) -> u64 {
        self.seen = self.notifier.current_version();
        self.seen
    }

    pub fn seen(&self) -> u64 {
        self.seen
    }
}
