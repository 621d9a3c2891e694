//! Edit sessions - one user's view of the phonebook.
//!
//! A session ties the pieces together the way an editing screen uses them:
//! take the advisory lock when an edit starts, commit through the store,
//! drop the lock once the save lands, and hear about everyone else's
//! activity through an inbox.
//!
//! ```text
//!   begin_edit(id) ── try_acquire ──▶ LockDenied { holder }
//!        │
//!        ▼
//!   save(draft) ── Updated / Unchanged ──▶ release lock
//!        ├──── Conflict ──────────────────▶ keep lock, caller reloads and retries
//!        └──── NotFound ──────────────────▶ release lock
//! ```
//!
//! Lock traffic from the session's own holder id is not delivered to its
//! inbox. `DATA_UPDATED` always is.

use std::collections::BTreeSet;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use tracing::debug;

use crate::concurrency::{DeleteOutcome, UpdateOutcome};
use crate::error::StoreError;
use crate::notify::{Notification, Subscription, VersionWatch};
use crate::phonebook::Phonebook;
use crate::record::{Record, RecordId};
use crate::table::ContactTable;

pub struct EditSession<T: ContactTable> {
    book: Phonebook<T>,
    holder: String,
    watch: VersionWatch,
    inbox: Receiver<Notification>,
    subscription: Option<Subscription>,
    held: BTreeSet<RecordId>,
}

impl<T: ContactTable> EditSession<T> {
    pub fn open(book: &Phonebook<T>, holder: impl Into<String>) -> Result<Self, StoreError> {
        let holder = holder.into();
        let (tx, inbox) = mpsc::channel();

        let own = holder.clone();
        let subscription = book.notifier().subscribe(move |notification: &Notification| {
            if notification.holder() != Some(own.as_str()) {
                let _ = tx.send(notification.clone());
            }
        })?;
        debug!(holder = %holder, "edit session opened");

        Ok(Self {
            book: book.clone(),
            watch: book.notifier().watch(),
            holder,
            inbox,
            subscription: Some(subscription),
            held: BTreeSet::new(),
        })
    }

    pub fn holder(&self) -> &str {
        &self.holder
    }

    /// Records this session currently has locked.
    pub fn held(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.held.iter().copied()
    }

    /// Lock `id` for editing and return the record as stored right now.
    pub fn begin_edit(&mut self, id: RecordId) -> Result<Record, StoreError> {
        let store = self.book.store();
        let current = store.get(id)?.ok_or(StoreError::NotFound { id })?;

        let meta = if self.book.config().lock_meta_from_name {
            current.name.as_str()
        } else {
            ""
        };
        if !self.book.locks().try_acquire(id, &self.holder, meta) {
            return Err(StoreError::LockDenied {
                record_id: id,
                holder: self.book.locks().holder_of(id),
            });
        }
        self.held.insert(id);

        // the record may have moved between the read and the lock
        match store.get(id)? {
            Some(record) => Ok(record),
            None => {
                self.unlock(id);
                Err(StoreError::NotFound { id })
            }
        }
    }

    /// Insert `draft` if it has no id, otherwise commit it as an update.
    ///
    /// On a conflict or a rejected draft the lock is kept so the user can
    /// fix the draft or reload and try again.
    pub fn save(&mut self, draft: Record) -> Result<Record, StoreError> {
        let Some(id) = draft.id else {
            return self.book.store().insert(draft);
        };

        match self.book.store().update(draft)? {
            UpdateOutcome::Updated(record) | UpdateOutcome::Unchanged(record) => {
                self.unlock(id);
                Ok(record)
            }
            UpdateOutcome::Conflict(conflict) => Err(conflict.into()),
            UpdateOutcome::NotFound(id) => {
                self.unlock(id);
                Err(StoreError::NotFound { id })
            }
        }
    }

    /// Delete `record` if it is still as read. The lock on it, if any, goes
    /// away unless the delete conflicts.
    pub fn delete(&mut self, record: &Record) -> Result<Record, StoreError> {
        match self.book.store().delete(record)? {
            DeleteOutcome::Deleted(removed) => {
                if let Some(id) = removed.id {
                    self.unlock(id);
                }
                Ok(removed)
            }
            DeleteOutcome::Conflict(conflict) => Err(conflict.into()),
            DeleteOutcome::NotFound(id) => {
                self.unlock(id);
                Err(StoreError::NotFound { id })
            }
        }
    }

    /// Abandon the edit of `id`. Returns false if this session did not hold it.
    pub fn cancel(&mut self, id: RecordId) -> bool {
        self.unlock(id)
    }

    /// Whether any record changed since the last [`mark_seen`](Self::mark_seen).
    pub fn needs_refresh(&self) -> bool {
        self.watch.has_changed()
    }

    pub fn mark_seen(&mut self) -> u64 {
        self.watch.mark_seen()
    }

    /// Everything delivered so far, without waiting.
    pub fn drain_events(&self) -> Vec<Notification> {
        self.inbox.try_iter().collect()
    }

    /// Wait up to `timeout` for the next event.
    pub fn next_event(&self, timeout: Duration) -> Option<Notification> {
        self.inbox.recv_timeout(timeout).ok()
    }

    /// Release every lock still held and stop listening. Safe to call twice.
    pub fn close(&mut self) {
        for id in std::mem::take(&mut self.held) {
            self.book.locks().release(id, &self.holder);
        }
        if let Some(subscription) = self.subscription.take() {
            self.book.notifier().unsubscribe(subscription);
            debug!(holder = %self.holder, "edit session closed");
        }
    }

    fn unlock(&mut self, id: RecordId) -> bool {
        self.held.remove(&id);
        self.book.locks().release(id, &self.holder)
    }
}

impl<T: ContactTable> Drop for EditSession<T> {
    fn drop(&mut self) {
        self.close();
    }
}
