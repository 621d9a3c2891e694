use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::LockCoordinator;
use crate::notify::{ChangeNotifier, Notification};
use crate::record::RecordId;

/// In-memory lock coordinator backed by a `HashMap<RecordId, String>`.
///
/// Each operation takes the map lock once and changes at most one entry.
/// The LOCK/UNLOCK event is published before the map lock is dropped, so
/// subscribers see transitions in the order they happened. Publishing only
/// queues onto subscriber channels and never calls back into the map.
pub struct InMemoryLockCoordinator {
    editors: Mutex<HashMap<RecordId, String>>,
    notifier: ChangeNotifier,
}

impl InMemoryLockCoordinator {
    pub fn new(notifier: ChangeNotifier) -> Self {
        Self {
            editors: Mutex::new(HashMap::new()),
            notifier,
        }
    }

    // a poisoned map is still consistent: every critical section is a single entry operation
    fn editors(&self) -> MutexGuard<'_, HashMap<RecordId, String>> {
        self.editors.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.editors().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LockCoordinator for InMemoryLockCoordinator {
    fn try_acquire(&self, record_id: RecordId, holder: &str, meta: &str) -> bool {
        let mut editors = self.editors();
        let acquired = match editors.entry(record_id) {
            Entry::Vacant(slot) => {
                slot.insert(holder.to_string());
                true
            }
            Entry::Occupied(slot) => slot.get() == holder,
        };

        if acquired {
            debug!(record_id, holder, "advisory lock acquired");
            self.notifier
                .publish(Notification::lock(record_id, holder, meta));
        } else {
            debug!(record_id, holder, "advisory lock denied");
        }
        drop(editors);
        acquired
    }

    fn release(&self, record_id: RecordId, holder: &str) -> bool {
        let mut editors = self.editors();
        let released = match editors.entry(record_id) {
            Entry::Occupied(slot) if slot.get() == holder => {
                slot.remove();
                true
            }
            _ => false,
        };

        if released {
            debug!(record_id, holder, "advisory lock released");
            self.notifier.publish(Notification::unlock(record_id, holder));
        }
        drop(editors);
        released
    }

    fn force_release(&self, record_id: RecordId) -> Option<String> {
        let mut editors = self.editors();
        let previous = editors.remove(&record_id);
        if let Some(holder) = &previous {
            debug!(record_id, holder = %holder, "advisory lock force-released");
            self.notifier
                .publish(Notification::unlock(record_id, holder.clone()));
        }
        drop(editors);
        previous
    }

    fn holder_of(&self, record_id: RecordId) -> Option<String> {
        self.editors().get(&record_id).cloned()
    }

    fn held_by(&self, holder: &str) -> Vec<RecordId> {
        let mut ids: Vec<RecordId> = self
            .editors()
            .iter()
            .filter(|(_, owner)| owner.as_str() == holder)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }
}
