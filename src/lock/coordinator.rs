use std::sync::Arc;

use crate::record::RecordId;

/// Tracks which holder is editing which record.
///
/// Every call is one compare-and-set on the lock table; implementations must
/// not touch the record store.
pub trait LockCoordinator: Send + Sync {
    /// Take the lock for `holder`. Succeeds if the record is free or already
    /// held by `holder`; fails if someone else holds it. On success a `LOCK`
    /// notification carrying `meta` is published.
    fn try_acquire(&self, record_id: RecordId, holder: &str, meta: &str) -> bool;

    /// Drop the lock if `holder` has it. Publishes `UNLOCK` on success.
    fn release(&self, record_id: RecordId, holder: &str) -> bool;

    /// Drop the lock whoever holds it. Returns the previous holder and
    /// publishes `UNLOCK` on its behalf.
    fn force_release(&self, record_id: RecordId) -> Option<String>;

    fn holder_of(&self, record_id: RecordId) -> Option<String>;

    /// Every record `holder` currently has locked, in id order.
    fn held_by(&self, holder: &str) -> Vec<RecordId>;
}

impl<L: LockCoordinator + ?Sized> LockCoordinator for Arc<L> {
    fn try_acquire(&self, record_id: RecordId, holder: &str, meta: &str) -> bool {
        (**self).try_acquire(record_id, holder, meta)
    }

    fn release(&self, record_id: RecordId, holder: &str) -> bool {
        (**self).release(record_id, holder)
    }

    fn force_release(&self, record_id: RecordId) -> Option<String> {
        (**self).force_release(record_id)
    }

    fn holder_of(&self, record_id: RecordId) -> Option<String> {
        (**self).holder_of(record_id)
    }

    fn held_by(&self, holder: &str) -> Vec<RecordId> {
        (**self).held_by(holder)
    }
}
