//! Advisory edit locks.
//!
//! A lock records which session is editing a record so other sessions can be
//! warned before they start. Nothing enforces it: the store accepts writes
//! from anyone, and the concurrency controller is what rejects stale ones.
//!
//! Locks live in process memory only and have no timeout. A session that
//! disappears without releasing keeps its locks until
//! [`LockCoordinator::force_release`] is called.

mod coordinator;
mod in_memory;

pub use coordinator::LockCoordinator;
pub use in_memory::InMemoryLockCoordinator;
