use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use phonebook::{
    ChangeNotifier, InMemoryLockCoordinator, LockCoordinator, Notification, StoreError,
};

use crate::support::{bob_and_amy, init_tracing};

#[test]
fn holder_handoff() {
    init_tracing();
    let locks = InMemoryLockCoordinator::new(ChangeNotifier::new());

    assert!(locks.try_acquire(5, "A", ""));
    assert!(!locks.try_acquire(5, "B", ""));
    assert!(locks.release(5, "A"));
    assert!(locks.try_acquire(5, "B", ""));
}

#[test]
fn leaked_lock_persists_until_forced() {
    let book = bob_and_amy();

    // a client that vanished without releasing
    assert!(book.locks().try_acquire(1, "crashed-client", "Bob"));

    let mut session = book.session("A").unwrap();
    assert!(matches!(
        session.begin_edit(1),
        Err(StoreError::LockDenied { holder: Some(ref h), .. }) if h == "crashed-client"
    ));

    assert_eq!(
        book.locks().force_release(1).as_deref(),
        Some("crashed-client")
    );
    assert!(session.begin_edit(1).is_ok());
}

#[test]
fn locks_do_not_block_writes() {
    let book = bob_and_amy();
    assert!(book.locks().try_acquire(2, "A", "Amy"));

    // the lock is advisory: the store still accepts a current write
    let mut amy = book.store().get(2).unwrap().unwrap();
    amy.city = "Oslo".into();
    assert!(book.store().update(amy).unwrap().is_saved());
    assert_eq!(book.locks().holder_of(2).as_deref(), Some("A"));
}

#[test]
fn lock_traffic_reaches_every_subscriber_in_order() {
    let book = bob_and_amy();
    let (tx, rx) = mpsc::channel();
    let subscription = book
        .notifier()
        .subscribe(move |n: &Notification| {
            let _ = tx.send(n.to_string());
        })
        .unwrap();

    book.locks().try_acquire(1, "A", "Bob: front desk");
    book.locks().release(1, "A");
    book.locks().try_acquire(1, "B", "Bob");
    subscription.join();

    let wire: Vec<String> = rx.try_iter().collect();
    assert_eq!(wire.len(), 3);
    assert_eq!(
        wire[0].parse::<Notification>().unwrap(),
        Notification::lock(1, "A", "Bob: front desk")
    );
    assert_eq!(wire[1], "UNLOCK:1:A");
    assert!(wire[2].starts_with("LOCK:1:B:"));
}

#[test]
fn many_sessions_racing_for_distinct_records() {
    init_tracing();
    let locks = Arc::new(InMemoryLockCoordinator::new(ChangeNotifier::new()));

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let locks = Arc::clone(&locks);
            thread::spawn(move || {
                let holder = format!("worker-{worker}");
                (0..50u64)
                    .filter(|id| locks.try_acquire(*id, &holder, ""))
                    .count()
            })
        })
        .collect();

    let acquired: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(acquired, 50);
    assert_eq!(locks.len(), 50);

    let held: usize = (0..4)
        .map(|worker| locks.held_by(&format!("worker-{worker}")).len())
        .sum();
    assert_eq!(held, 50);
}
