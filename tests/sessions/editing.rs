use std::sync::{Arc, Barrier};
use std::thread;

use phonebook::{PhonebookConfig, Phonebook, Record, StoreError};

use crate::support::{bob_and_amy, init_tracing};

#[test]
fn second_user_waits_for_the_first_to_save() {
    let book = bob_and_amy();
    let mut x = book.session("X").unwrap();
    let mut y = book.session("Y").unwrap();

    let mut draft = x.begin_edit(2).unwrap();
    let denied = y.begin_edit(2).unwrap_err();
    assert!(denied.is_recoverable());
    assert_eq!(denied.to_string(), "record 2 is being edited by X");

    draft.street = "1 Main St".into();
    x.save(draft).unwrap();

    let amy = y.begin_edit(2).unwrap();
    assert_eq!(amy.street, "1 Main St");
}

#[test]
fn stale_draft_conflicts_and_retry_succeeds() {
    let book = bob_and_amy();
    let mut x = book.session("X").unwrap();

    let mut x_draft = x.begin_edit(2).unwrap();
    x.cancel(2);

    let mut y = book.session("Y").unwrap();
    let mut y_draft = y.begin_edit(2).unwrap();
    y_draft.city = "Bergen".into();
    y.save(y_draft).unwrap();

    x_draft.city = "Oslo".into();
    let err = x.save(x_draft).unwrap_err();
    assert!(matches!(err, StoreError::Conflict { id: 2, .. }));
    assert_eq!(book.store().get(2).unwrap().unwrap().city, "Bergen");

    let mut retry = x.begin_edit(2).unwrap();
    retry.city = "Oslo".into();
    assert_eq!(x.save(retry).unwrap().city, "Oslo");
}

#[test]
fn lock_meta_can_be_left_blank() {
    init_tracing();
    let book = Phonebook::seeded(
        PhonebookConfig::default().with_lock_meta_from_name(false),
        vec![Record::new("Bob", "111")],
    )
    .unwrap();
    let (tx, rx) = std::sync::mpsc::channel();
    let subscription = book
        .notifier()
        .subscribe(move |n| {
            let _ = tx.send(n.clone());
        })
        .unwrap();

    let mut x = book.session("X").unwrap();
    x.begin_edit(1).unwrap();
    subscription.join();

    assert_eq!(rx.try_iter().next(), Some(phonebook::Notification::lock(1, "X", "")));
}

#[test]
fn sessions_on_many_threads_serialize_through_locks() {
    let book = bob_and_amy();
    let barrier = Arc::new(Barrier::new(6));

    let handles: Vec<_> = (0..6)
        .map(|n| {
            let book = book.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut session = book.session(format!("user-{n}")).unwrap();
                barrier.wait();
                let mut saved = 0;
                while saved == 0 {
                    match session.begin_edit(1) {
                        Ok(mut bob) => {
                            bob.email = format!("bob{n}@example.com");
                            session.save(bob).unwrap();
                            saved += 1;
                        }
                        Err(StoreError::LockDenied { .. }) => thread::yield_now(),
                        Err(other) => panic!("unexpected: {other}"),
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // every user got a turn and none of them hit a conflict
    assert_eq!(book.notifier().current_version(), 6);
    assert_eq!(book.locks().holder_of(1), None);
}
