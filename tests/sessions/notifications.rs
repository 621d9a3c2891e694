use std::time::Duration;

use phonebook::{Notification, Record};

use crate::support::bob_and_amy;

const WAIT: Duration = Duration::from_secs(2);

#[test]
fn other_session_hears_lock_edit_and_unlock() {
    let book = bob_and_amy();
    let mut x = book.session("X").unwrap();
    let y = book.session("Y").unwrap();

    let mut draft = x.begin_edit(1).unwrap();
    draft.city = "Oslo".into();
    x.save(draft).unwrap();

    let heard: Vec<Notification> = (0..3).filter_map(|_| y.next_event(WAIT)).collect();
    assert_eq!(
        heard,
        vec![
            Notification::lock(1, "X", "Bob"),
            Notification::DataUpdated,
            Notification::unlock(1, "X"),
        ]
    );
}

#[test]
fn own_session_only_hears_data_updates() {
    let book = bob_and_amy();
    let mut x = book.session("X").unwrap();

    let mut draft = x.begin_edit(1).unwrap();
    draft.city = "Oslo".into();
    x.save(draft).unwrap();

    assert_eq!(x.next_event(WAIT), Some(Notification::DataUpdated));
    x.close();
    assert!(x.drain_events().is_empty());
}

#[test]
fn pull_mode_sees_every_mutation_kind() {
    let book = bob_and_amy();
    let mut viewer = book.session("viewer").unwrap();
    let mut editor = book.session("editor").unwrap();

    let cam = editor.save(Record::new("Cam", "333")).unwrap();
    assert!(viewer.needs_refresh());
    assert_eq!(viewer.mark_seen(), 1);

    let mut draft = editor.begin_edit(cam.id.unwrap()).unwrap();
    assert!(!viewer.needs_refresh(), "locks do not change the data version");
    draft.street = "2 High St".into();
    let cam = editor.save(draft).unwrap();
    assert!(viewer.needs_refresh());
    viewer.mark_seen();

    editor.delete(&cam).unwrap();
    assert!(viewer.needs_refresh());
    assert_eq!(viewer.mark_seen(), 3);
}

#[test]
fn closing_a_session_announces_its_released_locks() {
    let book = bob_and_amy();
    let mut x = book.session("X").unwrap();
    let y = book.session("Y").unwrap();

    x.begin_edit(1).unwrap();
    x.begin_edit(2).unwrap();
    drop(x);

    let heard: Vec<Notification> = (0..4).filter_map(|_| y.next_event(WAIT)).collect();
    assert_eq!(
        heard,
        vec![
            Notification::lock(1, "X", "Bob"),
            Notification::lock(2, "X", "Amy"),
            Notification::unlock(1, "X"),
            Notification::unlock(2, "X"),
        ]
    );
    assert!(book.locks().held_by("X").is_empty());
}
