use std::sync::Arc;

use phonebook::{
    ContactTable, InMemoryTable, Phonebook, PhonebookConfig, Record, Stamp, StoreError,
    TableError, UpdateOutcome,
};

use crate::support::flaky::FlakyTable;
use crate::support::init_tracing;

fn flaky_book() -> Phonebook<Arc<FlakyTable>> {
    init_tracing();
    let seed = InMemoryTable::seeded(
        vec![Record::new("Bob", "111"), Record::new("Amy", "222")],
        Stamp::from_micros(1),
    )
    .unwrap();
    Phonebook::new(PhonebookConfig::default(), Arc::new(FlakyTable::new(seed))).unwrap()
}

fn snapshot(book: &Phonebook<Arc<FlakyTable>>) -> (Vec<Record>, Option<Record>, Option<Record>) {
    let store = book.store();
    (
        store.list().unwrap(),
        store.get_by_key("111").unwrap(),
        store.get_by_key("222").unwrap(),
    )
}

#[test]
fn failed_insert_leaves_index_untouched() {
    let book = flaky_book();
    let before = snapshot(&book);

    book.store().table().fail_writes(true);
    let err = book.store().insert(Record::new("Cam", "333")).unwrap_err();
    assert!(matches!(err, StoreError::Table(TableError::Unavailable(_))));

    assert_eq!(snapshot(&book), before);
    assert!(book.store().is_key_available("333", None).unwrap());
    assert_eq!(book.notifier().current_version(), 0);

    // nothing was poisoned: the next write goes through
    book.store().table().fail_writes(false);
    assert!(book.store().insert(Record::new("Cam", "333")).is_ok());
}

#[test]
fn failed_update_leaves_index_untouched() {
    let book = flaky_book();
    let before = snapshot(&book);
    let mut bob = book.store().get(1).unwrap().unwrap();
    bob.phone = "999".into();

    book.store().table().fail_writes(true);
    assert!(matches!(
        book.store().update(bob.clone()),
        Err(StoreError::Table(_))
    ));
    assert_eq!(snapshot(&book), before);
    assert!(book.store().get_by_key("999").unwrap().is_none());

    book.store().table().fail_writes(false);
    assert!(book.store().update(bob).unwrap().is_saved());
}

#[test]
fn failed_delete_leaves_index_untouched() {
    let book = flaky_book();
    let before = snapshot(&book);
    let amy = book.store().get(2).unwrap().unwrap();

    book.store().table().fail_writes(true);
    assert!(book.store().delete(&amy).is_err());
    assert_eq!(snapshot(&book), before);
    assert_eq!(book.notifier().current_version(), 0);
}

#[test]
fn table_changed_underneath_reports_conflict_until_reload() {
    let book = flaky_book();
    let bob = book.store().get(1).unwrap().unwrap();

    // another process rewrites the row behind the store's back
    let mut external = bob.clone();
    external.city = "Tromsø".into();
    external.last_modified = Some(Stamp::from_micros(7));
    let written = book
        .store()
        .table()
        .inner()
        .update(&external, bob.last_modified)
        .unwrap();
    assert_eq!(written, 1);

    let mut edit = bob.clone();
    edit.city = "Oslo".into();
    let outcome = book.store().update(edit).unwrap();
    assert!(matches!(
        outcome,
        UpdateOutcome::Conflict(conflict) if conflict.actual.is_none()
    ));
    assert_eq!(book.store().get(1).unwrap().unwrap(), bob);

    assert_eq!(book.store().reload().unwrap(), 2);
    let mut fresh = book.store().get(1).unwrap().unwrap();
    assert_eq!(fresh.city, "Tromsø");
    fresh.city = "Oslo".into();
    assert!(book.store().update(fresh).unwrap().is_saved());
}
