use std::collections::HashSet;

use phonebook::{ContactTable, Phonebook, PhonebookConfig, Record, StoreError};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Insert { phone: u8 },
    ChangePhone { slot: usize, phone: u8 },
    Delete { slot: usize },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..6).prop_map(|phone| Op::Insert { phone }),
        (0usize..8, 0u8..6).prop_map(|(slot, phone)| Op::ChangePhone { slot, phone }),
        (0usize..8).prop_map(|slot| Op::Delete { slot }),
    ]
}

fn assert_consistent(book: &Phonebook) {
    let listed = book.store().list().unwrap();
    let mut phones = HashSet::new();
    for record in &listed {
        assert!(phones.insert(record.phone.clone()), "duplicate phone {}", record.phone);
        assert_eq!(book.store().get_by_key(&record.phone).unwrap().as_ref(), Some(record));
    }

    let mut in_table = book.store().table().find_all().unwrap();
    let mut in_index = listed;
    in_table.sort_by_key(|r| r.id);
    in_index.sort_by_key(|r| r.id);
    assert_eq!(in_table, in_index);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn no_two_records_share_a_phone(ops in proptest::collection::vec(op(), 1..40)) {
        let book = Phonebook::in_memory(PhonebookConfig::default()).unwrap();
        let mut inserted = 0usize;

        for op in ops {
            match op {
                Op::Insert { phone } => {
                    inserted += 1;
                    let record = Record::new(format!("Contact {inserted}"), format!("55{phone}"));
                    match book.store().insert(record) {
                        Ok(_) | Err(StoreError::DuplicateKey { .. }) => {}
                        Err(other) => panic!("unexpected insert error: {other}"),
                    }
                }
                Op::ChangePhone { slot, phone } => {
                    let listed = book.store().list().unwrap();
                    if let Some(record) = listed.get(slot % listed.len().max(1)) {
                        let mut edit = record.clone();
                        edit.phone = format!("55{phone}");
                        match book.store().update(edit) {
                            Ok(outcome) => prop_assert!(outcome.is_saved()),
                            Err(StoreError::DuplicateKey { existing, .. }) => {
                                prop_assert_ne!(Some(existing), record.id);
                            }
                            Err(other) => panic!("unexpected update error: {other}"),
                        }
                    }
                }
                Op::Delete { slot } => {
                    let listed = book.store().list().unwrap();
                    if let Some(record) = listed.get(slot % listed.len().max(1)) {
                        prop_assert!(book.store().delete(record).unwrap().is_deleted());
                    }
                }
            }
            assert_consistent(&book);
        }
    }
}
