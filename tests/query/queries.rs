use std::sync::Arc;

use phonebook::{
    InMemoryTable, Phonebook, PhonebookConfig, Query, QueryEngine, Record, SortDirection, Stamp,
    StoreError, TableSource,
};

use crate::support::{bob_and_amy, contacts, init_tracing};

#[test]
fn name_ascending_over_bob_and_amy() {
    let book = bob_and_amy();
    let page = book.query(&Query::new().asc("name").offset(0).limit(10)).unwrap();

    let names: Vec<_> = page.items.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Amy", "Bob"]);
    assert_eq!(page.total, 2);

    let err = book.store().insert(Record::new("Cam", "111")).unwrap_err();
    assert!(matches!(err, StoreError::DuplicateKey { .. }));
    assert_eq!(book.query(&Query::new()).unwrap().total, 2);
}

#[test]
fn unknown_column_is_invalid_field() {
    let book = bob_and_amy();
    let err = book.query(&Query::new().filter("nickname", "x")).unwrap_err();
    assert!(matches!(err, StoreError::InvalidField(ref name) if name == "nickname"));
    assert_eq!(err.to_string(), "unknown field: nickname");
}

#[test]
fn filter_then_sort_descending() {
    init_tracing();
    let book = Phonebook::seeded(PhonebookConfig::default(), contacts(12)).unwrap();
    let page = book
        .query(
            &Query::new()
                .filter("city", "OSLO")
                .sort("name", SortDirection::Descending)
                .limit(2),
        )
        .unwrap();

    assert_eq!(page.total, 4);
    let names: Vec<_> = page.items.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Contact 009", "Contact 006"]);
}

#[test]
fn queries_see_committed_writes() {
    let book = bob_and_amy();
    let query = Query::new().filter("email", "example");
    assert_eq!(book.query(&query).unwrap().total, 0);

    let mut amy = book.store().get(2).unwrap().unwrap();
    amy.email = "amy@example.com".into();
    book.store().update(amy).unwrap().into_result().unwrap();

    let page = book.query(&query).unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].email, "amy@example.com");
}

#[test]
fn table_source_agrees_with_store() {
    init_tracing();
    let table = InMemoryTable::seeded(contacts(30), Stamp::from_micros(1)).unwrap();
    let book = Phonebook::new(PhonebookConfig::default(), table.clone()).unwrap();
    let direct = QueryEngine::new(TableSource::new(Arc::new(table)));

    let query = Query::new()
        .filter("city", "e")
        .asc("city")
        .desc("phone")
        .offset(3)
        .limit(7);
    assert_eq!(book.query(&query).unwrap(), direct.run(&query).unwrap());
}

#[test]
fn query_round_trips_through_json() {
    let query: Query = serde_json::from_str(
        r#"{ "filters": [["city", "oslo"]], "sorts": [["name", "desc"]], "limit": 5 }"#,
    )
    .unwrap();
    assert_eq!(
        query,
        Query::new().filter("city", "oslo").desc("name").limit(5)
    );
}
