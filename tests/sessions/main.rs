//! Edit session integration tests: two users working the same phonebook.

#[path = "../support/mod.rs"]
mod support;

mod editing;
mod notifications;
