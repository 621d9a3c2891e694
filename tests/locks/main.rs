//! Advisory lock integration tests.

#[path = "../support/mod.rs"]
mod support;

mod coordination;
