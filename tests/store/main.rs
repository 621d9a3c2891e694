//! Record store integration tests: races, collaborator failures and the
//! unique phone invariant.

#[path = "../support/mod.rs"]
mod support;

mod failures;
mod uniqueness;
