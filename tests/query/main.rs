//! Query engine integration tests.

#[path = "../support/mod.rs"]
mod support;

mod queries;
