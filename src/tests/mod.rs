//! Crate-level integration tests: the full build -> load -> recommend
//! pipeline over deterministic stub encoders.

pub mod support;
