//! Test doubles shared by unit and integration tests.
pub mod support;

pub use support::*;
