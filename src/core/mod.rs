//! Shared infrastructure helpers.
pub mod codec;
