//! Canonical CBOR encoding used for ceremony envelopes.
pub mod cbor;

pub use cbor::{CborError, from_cbor, to_cbor};
