//! Generic deterministic CBOR helpers.
//!
//! Infrastructure, not ceremony-specific:
//! - `to_cbor` serializes any `T: Serialize` with **ciborium** (deterministic
//!   by default).
//! - `from_cbor` deserializes strictly: no trailing bytes, and the input must
//!   be the unique deterministic encoding of the decoded value.
//!
//! `from_cbor` expects exactly one CBOR item. Extension data carries nothing
//! else, so no framing has to be stripped first.

use serde::{Serialize, de::DeserializeOwned};
use std::io::Cursor;

/// Errors produced by the CBOR helpers.
#[derive(thiserror::Error, Debug)]
pub enum CborError {
    /// Error produced during serialization.
    #[error("CBOR serialize error: {0}")]
    Ser(#[from] ciborium::ser::Error<std::io::Error>),

    /// Error produced during deserialization.
    #[error("CBOR deserialize error: {0}")]
    De(#[from] ciborium::de::Error<std::io::Error>),

    /// Bytes remained after the first CBOR item.
    #[error("trailing bytes after CBOR value")]
    Trailing,

    /// Well-formed CBOR that is not in deterministic form.
    #[error("CBOR input is not in canonical/deterministic form")]
    NonCanonical,
}

/// Serialize `v` to CBOR bytes.
///
/// # Errors
///
/// Returns [`CborError::Ser`] if serialization fails.
pub fn to_cbor<T: Serialize>(v: &T) -> Result<Vec<u8>, CborError> {
    let mut buf = Vec::with_capacity(128);
    ciborium::ser::into_writer(v, &mut buf)?;
    Ok(buf)
}

/// Deserialize exactly one canonical CBOR item from `b`.
///
/// # Errors
///
/// * [`CborError::De`] if deserialization fails.
/// * [`CborError::Trailing`] if bytes follow the item.
/// * [`CborError::NonCanonical`] if the input is well-formed but not canonical.
pub fn from_cbor<T: DeserializeOwned + Serialize>(b: &[u8]) -> Result<T, CborError> {
    let mut cur = Cursor::new(b);
    let value: T = ciborium::de::from_reader(&mut cur)?;
    if usize::try_from(cur.position()).ok() != Some(b.len()) {
        return Err(CborError::Trailing);
    }
    if to_cbor(&value)? != b {
        return Err(CborError::NonCanonical);
    }
    Ok(value)
}
