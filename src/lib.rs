//! Crate root for `fidotls`.
//!
//! Binds FIDO2-style credential ceremonies (pre-registration, registration,
//! authentication) into a TLS 1.3 handshake by carrying ceremony messages in a
//! custom handshake extension, so the credential proof is tied to the channel
//! being established.
//!
//! High-level tree:
//! * `domain::ceremony` – roles, ceremonies, phases and their transitions.
//! * `ports::codec` – the boundary to whatever builds and checks ceremony
//!   payloads.
//! * `application::extension` – the per-connection dispatcher driven by the
//!   engine's extension callbacks.
//! * `core::codec` – deterministic CBOR helpers for codec implementations
//!   (FIDO2 messages are CBOR).
//!
//! The `test-support` feature exposes the test doubles in `test_support`.
pub mod application;
pub mod core;
pub mod domain;
pub mod ports;
#[cfg(any(test, feature = "test-support"))]
#[doc(hidden)]
pub mod test_support;
