//! Ceremony codec boundary.
//!
//! The dispatchers decide *when* a ceremony message is built or parsed; an
//! implementation of [`CeremonyCodec`] decides *what* the bytes are
//! (challenge generation, attestation / assertion checks, credential storage,
//! authenticator I/O). Keeping this behind a trait lets the extension layer be
//! tested without any credential cryptography.
use thiserror::Error;

use crate::application::extension::ConnectionId;
use crate::domain::ceremony::Ceremony;

/// Why a codec operation failed.
///
/// The dispatcher maps every variant to a fatal handshake abort, but keeps the
/// cause so callers can tell attacker-controlled garbage apart from a
/// credential that was well-formed and still refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Input bytes could not be decoded as the expected ceremony message.
    #[error("malformed ceremony message: {0}")]
    Malformed(String),
    /// Input decoded fine but the credential or policy check refused it.
    #[error("ceremony rejected: {0}")]
    Rejected(String),
    /// Local failure (authenticator unavailable, storage error, encoding).
    #[error("ceremony codec failure: {0}")]
    Internal(String),
}

/// Builds and parses ceremony payloads for one endpoint.
///
/// Contract:
/// - Every method receives the per-connection `Payload` stored in the
///   Connection State; state that must survive from one message to the next
///   (challenge, user handle, credential id) lives there.
/// - Methods are called synchronously from inside engine callbacks, one at a
///   time per connection. An implementation shared across connections must be
///   thread-safe on its own terms if the engine is multi-threaded.
/// - `release()` is called exactly once per Connection State when the
///   connection is closed.
pub trait CeremonyCodec {
    /// Opaque per-connection ceremony data.
    type Payload: Default;

    /// Initiator: build the Indication announcing `ceremony`.
    ///
    /// # Errors
    /// Any [`CodecError`]; the dispatcher aborts with `internal_error`.
    fn build_indication(
        &self,
        ceremony: Ceremony,
        payload: &mut Self::Payload,
    ) -> Result<Vec<u8>, CodecError>;

    /// Responder: decode an Indication and report which ceremony it asks for.
    ///
    /// # Errors
    /// [`CodecError::Malformed`] when no ceremony can be read from `input`;
    /// the dispatcher treats that as the peer not using the extension.
    fn parse_indication(
        &self,
        payload: &mut Self::Payload,
        input: &[u8],
    ) -> Result<Ceremony, CodecError>;

    /// Responder: build the Request (challenge and parameters).
    ///
    /// # Errors
    /// Any [`CodecError`].
    fn build_request(
        &self,
        ceremony: Ceremony,
        payload: &mut Self::Payload,
    ) -> Result<Vec<u8>, CodecError>;

    /// Initiator: decode and check the Request.
    ///
    /// # Errors
    /// Any [`CodecError`].
    fn parse_request(
        &self,
        ceremony: Ceremony,
        payload: &mut Self::Payload,
        input: &[u8],
    ) -> Result<(), CodecError>;

    /// Initiator: build the Response (credential proof).
    ///
    /// # Errors
    /// Any [`CodecError`].
    fn build_response(
        &self,
        ceremony: Ceremony,
        payload: &mut Self::Payload,
    ) -> Result<Vec<u8>, CodecError>;

    /// Responder: verify the Response.
    ///
    /// # Errors
    /// Any [`CodecError`].
    fn parse_response(
        &self,
        ceremony: Ceremony,
        payload: &mut Self::Payload,
        input: &[u8],
    ) -> Result<(), CodecError>;

    /// Release per-connection resources. Called once when the Connection
    /// State is torn down.
    fn release(&self, _conn: ConnectionId, _payload: Self::Payload) {}
}
