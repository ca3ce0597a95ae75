use std::fmt;

use serde::{Deserialize, Serialize};

use super::params::{CONTEXT_CERTIFICATE, CONTEXT_CERTIFICATE_REQUEST, CONTEXT_CLIENT_HELLO};

/// Handshake message at which the extension may carry ceremony data.
///
/// Direction depends on the role: the Initiator emits at `ClientHello` and
/// `Certificate` and consumes at `CertificateRequest`; the Responder does the
/// opposite. `Certificate` fires a second time later in the same handshake
/// for an unrelated purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentPoint {
    /// Initial hello message (carries the Indication).
    ClientHello,
    /// TLS 1.3 certificate-request message (carries the Request).
    CertificateRequest,
    /// TLS 1.3 certificate message (carries the Response).
    Certificate,
}

impl AttachmentPoint {
    /// All attachment points in handshake order.
    pub const ALL: [AttachmentPoint; 3] = [
        AttachmentPoint::ClientHello,
        AttachmentPoint::CertificateRequest,
        AttachmentPoint::Certificate,
    ];

    /// Engine context bit for this attachment point.
    #[must_use]
    pub const fn context(self) -> u32 {
        match self {
            AttachmentPoint::ClientHello => CONTEXT_CLIENT_HELLO,
            AttachmentPoint::CertificateRequest => CONTEXT_CERTIFICATE_REQUEST,
            AttachmentPoint::Certificate => CONTEXT_CERTIFICATE,
        }
    }

    /// Map an engine context value to an attachment point.
    ///
    /// Returns `None` for contexts this extension does not handle; callers
    /// treat those as "nothing to do here".
    #[must_use]
    pub const fn from_context(context: u32) -> Option<Self> {
        match context {
            CONTEXT_CLIENT_HELLO => Some(AttachmentPoint::ClientHello),
            CONTEXT_CERTIFICATE_REQUEST => Some(AttachmentPoint::CertificateRequest),
            CONTEXT_CERTIFICATE => Some(AttachmentPoint::Certificate),
            _ => None,
        }
    }

    /// Context mask to pass when registering the extension with the engine.
    #[must_use]
    pub const fn registration_context() -> u32 {
        CONTEXT_CLIENT_HELLO | CONTEXT_CERTIFICATE_REQUEST | CONTEXT_CERTIFICATE
    }

    /// Ceremony message carried at this attachment point.
    #[must_use]
    pub const fn message(self) -> MessageKind {
        match self {
            AttachmentPoint::ClientHello => MessageKind::Indication,
            AttachmentPoint::CertificateRequest => MessageKind::Request,
            AttachmentPoint::Certificate => MessageKind::Response,
        }
    }
}

impl fmt::Display for AttachmentPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachmentPoint::ClientHello => f.write_str("client_hello"),
            AttachmentPoint::CertificateRequest => f.write_str("certificate_request"),
            AttachmentPoint::Certificate => f.write_str("certificate"),
        }
    }
}

/// Kind of ceremony message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Initiator announces which ceremony it wants.
    Indication,
    /// Responder sends challenge and parameters.
    Request,
    /// Initiator sends the credential proof.
    Response,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Indication => f.write_str("indication"),
            MessageKind::Request => f.write_str("request"),
            MessageKind::Response => f.write_str("response"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_bits_map_back() {
        for point in AttachmentPoint::ALL {
            assert_eq!(AttachmentPoint::from_context(point.context()), Some(point));
            assert_ne!(AttachmentPoint::registration_context() & point.context(), 0);
        }
    }

    #[test]
    fn unhandled_context_is_none() {
        // encrypted extensions
        assert_eq!(AttachmentPoint::from_context(0x0400), None);
        assert_eq!(AttachmentPoint::from_context(0), None);
        assert_eq!(
            AttachmentPoint::from_context(AttachmentPoint::registration_context()),
            None
        );
    }
}
