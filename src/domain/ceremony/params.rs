//! ---- Protocol constants ----
//! Codepoints and engine-facing bit values shared by the ceremony domain.
//! The custom-extension context bits mirror the TLS 1.3 engine's own values so
//! the multiplexer can be registered without a translation table.

/// Default extension codepoint, taken from the TLS private-use range.
pub const DEFAULT_EXTENSION_TYPE: u16 = 0xFF1D;

/// Engine context bit for the initial hello message.
pub(crate) const CONTEXT_CLIENT_HELLO: u32 = 0x0080;
/// Engine context bit for a TLS 1.3 certificate message.
pub(crate) const CONTEXT_CERTIFICATE: u32 = 0x1000;
/// Engine context bit for a TLS 1.3 certificate-request message.
pub(crate) const CONTEXT_CERTIFICATE_REQUEST: u32 = 0x4000;

/// TLS `access_denied` alert description.
pub(crate) const ALERT_ACCESS_DENIED: u8 = 49;
/// TLS `internal_error` alert description.
pub(crate) const ALERT_INTERNAL_ERROR: u8 = 80;

/// Extension codepoints the handshake engine implements itself and therefore
/// refuses to hand to a custom extension. Sorted.
pub(crate) const ENGINE_OWNED_EXTENSIONS: &[u16] = &[
    0, // server_name
    1, // max_fragment_length
    5, // status_request
    10, // supported_groups
    11, // ec_point_formats
    12, // srp
    13, // signature_algorithms
    14, // use_srtp
    16, // application_layer_protocol_negotiation
    18, // signed_certificate_timestamp
    19, // client_certificate_type
    20, // server_certificate_type
    21, // padding
    22, // encrypt_then_mac
    23, // extended_master_secret
    27, // compress_certificate
    35, // session_ticket
    41, // pre_shared_key
    42, // early_data
    43, // supported_versions
    44, // cookie
    45, // psk_key_exchange_modes
    47, // certificate_authorities
    49, // post_handshake_auth
    50, // signature_algorithms_cert
    51, // key_share
    13172, // next_protocol_negotiation
    0xFF01, // renegotiation_info
];
