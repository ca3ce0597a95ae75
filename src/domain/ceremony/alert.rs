use std::fmt;

use super::params::{ALERT_ACCESS_DENIED, ALERT_INTERNAL_ERROR};

/// Alert the handshake engine must send when a callback aborts the handshake.
///
/// Only two alerts are ever produced: ordering bugs and local failures map to
/// `InternalError`, credential or payload failures map to `AccessDenied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alert {
    /// `internal_error` (80).
    InternalError,
    /// `access_denied` (49).
    AccessDenied,
}

impl Alert {
    /// TLS alert description byte.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Alert::InternalError => ALERT_INTERNAL_ERROR,
            Alert::AccessDenied => ALERT_ACCESS_DENIED,
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alert::InternalError => f.write_str("internal_error"),
            Alert::AccessDenied => f.write_str("access_denied"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_codes_match_tls_registry() {
        assert_eq!(Alert::InternalError.code(), 80);
        assert_eq!(Alert::AccessDenied.code(), 49);
        assert_eq!(Alert::AccessDenied.to_string(), "access_denied");
    }
}
