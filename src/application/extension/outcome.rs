//! Structured callback results and their mapping onto the engine's
//! tri-state return convention.
use super::errors::DispatchError;

/// Engine return value: extension data produced or accepted.
pub const RETURN_EMIT: i32 = 1;
/// Engine return value: nothing to add or consume here.
pub const RETURN_OMIT: i32 = 0;
/// Engine return value: abort the handshake with the reported alert.
pub const RETURN_FATAL: i32 = -1;

/// Non-fatal outcome of one callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Extension not applicable to this message; not an error.
    Omit,
    /// Include these bytes as the extension data.
    Emit(Vec<u8>),
    /// Incoming extension data was accepted.
    Consumed,
}

/// Result of every multiplexer callback.
pub type CallbackResult = Result<Disposition, DispatchError>;

/// Engine return code for `result`.
#[must_use]
pub fn return_code(result: &CallbackResult) -> i32 {
    match result {
        Ok(Disposition::Omit) => RETURN_OMIT,
        Ok(Disposition::Emit(_) | Disposition::Consumed) => RETURN_EMIT,
        Err(_) => RETURN_FATAL,
    }
}

/// Flatten `result` into engine out-parameters and return code.
///
/// Emitted bytes are moved into `out` (when provided); a fatal result writes
/// the alert description into `alert`. Both are left untouched otherwise.
pub fn write_back(result: CallbackResult, out: Option<&mut Vec<u8>>, alert: &mut u8) -> i32 {
    let code = return_code(&result);
    match result {
        Ok(Disposition::Emit(bytes)) => {
            if let Some(out) = out {
                *out = bytes;
            }
        }
        Ok(Disposition::Omit | Disposition::Consumed) => {}
        Err(e) => *alert = e.alert().code(),
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ceremony::{AttachmentPoint, Role};

    #[test]
    fn codes_follow_engine_convention() {
        assert_eq!(return_code(&Ok(Disposition::Omit)), 0);
        assert_eq!(return_code(&Ok(Disposition::Emit(vec![1]))), 1);
        assert_eq!(return_code(&Ok(Disposition::Consumed)), 1);
    }

    #[test]
    fn fatal_writes_alert_only() {
        let mut out = vec![9u8];
        let mut alert = 0u8;
        let err = DispatchError::ProtocolViolation {
            role: Role::Initiator,
            point: AttachmentPoint::CertificateRequest,
            phase: None,
        };
        let code = write_back(Err(err), Some(&mut out), &mut alert);
        assert_eq!(code, -1);
        assert_eq!(alert, 80);
        assert_eq!(out, vec![9u8]);
    }

    #[test]
    fn emit_moves_bytes_out() {
        let mut out = Vec::new();
        let mut alert = 0u8;
        let code = write_back(Ok(Disposition::Emit(vec![1, 2, 3])), Some(&mut out), &mut alert);
        assert_eq!(code, 1);
        assert_eq!(out, vec![1, 2, 3]);
        assert_eq!(alert, 0);
    }
}
