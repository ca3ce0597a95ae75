use crate::domain::ceremony::{Alert, AttachmentPoint, Ceremony, MessageKind, PhaseEvent, Role};
use crate::ports::codec::{CeremonyCodec, CodecError};

use super::errors::DispatchError;
use super::outcome::{CallbackResult, Disposition};
use super::store::{ConnectionId, ConnectionState, Planned};

/// Phase-driven logic for the endpoint that starts ceremonies.
///
/// | attachment point      | direction | required step     | codec failure alert |
/// |-----------------------|-----------|-------------------|---------------------|
/// | hello                 | emit      | `Initial`         | `internal_error`    |
/// | certificate-request   | consume   | `IndicationSent`  | `access_denied`     |
/// | certificate           | emit      | `RequestReceived` | `access_denied`     |
///
/// The certificate attachment point fires again later in the same handshake;
/// once the Response was sent that second call resolves to `Omit`.
pub struct InitiatorDispatcher<'a, C: CeremonyCodec> {
    codec: &'a C,
}

impl<'a, C: CeremonyCodec> InitiatorDispatcher<'a, C> {
    /// Dispatcher borrowing the endpoint's codec.
    pub fn new(codec: &'a C) -> Self {
        Self { codec }
    }

    /// Hello attachment point: emit the Indication.
    ///
    /// # Errors
    /// `ProtocolViolation` unless the phase is `…Initial`; `Codec` with
    /// `internal_error` when the Indication cannot be built.
    pub fn emit_indication(
        &self,
        conn: ConnectionId,
        state: &mut ConnectionState<C::Payload>,
    ) -> CallbackResult {
        let point = AttachmentPoint::ClientHello;
        let Planned::Run { ceremony, next } = state.plan(conn, PhaseEvent::SendIndication, point)?
        else {
            return Ok(Disposition::Omit);
        };
        let bytes = self
            .codec
            .build_indication(ceremony, state.payload_mut())
            .map_err(|e| {
                codec_failure(conn, ceremony, MessageKind::Indication, Alert::InternalError, e)
            })?;
        state.commit(conn, next, point);
        Ok(Disposition::Emit(bytes))
    }

    /// Certificate-request attachment point: consume the Request.
    ///
    /// # Errors
    /// `ProtocolViolation` unless the phase is `…IndicationSent`; `Codec` with
    /// `access_denied` when the Request is refused.
    pub fn consume_request(
        &self,
        conn: ConnectionId,
        state: &mut ConnectionState<C::Payload>,
        input: &[u8],
    ) -> CallbackResult {
        let point = AttachmentPoint::CertificateRequest;
        let Planned::Run { ceremony, next } = state.plan(conn, PhaseEvent::ReceiveRequest, point)?
        else {
            return Ok(Disposition::Omit);
        };
        self.codec
            .parse_request(ceremony, state.payload_mut(), input)
            .map_err(|e| {
                codec_failure(conn, ceremony, MessageKind::Request, Alert::AccessDenied, e)
            })?;
        state.commit(conn, next, point);
        Ok(Disposition::Consumed)
    }

    /// Certificate attachment point: emit the Response, or nothing if it was
    /// already sent in this handshake.
    ///
    /// # Errors
    /// `ProtocolViolation` unless the phase is `…RequestReceived` or
    /// `…ResponseSent`; `Codec` with `access_denied` when no Response can be
    /// produced.
    pub fn emit_response(
        &self,
        conn: ConnectionId,
        state: &mut ConnectionState<C::Payload>,
    ) -> CallbackResult {
        let point = AttachmentPoint::Certificate;
        match state.plan(conn, PhaseEvent::SendResponse, point)? {
            Planned::Hold => {
                tracing::trace!(%conn, phase = %state.phase(), "response already sent, omitting");
                Ok(Disposition::Omit)
            }
            Planned::Run { ceremony, next } => {
                let bytes = self
                    .codec
                    .build_response(ceremony, state.payload_mut())
                    .map_err(|e| {
                        codec_failure(conn, ceremony, MessageKind::Response, Alert::AccessDenied, e)
                    })?;
                state.commit(conn, next, point);
                Ok(Disposition::Emit(bytes))
            }
        }
    }
}

fn codec_failure(
    conn: ConnectionId,
    ceremony: Ceremony,
    message: MessageKind,
    alert: Alert,
    source: CodecError,
) -> DispatchError {
    tracing::warn!(
        %conn,
        role = %Role::Initiator,
        %ceremony,
        %message,
        %alert,
        error = %source,
        "ceremony codec failed"
    );
    DispatchError::Codec {
        ceremony: Some(ceremony),
        message,
        alert,
        source,
    }
}
