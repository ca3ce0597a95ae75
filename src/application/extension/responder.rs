use crate::domain::ceremony::{
    Alert, AttachmentPoint, Ceremony, CeremonyPhase, MessageKind, PhaseEvent, Role,
};
use crate::ports::codec::{CeremonyCodec, CodecError};

use super::errors::DispatchError;
use super::outcome::{CallbackResult, Disposition};
use super::store::{ConnectionId, ConnectionState, Planned};

/// Phase-driven logic for the relying party.
///
/// | attachment point      | direction | required step          |
/// |-----------------------|-----------|------------------------|
/// | hello                 | consume   | any                    |
/// | certificate-request   | emit      | `IndicationReceived`   |
/// | certificate           | consume   | `RequestSent`          |
///
/// A connection left `Unindicated` omits both later attachment points.
///
/// Every codec failure aborts with `access_denied`, except an Indication that
/// does not decode at all: that peer simply is not using the extension.
pub struct ResponderDispatcher<'a, C: CeremonyCodec> {
    codec: &'a C,
}

impl<'a, C: CeremonyCodec> ResponderDispatcher<'a, C> {
    /// Dispatcher borrowing the endpoint's codec.
    pub fn new(codec: &'a C) -> Self {
        Self { codec }
    }

    /// Hello attachment point: accept whichever ceremony the peer indicates,
    /// regardless of the stored phase.
    ///
    /// # Errors
    /// `Codec` with `access_denied` when the Indication decodes but is
    /// refused, or the codec fails locally.
    pub fn consume_indication(
        &self,
        conn: ConnectionId,
        state: &mut ConnectionState<C::Payload>,
        input: &[u8],
    ) -> CallbackResult {
        let point = AttachmentPoint::ClientHello;
        let ceremony = match self.codec.parse_indication(state.payload_mut(), input) {
            Ok(ceremony) => ceremony,
            Err(CodecError::Malformed(reason)) => {
                tracing::debug!(%conn, %reason, "no ceremony indicated, ignoring extension");
                return Ok(Disposition::Omit);
            }
            Err(e) => return Err(codec_failure(conn, None, MessageKind::Indication, e)),
        };
        let Planned::Run { next, .. } =
            state.plan(conn, PhaseEvent::ReceiveIndication(ceremony), point)?
        else {
            return Ok(Disposition::Omit);
        };
        state.commit(conn, next, point);
        Ok(Disposition::Consumed)
    }

    /// Certificate-request attachment point: emit the Request.
    ///
    /// # Errors
    /// `ProtocolViolation` unless the phase is `…IndicationReceived`; `Codec`
    /// with `access_denied` when the Request cannot be built.
    pub fn emit_request(
        &self,
        conn: ConnectionId,
        state: &mut ConnectionState<C::Payload>,
    ) -> CallbackResult {
        let point = AttachmentPoint::CertificateRequest;
        if state.phase() == CeremonyPhase::Unindicated {
            tracing::trace!(%conn, "peer indicated no ceremony, omitting request");
            return Ok(Disposition::Omit);
        }
        let Planned::Run { ceremony, next } = state.plan(conn, PhaseEvent::SendRequest, point)?
        else {
            return Ok(Disposition::Omit);
        };
        let bytes = self
            .codec
            .build_request(ceremony, state.payload_mut())
            .map_err(|e| codec_failure(conn, Some(ceremony), MessageKind::Request, e))?;
        state.commit(conn, next, point);
        Ok(Disposition::Emit(bytes))
    }

    /// Certificate attachment point: verify the Response. Success stores the
    /// terminal `…ResponseReceived` phase for every ceremony.
    ///
    /// Omitted while `Unindicated`, like the request.
    ///
    /// # Errors
    /// `ProtocolViolation` unless the phase is `…RequestSent`; `Codec` with
    /// `access_denied` when verification fails.
    pub fn consume_response(
        &self,
        conn: ConnectionId,
        state: &mut ConnectionState<C::Payload>,
        input: &[u8],
    ) -> CallbackResult {
        let point = AttachmentPoint::Certificate;
        if state.phase() == CeremonyPhase::Unindicated {
            tracing::trace!(%conn, "peer indicated no ceremony, ignoring certificate data");
            return Ok(Disposition::Omit);
        }
        let Planned::Run { ceremony, next } =
            state.plan(conn, PhaseEvent::ReceiveResponse, point)?
        else {
            return Ok(Disposition::Omit);
        };
        self.codec
            .parse_response(ceremony, state.payload_mut(), input)
            .map_err(|e| codec_failure(conn, Some(ceremony), MessageKind::Response, e))?;
        state.commit(conn, next, point);
        if next.awaits_registration() {
            tracing::info!(%conn, "pre-registration complete, registration needs a new handshake");
        } else {
            tracing::info!(%conn, %ceremony, "ceremony complete");
        }
        Ok(Disposition::Consumed)
    }
}

fn codec_failure(
    conn: ConnectionId,
    ceremony: Option<Ceremony>,
    message: MessageKind,
    source: CodecError,
) -> DispatchError {
    let alert = Alert::AccessDenied;
    tracing::warn!(
        %conn,
        role = %Role::Responder,
        ceremony = ?ceremony,
        %message,
        %alert,
        error = %source,
        "ceremony codec failed"
    );
    DispatchError::Codec {
        ceremony,
        message,
        alert,
        source,
    }
}
