use std::fmt;

use crate::domain::ceremony::{AttachmentPoint, Ceremony, CeremonyPhase, Role};
use crate::ports::codec::CeremonyCodec;

use super::config::{ConfigError, ExtensionConfig};
use super::errors::{BeginError, DispatchError};
use super::initiator::InitiatorDispatcher;
use super::outcome::{CallbackResult, Disposition, RETURN_OMIT, write_back};
use super::responder::ResponderDispatcher;
use super::store::{ConnectionId, ConnectionState, ConnectionStore};

/// Entry points the handshake engine calls for the ceremony extension.
///
/// One multiplexer serves every connection of one endpoint role. It filters
/// by extension type, owns the [`ConnectionStore`], and routes each callback
/// to the role's dispatcher by attachment point:
///
/// | role      | hello           | certificate-request | certificate        |
/// |-----------|-----------------|---------------------|--------------------|
/// | Initiator | emit Indication | consume Request     | emit Response      |
/// | Responder | consume Indic.  | emit Request        | consume Response   |
///
/// Any other (role, direction, attachment point) combination is omitted.
///
/// Callbacks run synchronously inside the engine, one at a time per
/// connection. Codec calls may block (authenticator I/O); the handshake waits.
pub struct ExtensionMultiplexer<C: CeremonyCodec> {
    role: Role,
    config: ExtensionConfig,
    codec: C,
    store: ConnectionStore<C::Payload>,
}

impl<C: CeremonyCodec> fmt::Debug for ExtensionMultiplexer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionMultiplexer")
            .field("role", &self.role)
            .field("config", &self.config)
            .field("connections", &self.store.len())
            .finish_non_exhaustive()
    }
}

impl<C: CeremonyCodec> ExtensionMultiplexer<C> {
    /// Multiplexer for `role`.
    ///
    /// # Errors
    /// Any [`ExtensionConfig::validate`] failure.
    pub fn new(role: Role, config: ExtensionConfig, codec: C) -> Result<Self, ConfigError> {
        config.validate()?;
        tracing::debug!(
            %role,
            extension_type = config.extension_type,
            "ceremony extension ready"
        );
        Ok(Self {
            role,
            config,
            codec,
            store: ConnectionStore::new(),
        })
    }

    /// Initiator-side multiplexer.
    ///
    /// # Errors
    /// Same as [`ExtensionMultiplexer::new`].
    pub fn initiator(config: ExtensionConfig, codec: C) -> Result<Self, ConfigError> {
        Self::new(Role::Initiator, config, codec)
    }

    /// Responder-side multiplexer.
    ///
    /// # Errors
    /// Same as [`ExtensionMultiplexer::new`].
    pub fn responder(config: ExtensionConfig, codec: C) -> Result<Self, ConfigError> {
        Self::new(Role::Responder, config, codec)
    }

    /// Endpoint role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Active configuration.
    pub fn config(&self) -> &ExtensionConfig {
        &self.config
    }

    /// Underlying codec.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Choose the ceremony an Initiator runs on `conn`. Must be called before
    /// the connection's first callback.
    ///
    /// # Errors
    /// [`BeginError::NotInitiator`] on a Responder, and
    /// [`BeginError::AlreadyStarted`] if `conn` already has state.
    pub fn begin(&mut self, conn: ConnectionId, ceremony: Ceremony) -> Result<(), BeginError> {
        if self.role != Role::Initiator {
            return Err(BeginError::NotInitiator(self.role));
        }
        if let Some(existing) = self.store.get(conn) {
            return Err(BeginError::AlreadyStarted {
                conn,
                phase: existing.phase(),
            });
        }
        self.store
            .get_or_insert_with(conn, || ConnectionState::initiator(ceremony));
        tracing::debug!(%conn, %ceremony, "ceremony seeded");
        Ok(())
    }

    /// Current phase for `conn`, if it has state.
    pub fn phase(&self, conn: ConnectionId) -> Option<CeremonyPhase> {
        self.store.get(conn).map(ConnectionState::phase)
    }

    /// Codec payload for `conn`, if it has state.
    pub fn payload(&self, conn: ConnectionId) -> Option<&C::Payload> {
        self.store.get(conn).map(ConnectionState::payload)
    }

    /// Number of connections holding ceremony state.
    pub fn connections(&self) -> usize {
        self.store.len()
    }

    /// "Add" callback: the engine is building `point` and asks whether to
    /// include extension data.
    pub fn add(
        &mut self,
        conn: ConnectionId,
        ext_type: u16,
        point: AttachmentPoint,
    ) -> CallbackResult {
        if ext_type != self.config.extension_type {
            return Ok(Disposition::Omit);
        }
        match (self.role, point) {
            (Role::Initiator, AttachmentPoint::ClientHello) => {
                let state = match self.config.initiator_ceremony {
                    Some(ceremony) => Some(
                        self.store
                            .get_or_insert_with(conn, || ConnectionState::initiator(ceremony)),
                    ),
                    None => self.store.get_mut(conn),
                };
                let Some(state) = state else {
                    tracing::trace!(%conn, "no ceremony chosen, extension not offered");
                    return Ok(Disposition::Omit);
                };
                InitiatorDispatcher::new(&self.codec).emit_indication(conn, state)
            }
            (Role::Initiator, AttachmentPoint::Certificate) => match self.store.get_mut(conn) {
                Some(state) => InitiatorDispatcher::new(&self.codec).emit_response(conn, state),
                None => Ok(Disposition::Omit),
            },
            (Role::Responder, AttachmentPoint::CertificateRequest) => {
                match self.store.get_mut(conn) {
                    Some(state) => ResponderDispatcher::new(&self.codec).emit_request(conn, state),
                    None => {
                        tracing::trace!(%conn, "peer never offered the extension");
                        Ok(Disposition::Omit)
                    }
                }
            }
            _ => Ok(Disposition::Omit),
        }
    }

    /// "Parse" callback: the engine received `point` carrying extension data.
    pub fn parse(
        &mut self,
        conn: ConnectionId,
        ext_type: u16,
        point: AttachmentPoint,
        input: &[u8],
    ) -> CallbackResult {
        if ext_type != self.config.extension_type {
            return Ok(Disposition::Omit);
        }
        match (self.role, point) {
            (Role::Initiator, AttachmentPoint::CertificateRequest) => {
                match self.store.get_mut(conn) {
                    Some(state) => {
                        InitiatorDispatcher::new(&self.codec).consume_request(conn, state, input)
                    }
                    None => {
                        tracing::error!(%conn, %point, "unsolicited ceremony request");
                        Err(DispatchError::ProtocolViolation {
                            role: self.role,
                            point,
                            phase: None,
                        })
                    }
                }
            }
            (Role::Responder, AttachmentPoint::ClientHello) => {
                let state = self.store.get_or_insert_with(conn, ConnectionState::responder);
                ResponderDispatcher::new(&self.codec).consume_indication(conn, state, input)
            }
            (Role::Responder, AttachmentPoint::Certificate) => match self.store.get_mut(conn) {
                Some(state) => {
                    ResponderDispatcher::new(&self.codec).consume_response(conn, state, input)
                }
                None => Ok(Disposition::Omit),
            },
            _ => Ok(Disposition::Omit),
        }
    }

    /// "Free" callback: the engine discards the data it got from `add`.
    ///
    /// Emitted payloads are owned buffers handed to the engine, so there is
    /// nothing to release per message.
    pub fn free(&mut self, conn: ConnectionId, ext_type: u16, point: AttachmentPoint) {
        if ext_type == self.config.extension_type {
            tracing::trace!(%conn, %point, "extension data freed");
        }
    }

    /// Tear down `conn`'s state and release its payload through the codec.
    /// Returns the final phase, or `None` if the connection had no state.
    pub fn close(&mut self, conn: ConnectionId) -> Option<CeremonyPhase> {
        let state = self.store.remove(conn)?;
        let phase = state.phase();
        tracing::debug!(%conn, %phase, "connection state released");
        self.codec.release(conn, state.into_payload());
        Some(phase)
    }

    /// Engine-facing "add": raw context bits, return code and alert
    /// out-parameter.
    pub fn add_raw(
        &mut self,
        conn: ConnectionId,
        ext_type: u32,
        context: u32,
        out: &mut Vec<u8>,
        alert: &mut u8,
    ) -> i32 {
        let (Ok(ext_type), Some(point)) =
            (u16::try_from(ext_type), AttachmentPoint::from_context(context))
        else {
            return RETURN_OMIT;
        };
        let result = self.add(conn, ext_type, point);
        write_back(result, Some(out), alert)
    }

    /// Engine-facing "parse": raw context bits, return code and alert
    /// out-parameter.
    pub fn parse_raw(
        &mut self,
        conn: ConnectionId,
        ext_type: u32,
        context: u32,
        input: &[u8],
        alert: &mut u8,
    ) -> i32 {
        let (Ok(ext_type), Some(point)) =
            (u16::try_from(ext_type), AttachmentPoint::from_context(context))
        else {
            return RETURN_OMIT;
        };
        let result = self.parse(conn, ext_type, point, input);
        write_back(result, None, alert)
    }
}
