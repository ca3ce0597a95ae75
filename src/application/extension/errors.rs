use thiserror::Error;

use crate::domain::ceremony::{Alert, AttachmentPoint, Ceremony, CeremonyPhase, MessageKind, Role};
use crate::ports::codec::CodecError;

use super::store::ConnectionId;

/// Fatal callback outcome. The engine must abort the handshake and send
/// [`DispatchError::alert`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The attachment point is not the required next step for the stored
    /// phase (or no phase exists where one is required).
    #[error("{role} callback at {point} is out of order (phase: {})", phase_label(.phase))]
    ProtocolViolation {
        /// Role of the dispatcher that refused the callback.
        role: Role,
        /// Attachment point the engine invoked.
        point: AttachmentPoint,
        /// Stored phase, `None` when the connection had no state.
        phase: Option<CeremonyPhase>,
    },

    /// Building or parsing a ceremony payload failed.
    #[error("{message} codec failure ({}): {source}", ceremony_label(.ceremony))]
    Codec {
        /// Ceremony in progress, `None` for an Indication that never decoded.
        ceremony: Option<Ceremony>,
        /// Message that was being built or parsed.
        message: MessageKind,
        /// Alert chosen for this attachment point.
        alert: Alert,
        /// Codec cause.
        #[source]
        source: CodecError,
    },
}

impl DispatchError {
    /// Alert the engine should send.
    #[must_use]
    pub fn alert(&self) -> Alert {
        match self {
            DispatchError::ProtocolViolation { .. } => Alert::InternalError,
            DispatchError::Codec { alert, .. } => *alert,
        }
    }

    /// Codec cause, if this failure came from the codec.
    #[must_use]
    pub fn codec_cause(&self) -> Option<&CodecError> {
        match self {
            DispatchError::Codec { source, .. } => Some(source),
            DispatchError::ProtocolViolation { .. } => None,
        }
    }

    /// True for ordering failures.
    #[must_use]
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, DispatchError::ProtocolViolation { .. })
    }
}

#[allow(clippy::ref_option)]
fn phase_label(phase: &Option<CeremonyPhase>) -> String {
    phase.map_or_else(|| "none".to_owned(), |p| p.to_string())
}

#[allow(clippy::ref_option)]
fn ceremony_label(ceremony: &Option<Ceremony>) -> String {
    ceremony.map_or_else(|| "unknown ceremony".to_owned(), |c| c.to_string())
}

/// Misuse of [`super::ExtensionMultiplexer::begin`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BeginError {
    /// Only an Initiator chooses which ceremony to run.
    #[error("ceremonies are started by the initiator, this endpoint is the {0}")]
    NotInitiator(Role),
    /// The connection already has a Connection State.
    #[error("connection {conn} already has ceremony state ({phase})")]
    AlreadyStarted {
        /// Connection that was seeded twice.
        conn: ConnectionId,
        /// Phase it is currently in.
        phase: CeremonyPhase,
    },
}
