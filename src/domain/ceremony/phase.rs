use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::PhaseError;

/// Endpoint role for the lifetime of one Connection State.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Starts ceremonies: emits the Indication and the Response.
    Initiator,
    /// Relying party: consumes the Indication, emits the Request, verifies
    /// the Response.
    Responder,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Initiator => f.write_str("initiator"),
            Role::Responder => f.write_str("responder"),
        }
    }
}

/// One complete FIDO2-style exchange carried in the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ceremony {
    /// Establishes the user handle before registration. Completing it requires
    /// a second, separate handshake running `Registration`.
    PreRegistration,
    /// Creates a credential bound to the channel.
    Registration,
    /// Proves possession of a registered credential.
    Authentication,
}

impl Ceremony {
    /// All ceremonies.
    pub const ALL: [Ceremony; 3] = [
        Ceremony::PreRegistration,
        Ceremony::Registration,
        Ceremony::Authentication,
    ];
}

impl fmt::Display for Ceremony {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ceremony::PreRegistration => f.write_str("pre_registration"),
            Ceremony::Registration => f.write_str("registration"),
            Ceremony::Authentication => f.write_str("authentication"),
        }
    }
}

/// Initiator progress within one ceremony.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitiatorStep {
    /// Nothing sent yet.
    Initial,
    /// Indication emitted in the hello message.
    IndicationSent,
    /// Request consumed from the certificate-request message.
    RequestReceived,
    /// Response emitted in the certificate message. Terminal.
    ResponseSent,
}

/// Responder progress within one ceremony.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponderStep {
    /// Indication consumed from the hello message.
    IndicationReceived,
    /// Request emitted in the certificate-request message.
    RequestSent,
    /// Response verified. Terminal and explicit for every ceremony.
    ResponseReceived,
}

/// Stored step for one connection's role.
///
/// Transitions are monotonic within a handshake; the only way back to an
/// earlier step is a fresh Indication on the Responder side, which starts a
/// new ceremony.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CeremonyPhase {
    /// Initiator-owned phase.
    Initiator {
        /// Ceremony being run.
        ceremony: Ceremony,
        /// Progress within it.
        step: InitiatorStep,
    },
    /// Responder state exists but the peer has not indicated any ceremony.
    Unindicated,
    /// Responder-owned phase.
    Responder {
        /// Ceremony indicated by the peer.
        ceremony: Ceremony,
        /// Progress within it.
        step: ResponderStep,
    },
}

/// Logical triggers applied by the dispatchers. Not on-wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseEvent {
    /// Initiator emitting the Indication.
    SendIndication,
    /// Initiator consuming the Request.
    ReceiveRequest,
    /// Initiator emitting the Response.
    SendResponse,
    /// Responder consuming an Indication for the given ceremony.
    ReceiveIndication(Ceremony),
    /// Responder emitting the Request.
    SendRequest,
    /// Responder consuming the Response.
    ReceiveResponse,
}

impl fmt::Display for PhaseEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseEvent::SendIndication => f.write_str("send_indication"),
            PhaseEvent::ReceiveRequest => f.write_str("receive_request"),
            PhaseEvent::SendResponse => f.write_str("send_response"),
            PhaseEvent::ReceiveIndication(c) => write!(f, "receive_indication({c})"),
            PhaseEvent::SendRequest => f.write_str("send_request"),
            PhaseEvent::ReceiveResponse => f.write_str("receive_response"),
        }
    }
}

/// Result of applying an event to a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Move to the contained phase once the payload work succeeds.
    Advance(CeremonyPhase),
    /// Stay put and emit nothing. Produced only when the certificate
    /// attachment point fires again after the Response was already sent.
    Hold,
}

impl CeremonyPhase {
    /// Starting phase for an Initiator running `ceremony`.
    #[must_use]
    pub const fn initial(ceremony: Ceremony) -> Self {
        CeremonyPhase::Initiator {
            ceremony,
            step: InitiatorStep::Initial,
        }
    }

    /// Role that owns this phase.
    #[must_use]
    pub const fn role(self) -> Role {
        match self {
            CeremonyPhase::Initiator { .. } => Role::Initiator,
            CeremonyPhase::Unindicated | CeremonyPhase::Responder { .. } => Role::Responder,
        }
    }

    /// Ceremony in progress, if any was chosen or indicated.
    #[must_use]
    pub const fn ceremony(self) -> Option<Ceremony> {
        match self {
            CeremonyPhase::Initiator { ceremony, .. } | CeremonyPhase::Responder { ceremony, .. } => {
                Some(ceremony)
            }
            CeremonyPhase::Unindicated => None,
        }
    }

    /// True once this side has nothing left to do for the ceremony in this
    /// handshake.
    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(
            self,
            CeremonyPhase::Initiator {
                step: InitiatorStep::ResponseSent,
                ..
            } | CeremonyPhase::Responder {
                step: ResponderStep::ResponseReceived,
                ..
            }
        )
    }

    /// True when a pre-registration finished and the application must run a
    /// separate handshake for `Registration`.
    #[must_use]
    pub const fn awaits_registration(self) -> bool {
        matches!(self.ceremony(), Some(Ceremony::PreRegistration)) && self.is_complete()
    }

    fn ordinal(self) -> u8 {
        match self {
            CeremonyPhase::Initiator { step, .. } => match step {
                InitiatorStep::Initial => 0,
                InitiatorStep::IndicationSent => 1,
                InitiatorStep::RequestReceived => 2,
                InitiatorStep::ResponseSent => 3,
            },
            CeremonyPhase::Unindicated => 0,
            CeremonyPhase::Responder { step, .. } => match step {
                ResponderStep::IndicationReceived => 1,
                ResponderStep::RequestSent => 2,
                ResponderStep::ResponseReceived => 3,
            },
        }
    }

    /// Apply `event` without mutating anything.
    ///
    /// Callers run the payload work only after this returns `Advance`, then
    /// store the new phase on success, so a failure never changes the stored
    /// phase.
    ///
    /// # Errors
    /// Returns [`PhaseError::InvalidTransition`] when `event` is not the
    /// required next step for this phase.
    pub fn advance(self, event: PhaseEvent) -> Result<Transition, PhaseError> {
        use CeremonyPhase::{Initiator, Responder, Unindicated};

        let next = match (self, event) {
            (
                Initiator {
                    ceremony,
                    step: InitiatorStep::Initial,
                },
                PhaseEvent::SendIndication,
            ) => Initiator {
                ceremony,
                step: InitiatorStep::IndicationSent,
            },
            (
                Initiator {
                    ceremony,
                    step: InitiatorStep::IndicationSent,
                },
                PhaseEvent::ReceiveRequest,
            ) => Initiator {
                ceremony,
                step: InitiatorStep::RequestReceived,
            },
            (
                Initiator {
                    ceremony,
                    step: InitiatorStep::RequestReceived,
                },
                PhaseEvent::SendResponse,
            ) => Initiator {
                ceremony,
                step: InitiatorStep::ResponseSent,
            },
            (
                Initiator {
                    step: InitiatorStep::ResponseSent,
                    ..
                },
                PhaseEvent::SendResponse,
            ) => return Ok(Transition::Hold),
            (Unindicated | Responder { .. }, PhaseEvent::ReceiveIndication(ceremony)) => {
                return Ok(Transition::Advance(Responder {
                    ceremony,
                    step: ResponderStep::IndicationReceived,
                }));
            }
            (
                Responder {
                    ceremony,
                    step: ResponderStep::IndicationReceived,
                },
                PhaseEvent::SendRequest,
            ) => Responder {
                ceremony,
                step: ResponderStep::RequestSent,
            },
            (
                Responder {
                    ceremony,
                    step: ResponderStep::RequestSent,
                },
                PhaseEvent::ReceiveResponse,
            ) => Responder {
                ceremony,
                step: ResponderStep::ResponseReceived,
            },
            (phase, event) => return Err(PhaseError::InvalidTransition { phase, event }),
        };
        debug_assert!(
            next.ordinal() > self.ordinal(),
            "phase regression: {self} -> {next}"
        );
        Ok(Transition::Advance(next))
    }
}

impl fmt::Display for CeremonyPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CeremonyPhase::Initiator { ceremony, step } => {
                let step = match step {
                    InitiatorStep::Initial => "initial",
                    InitiatorStep::IndicationSent => "indication_sent",
                    InitiatorStep::RequestReceived => "request_received",
                    InitiatorStep::ResponseSent => "response_sent",
                };
                write!(f, "initiator:{ceremony}.{step}")
            }
            CeremonyPhase::Unindicated => f.write_str("responder:unindicated"),
            CeremonyPhase::Responder { ceremony, step } => {
                let step = match step {
                    ResponderStep::IndicationReceived => "indication_received",
                    ResponderStep::RequestSent => "request_sent",
                    ResponderStep::ResponseReceived => "response_received",
                };
                write!(f, "responder:{ceremony}.{step}")
            }
        }
    }
}
