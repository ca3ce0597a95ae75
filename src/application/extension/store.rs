//! Per-connection ceremony state, keyed by the engine's connection handle.
//!
//! The store is an explicit map owned by the multiplexer: entries are created
//! on the first callback that needs one and removed only when the connection
//! is closed. Nothing here outlives a handshake, so linking a Registration to
//! an earlier PreRegistration is left to the application.
use std::collections::HashMap;
use std::fmt;

use crate::domain::ceremony::{
    AttachmentPoint, Ceremony, CeremonyPhase, PhaseEvent, Role, Transition,
};

use super::errors::DispatchError;

/// Engine-assigned connection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn#{}", self.0)
    }
}

/// Planned outcome of a dispatcher step before any payload work runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Planned {
    /// Run the codec for `ceremony`, then store `next`.
    Run {
        ceremony: Ceremony,
        next: CeremonyPhase,
    },
    /// Re-entrant callback after the final step; emit nothing.
    Hold,
}

/// Ceremony state for one connection.
#[derive(Debug)]
pub struct ConnectionState<P> {
    role: Role,
    phase: CeremonyPhase,
    payload: P,
}

impl<P: Default> ConnectionState<P> {
    /// Initiator state about to run `ceremony`.
    #[must_use]
    pub fn initiator(ceremony: Ceremony) -> Self {
        Self {
            role: Role::Initiator,
            phase: CeremonyPhase::initial(ceremony),
            payload: P::default(),
        }
    }

    /// Responder state before any Indication was accepted.
    #[must_use]
    pub fn responder() -> Self {
        Self {
            role: Role::Responder,
            phase: CeremonyPhase::Unindicated,
            payload: P::default(),
        }
    }
}

impl<P> ConnectionState<P> {
    /// Role fixed at creation.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Current phase.
    pub fn phase(&self) -> CeremonyPhase {
        self.phase
    }

    /// Codec-owned payload.
    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub(crate) fn payload_mut(&mut self) -> &mut P {
        &mut self.payload
    }

    pub(crate) fn into_payload(self) -> P {
        self.payload
    }

    /// Check `event` against the stored phase without changing it.
    pub(crate) fn plan(
        &self,
        conn: ConnectionId,
        event: PhaseEvent,
        point: AttachmentPoint,
    ) -> Result<Planned, DispatchError> {
        let violation = || {
            tracing::error!(
                %conn,
                role = %self.role,
                %point,
                phase = %self.phase,
                %event,
                "ceremony callback out of order"
            );
            DispatchError::ProtocolViolation {
                role: self.role,
                point,
                phase: Some(self.phase),
            }
        };
        match self.phase.advance(event) {
            Ok(Transition::Hold) => Ok(Planned::Hold),
            Ok(Transition::Advance(next)) => match next.ceremony() {
                Some(ceremony) if next.role() == self.role => Ok(Planned::Run { ceremony, next }),
                _ => Err(violation()),
            },
            Err(_) => Err(violation()),
        }
    }

    /// Store `next` after the payload work for `point` succeeded.
    pub(crate) fn commit(
        &mut self,
        conn: ConnectionId,
        next: CeremonyPhase,
        point: AttachmentPoint,
    ) {
        tracing::debug!(
            %conn,
            role = %self.role,
            %point,
            from = %self.phase,
            to = %next,
            "ceremony phase advanced"
        );
        self.phase = next;
    }
}

/// Map from connection handle to its state. Exactly one state per connection.
#[derive(Debug)]
pub struct ConnectionStore<P> {
    states: HashMap<ConnectionId, ConnectionState<P>>,
}

impl<P> Default for ConnectionStore<P> {
    fn default() -> Self {
        Self {
            states: HashMap::new(),
        }
    }
}

impl<P> ConnectionStore<P> {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing state only.
    pub fn get(&self, conn: ConnectionId) -> Option<&ConnectionState<P>> {
        self.states.get(&conn)
    }

    /// Existing state only, mutable.
    pub fn get_mut(&mut self, conn: ConnectionId) -> Option<&mut ConnectionState<P>> {
        self.states.get_mut(&conn)
    }

    /// Existing state, or a fresh one from `create` attached on first touch.
    pub fn get_or_insert_with(
        &mut self,
        conn: ConnectionId,
        create: impl FnOnce() -> ConnectionState<P>,
    ) -> &mut ConnectionState<P> {
        self.states.entry(conn).or_insert_with(|| {
            tracing::trace!(%conn, "connection state created");
            create()
        })
    }

    /// Detach and return the state for `conn`.
    pub fn remove(&mut self, conn: ConnectionId) -> Option<ConnectionState<P>> {
        self.states.remove(&conn)
    }

    /// Number of live connection states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// True when no connection has state.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
