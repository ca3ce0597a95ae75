use thiserror::Error;

use super::phase::{CeremonyPhase, PhaseEvent};

/// Phase-level failures. Every variant is an ordering problem, never a
/// payload problem; payload failures live in the codec port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PhaseError {
    /// The event is not the required next step for the current phase.
    #[error("event {event} is not allowed in phase {phase}")]
    InvalidTransition {
        /// Phase the connection was in.
        phase: CeremonyPhase,
        /// Event that was attempted.
        event: PhaseEvent,
    },
}
