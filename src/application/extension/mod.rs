//! Ceremony extension orchestration: the per-connection store, the two role
//! dispatchers, and the multiplexer the handshake engine calls into.
pub mod config;
pub mod errors;
pub mod initiator;
pub mod multiplexer;
pub mod outcome;
pub mod responder;
pub mod store;

pub use config::{ConfigError, ExtensionConfig};
pub use errors::{BeginError, DispatchError};
pub use initiator::InitiatorDispatcher;
pub use multiplexer::ExtensionMultiplexer;
pub use outcome::{
    CallbackResult, Disposition, RETURN_EMIT, RETURN_FATAL, RETURN_OMIT, return_code, write_back,
};
pub use responder::ResponderDispatcher;
pub use store::{ConnectionId, ConnectionState, ConnectionStore};
