//! Boundary traits between the dispatcher and external collaborators.
pub mod codec;

pub use codec::*;
