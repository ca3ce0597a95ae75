//! Domain layer: protocol values with no I/O and no codec dependency.
pub mod ceremony;
