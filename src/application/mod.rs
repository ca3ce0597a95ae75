//! Application layer: callback orchestration over the domain and ports.
pub mod extension;

pub use extension::*;
