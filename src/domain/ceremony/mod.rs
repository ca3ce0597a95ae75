/*
Ceremony domain for `fidotls`.

Pure values describing where a connection is in a FIDO2-style ceremony that
rides inside a TLS 1.3 handshake extension:
`Indication (hello) -> Request (certificate-request) -> Response (certificate)`.

Goals:
* Make every legal step an explicit transition ([`CeremonyPhase::advance`]) so
  ordering violations are typed errors rather than fallthroughs.
* Represent ceremony success with an explicit terminal step on both roles.
* Keep engine-facing numbers (alert descriptions, context bits) in one place.

Nothing here touches payload bytes; building and checking ceremony payloads is
the job of the codec port.
*/

pub mod alert;
pub mod attachment;
pub mod errors;
mod params;
pub mod phase;

pub use alert::Alert;
pub use attachment::{AttachmentPoint, MessageKind};
pub use errors::PhaseError;
pub use params::DEFAULT_EXTENSION_TYPE;
pub(crate) use params::ENGINE_OWNED_EXTENSIONS;
pub use phase::*;
