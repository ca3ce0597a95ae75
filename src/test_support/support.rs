#![allow(dead_code)]
#![allow(missing_docs)]
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::application::extension::{ConnectionId, ExtensionConfig, ExtensionMultiplexer};
use crate::core::codec::{from_cbor, to_cbor};
use crate::domain::ceremony::{Ceremony, DEFAULT_EXTENSION_TYPE, Role};
use crate::ports::codec::{CeremonyCodec, CodecError};

/// Extension type used throughout the tests.
pub const EXT: u16 = DEFAULT_EXTENSION_TYPE;

/// Default config with the test extension type.
pub fn mk_config() -> ExtensionConfig {
    ExtensionConfig::default()
}

/// Ceremony message as carried by the loopback codec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Envelope {
    Indication { ceremony: Ceremony, user: String },
    Request { ceremony: Ceremony, challenge: Vec<u8> },
    Response { ceremony: Ceremony, proof: Vec<u8> },
}

/// Per-connection data kept by [`LoopbackCodec`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoopbackPayload {
    pub user: Option<String>,
    pub challenge: Option<Vec<u8>>,
    pub verified: bool,
}

/// Codec whose output one endpoint can feed straight into the other.
///
/// The "credential" is a shared secret; a Response is
/// `SHA-256(secret || ceremony || challenge)`. Endpoints built with different
/// secrets model a forged or wrong credential.
#[derive(Debug)]
pub struct LoopbackCodec {
    user: String,
    secret: [u8; 32],
    counter: Cell<u64>,
    released: Cell<usize>,
}

impl LoopbackCodec {
    pub fn new(user: &str, secret: [u8; 32]) -> Self {
        Self {
            user: user.to_owned(),
            secret,
            counter: Cell::new(0),
            released: Cell::new(0),
        }
    }

    /// Number of `release()` calls seen.
    pub fn released(&self) -> usize {
        self.released.get()
    }

    fn proof(&self, ceremony: Ceremony, challenge: &[u8]) -> Vec<u8> {
        let mut h = Sha256::new();
        h.update(self.secret);
        h.update(ceremony.to_string().as_bytes());
        h.update(challenge);
        h.finalize().to_vec()
    }

    fn decode(input: &[u8]) -> Result<Envelope, CodecError> {
        from_cbor(input).map_err(|e| CodecError::Malformed(e.to_string()))
    }

    fn encode(env: &Envelope) -> Result<Vec<u8>, CodecError> {
        to_cbor(env).map_err(|e| CodecError::Internal(e.to_string()))
    }
}

impl CeremonyCodec for LoopbackCodec {
    type Payload = LoopbackPayload;

    fn build_indication(
        &self,
        ceremony: Ceremony,
        payload: &mut LoopbackPayload,
    ) -> Result<Vec<u8>, CodecError> {
        payload.user = Some(self.user.clone());
        Self::encode(&Envelope::Indication {
            ceremony,
            user: self.user.clone(),
        })
    }

    fn parse_indication(
        &self,
        payload: &mut LoopbackPayload,
        input: &[u8],
    ) -> Result<Ceremony, CodecError> {
        match Self::decode(input)? {
            Envelope::Indication { ceremony, user } => {
                payload.user = Some(user);
                Ok(ceremony)
            }
            other => Err(CodecError::Malformed(format!("expected indication, got {other:?}"))),
        }
    }

    fn build_request(
        &self,
        ceremony: Ceremony,
        payload: &mut LoopbackPayload,
    ) -> Result<Vec<u8>, CodecError> {
        let n = self.counter.get() + 1;
        self.counter.set(n);
        let mut h = Sha256::new();
        h.update(payload.user.as_deref().unwrap_or_default().as_bytes());
        h.update(n.to_be_bytes());
        let challenge = h.finalize().to_vec();
        payload.challenge = Some(challenge.clone());
        Self::encode(&Envelope::Request {
            ceremony,
            challenge,
        })
    }

    fn parse_request(
        &self,
        ceremony: Ceremony,
        payload: &mut LoopbackPayload,
        input: &[u8],
    ) -> Result<(), CodecError> {
        match Self::decode(input)? {
            Envelope::Request {
                ceremony: got,
                challenge,
            } if got == ceremony => {
                payload.challenge = Some(challenge);
                Ok(())
            }
            Envelope::Request { ceremony: got, .. } => Err(CodecError::Rejected(format!(
                "request for {got} during {ceremony}"
            ))),
            other => Err(CodecError::Malformed(format!("expected request, got {other:?}"))),
        }
    }

    fn build_response(
        &self,
        ceremony: Ceremony,
        payload: &mut LoopbackPayload,
    ) -> Result<Vec<u8>, CodecError> {
        let challenge = payload
            .challenge
            .as_deref()
            .ok_or_else(|| CodecError::Internal("no challenge to answer".into()))?;
        Self::encode(&Envelope::Response {
            ceremony,
            proof: self.proof(ceremony, challenge),
        })
    }

    fn parse_response(
        &self,
        ceremony: Ceremony,
        payload: &mut LoopbackPayload,
        input: &[u8],
    ) -> Result<(), CodecError> {
        let Envelope::Response {
            ceremony: got,
            proof,
        } = Self::decode(input)?
        else {
            return Err(CodecError::Malformed("expected response".into()));
        };
        if got != ceremony {
            return Err(CodecError::Rejected(format!("response for {got} during {ceremony}")));
        }
        let challenge = payload
            .challenge
            .as_deref()
            .ok_or_else(|| CodecError::Internal("no outstanding challenge".into()))?;
        if proof != self.proof(ceremony, challenge) {
            return Err(CodecError::Rejected("proof does not match challenge".into()));
        }
        payload.verified = true;
        Ok(())
    }

    fn release(&self, _conn: ConnectionId, _payload: LoopbackPayload) {
        self.released.set(self.released.get() + 1);
    }
}

/// Codec operation, used to script failures and record calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecOp {
    BuildIndication,
    ParseIndication,
    BuildRequest,
    ParseRequest,
    BuildResponse,
    ParseResponse,
}

/// Codec that returns fixed bytes, records every call and fails on demand.
#[derive(Debug)]
pub struct ScriptedCodec {
    indicated: Ceremony,
    failures: HashMap<CodecOp, CodecError>,
    calls: RefCell<Vec<CodecOp>>,
    released: Cell<usize>,
}

impl ScriptedCodec {
    /// `indicated` is what `parse_indication` reports.
    pub fn new(indicated: Ceremony) -> Self {
        Self {
            indicated,
            failures: HashMap::new(),
            calls: RefCell::new(Vec::new()),
            released: Cell::new(0),
        }
    }

    /// Make `op` fail with `err`.
    #[must_use]
    pub fn failing(mut self, op: CodecOp, err: CodecError) -> Self {
        self.failures.insert(op, err);
        self
    }

    pub fn calls(&self) -> Vec<CodecOp> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, op: CodecOp) -> usize {
        self.calls.borrow().iter().filter(|c| **c == op).count()
    }

    pub fn released(&self) -> usize {
        self.released.get()
    }

    fn run(&self, op: CodecOp) -> Result<Vec<u8>, CodecError> {
        self.calls.borrow_mut().push(op);
        match self.failures.get(&op) {
            Some(err) => Err(err.clone()),
            None => Ok(vec![op as u8]),
        }
    }
}

impl CeremonyCodec for ScriptedCodec {
    type Payload = ();

    fn build_indication(&self, _ceremony: Ceremony, _payload: &mut ()) -> Result<Vec<u8>, CodecError> {
        self.run(CodecOp::BuildIndication)
    }

    fn parse_indication(&self, _payload: &mut (), _input: &[u8]) -> Result<Ceremony, CodecError> {
        self.run(CodecOp::ParseIndication).map(|_| self.indicated)
    }

    fn build_request(&self, _ceremony: Ceremony, _payload: &mut ()) -> Result<Vec<u8>, CodecError> {
        self.run(CodecOp::BuildRequest)
    }

    fn parse_request(
        &self,
        _ceremony: Ceremony,
        _payload: &mut (),
        _input: &[u8],
    ) -> Result<(), CodecError> {
        self.run(CodecOp::ParseRequest).map(|_| ())
    }

    fn build_response(&self, _ceremony: Ceremony, _payload: &mut ()) -> Result<Vec<u8>, CodecError> {
        self.run(CodecOp::BuildResponse)
    }

    fn parse_response(
        &self,
        _ceremony: Ceremony,
        _payload: &mut (),
        _input: &[u8],
    ) -> Result<(), CodecError> {
        self.run(CodecOp::ParseResponse).map(|_| ())
    }

    fn release(&self, _conn: ConnectionId, _payload: ()) {
        self.released.set(self.released.get() + 1);
    }
}

#[allow(clippy::missing_panics_doc)]
/// Initiator multiplexer over a scripted codec, seeded with `ceremony` on `conn`.
pub fn mk_initiator(conn: ConnectionId, ceremony: Ceremony) -> ExtensionMultiplexer<ScriptedCodec> {
    let mut mux = mk_mux(Role::Initiator, ScriptedCodec::new(ceremony));
    mux.begin(conn, ceremony)
        .expect("fresh multiplexer has no state for conn");
    mux
}

/// Responder multiplexer over `codec`.
pub fn mk_responder(codec: ScriptedCodec) -> ExtensionMultiplexer<ScriptedCodec> {
    mk_mux(Role::Responder, codec)
}

#[allow(clippy::missing_panics_doc)]
/// Multiplexer for `role` with the default config.
pub fn mk_mux<C: CeremonyCodec>(role: Role, codec: C) -> ExtensionMultiplexer<C> {
    ExtensionMultiplexer::new(role, mk_config(), codec).expect("default config is valid")
}
