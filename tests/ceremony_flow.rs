//! End-to-end ceremony runs: an Initiator and a Responder multiplexer wired
//! back to back, with one side's extension bytes fed to the other.

use fidotls::application::extension::{
    ConnectionId, DispatchError, Disposition, ExtensionMultiplexer,
};
use fidotls::domain::ceremony::{
    Alert, AttachmentPoint, Ceremony, CeremonyPhase, InitiatorStep, ResponderStep,
};
use fidotls::ports::codec::CodecError;
use fidotls::test_support::{EXT, LoopbackCodec, mk_config};

const SECRET: [u8; 32] = [7u8; 32];

struct Pair {
    init: ExtensionMultiplexer<LoopbackCodec>,
    resp: ExtensionMultiplexer<LoopbackCodec>,
}

impl Pair {
    fn new(initiator_secret: [u8; 32]) -> Self {
        Self {
            init: ExtensionMultiplexer::initiator(
                mk_config(),
                LoopbackCodec::new("alice", initiator_secret),
            )
            .unwrap(),
            resp: ExtensionMultiplexer::responder(mk_config(), LoopbackCodec::new("rp", SECRET))
                .unwrap(),
        }
    }

    fn emitted(result: Result<Disposition, DispatchError>) -> Vec<u8> {
        match result {
            Ok(Disposition::Emit(bytes)) => bytes,
            other => panic!("expected emitted bytes, got {other:?}"),
        }
    }

    /// Hello and certificate-request legs.
    fn run_until_request(&mut self, conn: ConnectionId) {
        let ind = Self::emitted(self.init.add(conn, EXT, AttachmentPoint::ClientHello));
        assert_eq!(
            self.resp.parse(conn, EXT, AttachmentPoint::ClientHello, &ind),
            Ok(Disposition::Consumed)
        );
        let req = Self::emitted(self.resp.add(conn, EXT, AttachmentPoint::CertificateRequest));
        assert_eq!(
            self.init.parse(conn, EXT, AttachmentPoint::CertificateRequest, &req),
            Ok(Disposition::Consumed)
        );
    }

    fn run(&mut self, conn: ConnectionId) -> Result<Disposition, DispatchError> {
        self.run_until_request(conn);
        let proof = Self::emitted(self.init.add(conn, EXT, AttachmentPoint::Certificate));
        self.resp.parse(conn, EXT, AttachmentPoint::Certificate, &proof)
    }
}

#[test]
fn registration_happy_path() {
    let conn = ConnectionId(10);
    let mut p = Pair::new(SECRET);
    p.init.begin(conn, Ceremony::Registration).unwrap();

    let ind = Pair::emitted(p.init.add(conn, EXT, AttachmentPoint::ClientHello));
    assert_eq!(
        p.init.phase(conn),
        Some(CeremonyPhase::Initiator {
            ceremony: Ceremony::Registration,
            step: InitiatorStep::IndicationSent
        })
    );

    assert_eq!(p.resp.connections(), 0);
    p.resp.parse(conn, EXT, AttachmentPoint::ClientHello, &ind).unwrap();
    assert_eq!(
        p.resp.phase(conn),
        Some(CeremonyPhase::Responder {
            ceremony: Ceremony::Registration,
            step: ResponderStep::IndicationReceived
        })
    );
    assert_eq!(p.resp.payload(conn).unwrap().user.as_deref(), Some("alice"));

    let req = Pair::emitted(p.resp.add(conn, EXT, AttachmentPoint::CertificateRequest));
    assert_eq!(
        p.resp.phase(conn),
        Some(CeremonyPhase::Responder {
            ceremony: Ceremony::Registration,
            step: ResponderStep::RequestSent
        })
    );

    p.init.parse(conn, EXT, AttachmentPoint::CertificateRequest, &req).unwrap();
    assert_eq!(
        p.init.phase(conn),
        Some(CeremonyPhase::Initiator {
            ceremony: Ceremony::Registration,
            step: InitiatorStep::RequestReceived
        })
    );

    let proof = Pair::emitted(p.init.add(conn, EXT, AttachmentPoint::Certificate));
    assert_eq!(
        p.init.phase(conn),
        Some(CeremonyPhase::Initiator {
            ceremony: Ceremony::Registration,
            step: InitiatorStep::ResponseSent
        })
    );

    assert_eq!(
        p.resp.parse(conn, EXT, AttachmentPoint::Certificate, &proof),
        Ok(Disposition::Consumed)
    );
    let done = p.resp.phase(conn).unwrap();
    assert!(done.is_complete());
    assert!(!done.awaits_registration());
    assert!(p.resp.payload(conn).unwrap().verified);
}

#[test]
fn out_of_order_request_aborts_with_internal_error() {
    let conn = ConnectionId(11);
    let mut p = Pair::new(SECRET);
    p.init.begin(conn, Ceremony::Authentication).unwrap();

    let err = p
        .init
        .parse(conn, EXT, AttachmentPoint::CertificateRequest, b"anything")
        .unwrap_err();
    assert!(err.is_protocol_violation());
    assert_eq!(err.alert(), Alert::InternalError);
    assert_eq!(
        p.init.phase(conn),
        Some(CeremonyPhase::initial(Ceremony::Authentication))
    );
}

#[test]
fn second_certificate_callback_is_omitted() {
    let conn = ConnectionId(12);
    let mut p = Pair::new(SECRET);
    p.init.begin(conn, Ceremony::Registration).unwrap();
    p.run(conn).unwrap();

    let before = p.init.phase(conn);
    assert_eq!(
        p.init.add(conn, EXT, AttachmentPoint::Certificate),
        Ok(Disposition::Omit)
    );
    assert_eq!(p.init.phase(conn), before);
}

#[test]
fn registration_after_pre_registration_needs_new_handshake() {
    let first = ConnectionId(20);
    let mut p = Pair::new(SECRET);
    p.init.begin(first, Ceremony::PreRegistration).unwrap();
    assert_eq!(p.run(first), Ok(Disposition::Consumed));

    let resp_phase = p.resp.phase(first).unwrap();
    assert!(resp_phase.awaits_registration());
    assert_eq!(
        resp_phase,
        CeremonyPhase::Responder {
            ceremony: Ceremony::PreRegistration,
            step: ResponderStep::ResponseReceived
        }
    );
    // nothing on either side moved on to registration by itself
    assert_eq!(
        p.init.phase(first),
        Some(CeremonyPhase::Initiator {
            ceremony: Ceremony::PreRegistration,
            step: InitiatorStep::ResponseSent
        })
    );
    let err = p.init.add(first, EXT, AttachmentPoint::ClientHello).unwrap_err();
    assert!(err.is_protocol_violation());

    assert!(p.init.close(first).unwrap().awaits_registration());
    assert!(p.resp.close(first).unwrap().awaits_registration());

    let second = ConnectionId(21);
    p.init.begin(second, Ceremony::Registration).unwrap();
    assert_eq!(p.run(second), Ok(Disposition::Consumed));
    assert_eq!(
        p.resp.phase(second),
        Some(CeremonyPhase::Responder {
            ceremony: Ceremony::Registration,
            step: ResponderStep::ResponseReceived
        })
    );
    assert_eq!(p.init.codec().released(), 1);
    assert_eq!(p.resp.codec().released(), 1);
}

#[test]
fn wrong_credential_is_access_denied() {
    let conn = ConnectionId(30);
    let mut p = Pair::new([9u8; 32]);
    p.init.begin(conn, Ceremony::Authentication).unwrap();

    let err = p.run(conn).unwrap_err();
    assert_eq!(err.alert(), Alert::AccessDenied);
    assert!(matches!(err.codec_cause(), Some(CodecError::Rejected(_))));
    assert_eq!(
        p.resp.phase(conn),
        Some(CeremonyPhase::Responder {
            ceremony: Ceremony::Authentication,
            step: ResponderStep::RequestSent
        })
    );
    assert!(!p.resp.payload(conn).unwrap().verified);
}

#[test]
fn garbled_response_is_access_denied_with_malformed_cause() {
    let conn = ConnectionId(31);
    let mut p = Pair::new(SECRET);
    p.init.begin(conn, Ceremony::Registration).unwrap();
    p.run_until_request(conn);
    let mut proof = Pair::emitted(p.init.add(conn, EXT, AttachmentPoint::Certificate));
    proof.truncate(proof.len() / 2);

    let err = p
        .resp
        .parse(conn, EXT, AttachmentPoint::Certificate, &proof)
        .unwrap_err();
    assert_eq!(err.alert(), Alert::AccessDenied);
    assert!(matches!(err.codec_cause(), Some(CodecError::Malformed(_))));
}

#[test]
fn peer_without_extension_data_is_ignored() {
    let conn = ConnectionId(40);
    let mut p = Pair::new(SECRET);
    assert_eq!(
        p.resp.parse(conn, EXT, AttachmentPoint::ClientHello, &[]),
        Ok(Disposition::Omit)
    );
    assert_eq!(
        p.resp.add(conn, EXT, AttachmentPoint::CertificateRequest),
        Ok(Disposition::Omit)
    );
    assert_eq!(p.resp.phase(conn), Some(CeremonyPhase::Unindicated));
}

#[test]
fn connections_are_independent() {
    let a = ConnectionId(50);
    let b = ConnectionId(51);
    let mut p = Pair::new(SECRET);
    p.init.begin(a, Ceremony::Authentication).unwrap();
    p.init.begin(b, Ceremony::Registration).unwrap();

    p.run_until_request(a);
    assert_eq!(
        p.init.phase(b),
        Some(CeremonyPhase::initial(Ceremony::Registration))
    );
    assert_eq!(p.run(b), Ok(Disposition::Consumed));
    assert_eq!(
        p.resp.phase(a),
        Some(CeremonyPhase::Responder {
            ceremony: Ceremony::Authentication,
            step: ResponderStep::RequestSent
        })
    );
    assert_eq!(p.resp.connections(), 2);
}
