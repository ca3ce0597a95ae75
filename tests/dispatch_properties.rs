//! Property tests over arbitrary callback sequences.

use fidotls::application::extension::{ConnectionId, Disposition, ExtensionMultiplexer};
use fidotls::domain::ceremony::{AttachmentPoint, Ceremony, Role};
use fidotls::test_support::{EXT, ScriptedCodec, mk_config};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Call {
    Add(AttachmentPoint),
    Parse(AttachmentPoint),
}

fn point() -> impl Strategy<Value = AttachmentPoint> {
    prop_oneof![
        Just(AttachmentPoint::ClientHello),
        Just(AttachmentPoint::CertificateRequest),
        Just(AttachmentPoint::Certificate),
    ]
}

fn ceremony() -> impl Strategy<Value = Ceremony> {
    prop_oneof![
        Just(Ceremony::PreRegistration),
        Just(Ceremony::Registration),
        Just(Ceremony::Authentication),
    ]
}

fn role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Initiator), Just(Role::Responder)]
}

fn call() -> impl Strategy<Value = Call> {
    prop_oneof![point().prop_map(Call::Add), point().prop_map(Call::Parse)]
}

fn mux(role: Role, ceremony: Ceremony) -> ExtensionMultiplexer<ScriptedCodec> {
    let conn = ConnectionId(1);
    let mut m = ExtensionMultiplexer::new(role, mk_config(), ScriptedCodec::new(ceremony)).unwrap();
    if role == Role::Initiator {
        m.begin(conn, ceremony).unwrap();
    }
    m
}

fn apply(
    m: &mut ExtensionMultiplexer<ScriptedCodec>,
    ext: u16,
    c: Call,
) -> fidotls::application::extension::CallbackResult {
    let conn = ConnectionId(1);
    match c {
        Call::Add(p) => m.add(conn, ext, p),
        Call::Parse(p) => m.parse(conn, ext, p, b"data"),
    }
}

proptest! {
    #[test]
    fn foreign_extension_type_always_omits(
        role in role(),
        ceremony in ceremony(),
        prefix in proptest::collection::vec(call(), 0..6),
        foreign in call(),
        ext in any::<u16>().prop_filter("must differ from ours", |t| *t != EXT),
    ) {
        let mut m = mux(role, ceremony);
        for c in prefix {
            let _ = apply(&mut m, EXT, c);
        }
        let conn = ConnectionId(1);
        let before = m.phase(conn);
        let calls = m.codec().calls().len();
        prop_assert_eq!(apply(&mut m, ext, foreign), Ok(Disposition::Omit));
        prop_assert_eq!(m.phase(conn), before);
        prop_assert_eq!(m.codec().calls().len(), calls);
    }

    #[test]
    fn fatal_results_never_change_phase(
        role in role(),
        ceremony in ceremony(),
        calls in proptest::collection::vec(call(), 1..12),
    ) {
        let mut m = mux(role, ceremony);
        let conn = ConnectionId(1);
        for c in calls {
            let before = m.phase(conn);
            if apply(&mut m, EXT, c).is_err() {
                prop_assert_eq!(m.phase(conn), before);
            }
        }
    }

    #[test]
    fn initiator_emits_each_message_at_most_once(
        ceremony in ceremony(),
        calls in proptest::collection::vec(call(), 1..16),
    ) {
        use fidotls::test_support::CodecOp;
        let mut m = mux(Role::Initiator, ceremony);
        for c in calls {
            let _ = apply(&mut m, EXT, c);
        }
        prop_assert!(m.codec().count(CodecOp::BuildIndication) <= 1);
        prop_assert!(m.codec().count(CodecOp::ParseRequest) <= 1);
        prop_assert!(m.codec().count(CodecOp::BuildResponse) <= 1);
    }
}
