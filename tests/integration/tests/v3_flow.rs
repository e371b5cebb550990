//! Integration test: V3 circuit verification.
//!
//! Covers the V3-only bindings end-to-end: caller identity (direct and BJJ),
//! challenge, verifier, nullifier session, link group, proof type, and
//! selective disclosure of the operator output.

use vigil_core::{Address, DisclosurePair};
use vigil_crypto::{address_to_le_signal, id_from_address};
use vigil_integration_tests::{disclosed_names, u, Scenario, ID_TYPE, MTP_V2, NOW, V3};
use vigil_verifier::signals::names;
use vigil_verifier::{AtomicQuery, Operator, V3QueryFields, VerificationError};

fn v3_query(fields: V3QueryFields) -> AtomicQuery {
    AtomicQuery {
        v3: fields,
        ..Scenario::query(V3)
    }
}

fn other_caller() -> Address {
    Address::from([0x0Bu8; 20])
}

// =========================================================================
// Disclosures
// =========================================================================

#[test]
fn test_v3_proof_discloses_link_and_nullifier_fields() {
    let s = Scenario::new();
    let pairs = s
        .verify(V3, &s.v3_signals(), &Scenario::query(V3))
        .expect("valid V3 proof");

    assert_eq!(
        disclosed_names(&pairs),
        vec![
            "userID",
            "linkID",
            "nullifier",
            "timestamp",
            "verifierID",
            "nullifierSessionID"
        ]
    );
    assert_eq!(pairs[0], DisclosurePair::new("userID", 0));
    assert_eq!(pairs[3], DisclosurePair::new("timestamp", 13));
}

#[test]
fn test_selective_disclosure_adds_operator_output() {
    let s = Scenario::new();
    let mut query = Scenario::query(V3);
    query.operator = Operator::SelectiveDisclosure;
    let signals = s.v3_signals();

    let pairs = s.verify(V3, &signals, &query).expect("valid V3 proof");
    assert_eq!(
        disclosed_names(&pairs),
        vec![
            "userID",
            "linkID",
            "nullifier",
            "operatorOutput",
            "timestamp",
            "verifierID",
            "nullifierSessionID"
        ]
    );
    let raw = signals.layout(V3);
    assert_eq!(raw[pairs[3].index], u(42));
}

#[test]
fn test_selective_disclosure_operator_is_configurable() {
    let mut s = Scenario::new();
    let query = Scenario::query(V3);
    assert_eq!(query.operator, Operator::Lt);

    let before = s.verify(V3, &s.v3_signals(), &query).unwrap();
    assert!(!disclosed_names(&before).contains(&"operatorOutput"));

    s.admin.set_selective_disclosure_operator(Operator::Lt.code());
    let after = s.verify(V3, &s.v3_signals(), &query).unwrap();
    assert!(disclosed_names(&after).contains(&"operatorOutput"));
}

// =========================================================================
// Caller binding
// =========================================================================

#[test]
fn test_direct_auth_requires_callers_own_identifier() {
    let s = Scenario::new();
    let mut request = s.request(V3, &s.v3_signals(), &Scenario::query(V3));
    request.caller = other_caller();

    let err = s.engine.verify(&request, &s.ledger.snapshot(NOW)).unwrap_err();
    assert_eq!(
        err,
        VerificationError::CallerIdentityMismatch {
            user_id: s.caller_id(),
            caller: other_caller(),
            expected: id_from_address(ID_TYPE, other_caller()),
        }
    );
}

#[test]
fn test_bjj_auth_skips_caller_identifier() {
    let s = Scenario::new();
    let signals = s
        .v3_signals()
        .with(names::IS_BJJ_AUTH_ENABLED, u(1))
        .with(names::USER_ID, u(0x0005_E4_1D));

    let pairs = s
        .verify(V3, &signals, &Scenario::query(V3))
        .expect("BJJ-authenticated proof");
    assert_eq!(pairs[0].name, "userID");
}

#[test]
fn test_bjj_flag_other_than_one_means_direct_auth() {
    let s = Scenario::new();
    let signals = s
        .v3_signals()
        .with(names::IS_BJJ_AUTH_ENABLED, u(2))
        .with(names::USER_ID, u(0x0005_E4_1D));

    let err = s
        .verify(V3, &signals, &Scenario::query(V3))
        .unwrap_err();
    assert!(matches!(
        err,
        VerificationError::CallerIdentityMismatch { .. }
    ));
}

#[test]
fn test_challenge_must_encode_caller() {
    let s = Scenario::new();
    let signals = s
        .v3_signals()
        .with(names::CHALLENGE, address_to_le_signal(other_caller()));

    let err = s
        .verify(V3, &signals, &Scenario::query(V3))
        .unwrap_err();
    assert!(matches!(err, VerificationError::ChallengeMismatch { .. }));
}

#[test]
fn test_common_circuits_do_not_bind_caller() {
    let s = Scenario::new();
    let mut request = s.request(MTP_V2, &s.common_signals(), &Scenario::query(MTP_V2));
    request.caller = other_caller();
    s.engine
        .verify(&request, &s.ledger.snapshot(NOW))
        .expect("caller is not part of the base checks");
}

// =========================================================================
// Query bindings
// =========================================================================

#[test]
fn test_verifier_id_binding() {
    let s = Scenario::new();
    let verifier = u(0x0000_7E41_F1E4);
    let query = v3_query(V3QueryFields {
        verifier_id: verifier,
        ..V3QueryFields::default()
    });

    let err = s.verify(V3, &s.v3_signals(), &query).unwrap_err();
    assert_eq!(
        err,
        VerificationError::VerifierIdMismatch {
            expected: verifier,
            actual: u(0),
        }
    );

    let signals = s.v3_signals().with(names::VERIFIER_ID, verifier);
    s.verify(V3, &signals, &query).expect("verifier id matches");
}

#[test]
fn test_unset_verifier_id_accepts_any() {
    let s = Scenario::new();
    let signals = s.v3_signals().with(names::VERIFIER_ID, u(77));
    s.verify(V3, &signals, &Scenario::query(V3))
        .expect("query does not pin a verifier");
}

#[test]
fn test_nullifier_session_requires_nullifier() {
    let s = Scenario::new();
    let session = u(0x5E55);
    let query = v3_query(V3QueryFields {
        nullifier_session_id: session,
        ..V3QueryFields::default()
    });

    let signals = s.v3_signals().with(names::NULLIFIER_SESSION_ID, session);
    let err = s.verify(V3, &signals, &query).unwrap_err();
    assert_eq!(err, VerificationError::InvalidNullifier { session });

    let signals = signals.with(names::NULLIFIER, u(0x0011_0F1E));
    s.verify(V3, &signals, &query).expect("nullifier present");
}

#[test]
fn test_nullifier_session_must_match_exactly() {
    let s = Scenario::new();
    let query = Scenario::query(V3);
    let signals = s
        .v3_signals()
        .with(names::NULLIFIER_SESSION_ID, u(9))
        .with(names::NULLIFIER, u(1));

    let err = s.verify(V3, &signals, &query).unwrap_err();
    assert_eq!(
        err,
        VerificationError::NullifierSessionMismatch {
            expected: u(0),
            actual: u(9),
        }
    );
}

#[test]
fn test_link_group_pairing() {
    let s = Scenario::new();
    let grouped = v3_query(V3QueryFields {
        group_id: 4,
        ..V3QueryFields::default()
    });

    let err = s.verify(V3, &s.v3_signals(), &grouped).unwrap_err();
    assert_eq!(
        err,
        VerificationError::InvalidLinkGroup {
            group_id: 4,
            link_id: u(0),
        }
    );

    let linked = s.v3_signals().with(names::LINK_ID, u(0x11AC));
    s.verify(V3, &linked, &grouped).expect("grouped and linked");

    let err = s
        .verify(V3, &linked, &Scenario::query(V3))
        .unwrap_err();
    assert!(matches!(err, VerificationError::InvalidLinkGroup { group_id: 0, .. }));
}

#[test]
fn test_proof_type_binding() {
    let s = Scenario::new();
    let query = v3_query(V3QueryFields {
        proof_type: 2,
        ..V3QueryFields::default()
    });

    let err = s.verify(V3, &s.v3_signals(), &query).unwrap_err();
    assert_eq!(
        err,
        VerificationError::ProofTypeMismatch {
            expected: 2,
            actual: u(1),
        }
    );

    let signals = s.v3_signals().with(names::PROOF_TYPE, u(2));
    s.verify(V3, &signals, &query).expect("proof type matches");
}

#[test]
fn test_v3_fields_rejected_for_common_circuit() {
    let s = Scenario::new();
    let query = AtomicQuery {
        v3: V3QueryFields {
            group_id: 1,
            ..V3QueryFields::default()
        },
        ..Scenario::query(MTP_V2)
    };
    let err = s.verify(MTP_V2, &s.common_signals(), &query).unwrap_err();
    assert!(matches!(err, VerificationError::MalformedQuery(_)));
}

#[test]
fn test_common_checks_run_before_v3_bindings() {
    let s = Scenario::new();
    let signals = s
        .v3_signals()
        .with(names::GIST_ROOT, u(0xBAD))
        .with(names::CHALLENGE, address_to_le_signal(other_caller()));
    let err = s
        .verify(V3, &signals, &Scenario::query(V3))
        .unwrap_err();
    assert_eq!(err, VerificationError::UnknownGistRoot { root: u(0xBAD) });
}
