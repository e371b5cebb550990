//! Integration test: properties that hold across generated inputs.
//!
//! Check ordering, expiration boundaries, allow-list semantics and
//! determinism, exercised through the full engine.

use proptest::prelude::*;

use vigil_core::VerifierConfig;
use vigil_integration_tests::{u, Scenario, GIST_PUBLISHED_AT, MTP_V2, NOW, QUERY_HASH, V3};
use vigil_verifier::signals::names;
use vigil_verifier::VerificationError;

fn config_with(proof: u64, gist: u64, revocation: u64) -> VerifierConfig {
    VerifierConfig {
        proof_expiration_secs: proof,
        gist_root_expiration_secs: gist,
        revocation_state_expiration_secs: revocation,
        ..VerifierConfig::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A wrong query hash is reported before any other failure.
    #[test]
    fn test_query_hash_mismatch_takes_precedence(
        hash in any::<u64>().prop_filter("must differ", |h| *h != QUERY_HASH),
        gist_root in any::<u64>(),
        issuer_state in any::<u64>(),
        timestamp in any::<u64>(),
        merklized in 0u64..3,
    ) {
        let s = Scenario::new();
        let signals = s
            .v3_signals()
            .with(names::CIRCUIT_QUERY_HASH, u(hash))
            .with(names::GIST_ROOT, u(gist_root))
            .with(names::ISSUER_STATE, u(issuer_state))
            .with(names::TIMESTAMP, u(timestamp))
            .with(names::MERKLIZED, u(merklized));
        let err = s.verify(V3, &signals, &Scenario::query(V3)).unwrap_err();
        prop_assert_eq!(
            err,
            VerificationError::QueryHashMismatch {
                proven: u(hash),
                declared: u(QUERY_HASH),
            }
        );
    }

    /// A proof is accepted exactly while its age is within the timeout.
    #[test]
    fn test_proof_age_boundary(timeout in 1u64..100_000, age in 0u64..200_000) {
        let s = Scenario::with_config(config_with(timeout, 3600, 3600));
        let signals = s.common_signals().with(names::TIMESTAMP, u(NOW - age));
        let result = s.verify(MTP_V2, &signals, &Scenario::query(MTP_V2));
        if age <= timeout {
            prop_assert!(result.is_ok(), "age {} timeout {}: {:?}", age, timeout, result);
        } else {
            let is_expired = matches!(result, Err(VerificationError::ProofExpired { .. }));
            prop_assert!(is_expired, "{:?}", result);
        }
    }

    /// A superseded GIST root is accepted exactly while its staleness is
    /// within the timeout.
    #[test]
    fn test_gist_root_staleness_boundary(timeout in 0u64..10_000, staleness in 0u64..20_000) {
        let s = Scenario::with_config(config_with(u64::MAX / 2, timeout, 3600));
        let superseded_at = GIST_PUBLISHED_AT + 1;
        s.ledger.publish_gist_root(u(0x6157_0000_0002), superseded_at).unwrap();

        let now = superseded_at + staleness;
        let signals = s.common_signals().with(names::TIMESTAMP, u(now));
        let result = s.verify_at(MTP_V2, &signals, &Scenario::query(MTP_V2), now);
        if staleness <= timeout {
            prop_assert!(result.is_ok(), "{:?}", result);
        } else {
            let is_expired = matches!(result, Err(VerificationError::ExpiredGistRoot { .. }));
            prop_assert!(is_expired, "{:?}", result);
        }
    }

    /// A superseded non-revocation state is accepted exactly while its
    /// staleness is within the timeout.
    #[test]
    fn test_revocation_state_staleness_boundary(timeout in 0u64..10_000, staleness in 0u64..20_000) {
        let s = Scenario::with_config(config_with(u64::MAX / 2, u64::MAX / 2, timeout));
        let superseded_at = NOW;
        s.ledger
            .transit_state(s.issuer, s.issuer_state, u(0x1550_0000_0003), superseded_at)
            .unwrap();

        let now = superseded_at + staleness;
        let signals = s.common_signals().with(names::TIMESTAMP, u(now));
        let result = s.verify_at(MTP_V2, &signals, &Scenario::query(MTP_V2), now);
        if staleness <= timeout {
            prop_assert!(result.is_ok(), "{:?}", result);
        } else {
            let is_expired =
                matches!(result, Err(VerificationError::ExpiredRevocationState { .. }));
            prop_assert!(is_expired, "{:?}", result);
        }
    }

    /// An empty allow-list admits every issuer; a non-empty one admits
    /// only its members.
    #[test]
    fn test_allow_list_membership(
        others in prop::collection::vec(1u64..1_000_000, 0..6),
        include_issuer in any::<bool>(),
    ) {
        let s = Scenario::new();
        let mut query = Scenario::query(MTP_V2);
        query.allowed_issuers = others.iter().map(|v| u(*v)).collect();
        if include_issuer {
            query.allowed_issuers.push(s.issuer);
        }
        let result = s.verify(MTP_V2, &s.common_signals(), &query);
        if others.is_empty() || include_issuer {
            prop_assert!(result.is_ok(), "{:?}", result);
        } else {
            prop_assert_eq!(
                result.unwrap_err(),
                VerificationError::IssuerNotAllowed { issuer: s.issuer }
            );
        }
    }

    /// The same request against the same snapshot always gets the same
    /// verdict, accepted or not.
    #[test]
    fn test_verification_is_deterministic(
        age in 0u64..10_000,
        link_id in 0u64..3,
        bjj in 0u64..3,
    ) {
        let s = Scenario::new();
        let signals = s
            .v3_signals()
            .with(names::TIMESTAMP, u(NOW - age))
            .with(names::LINK_ID, u(link_id))
            .with(names::IS_BJJ_AUTH_ENABLED, u(bjj));
        let request = s.request(V3, &signals, &Scenario::query(V3));
        let snapshot = s.ledger.snapshot(NOW);
        let first = s.engine.verify(&request, &snapshot);
        let second = s.engine.verify(&request, &snapshot);
        prop_assert_eq!(first, second);
    }
}
