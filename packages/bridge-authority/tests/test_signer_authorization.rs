//! Signer Set Authorization Integration Tests.
//!
//! Drives the execute/query entry points through the owner-or-signers gate:
//! - Threshold changes with and without signatures
//! - Nonce burn on rejected attempts
//! - Prefix collisions and duplicate signatures
//! - Mode switching and ownership transfer

use alloy::primitives::Address;

use bridge_authority::msg::{ExecuteMsg, NonceResponse, QueryMsg, SignersResponse};
use bridge_authority::testing::{colliding_signers, Harness};
use bridge_authority::{query, AuthDomain, AuthorityError, ErrorKind, Event};

// ============================================================================
// Helpers
// ============================================================================

fn domain_nonce(harness: &Harness, domain: AuthDomain) -> u64 {
    let value = query(&harness.bridge, QueryMsg::Nonce { domain }).unwrap();
    let response: NonceResponse = serde_json::from_value(value).unwrap();
    response.nonce
}

fn outsider() -> Address {
    Address::repeat_byte(0x99)
}

// ============================================================================
// Threshold
// ============================================================================

#[test]
fn test_set_threshold_requires_signature() {
    let mut harness = Harness::new(1, 1, true);
    let domain = AuthDomain::SetThreshold { threshold: 2 };

    let err = harness
        .execute(
            outsider(),
            ExecuteMsg::SetThreshold {
                threshold: 2,
                signatures: vec![],
            },
        )
        .unwrap_err();
    assert_eq!(
        err,
        AuthorityError::InsufficientSignatures {
            got: 0,
            required: 1
        }
    );
    assert_eq!(err.kind(), ErrorKind::AuthorizationFailure);
    assert_eq!(harness.bridge.signers().threshold(), 1);

    // Anyone may submit once a signer has signed the current pre-image
    let signatures = harness.sign_domain(&domain, 1);
    let response = harness
        .execute(
            outsider(),
            ExecuteMsg::SetThreshold {
                threshold: 2,
                signatures,
            },
        )
        .unwrap();

    assert_eq!(response.method(), Some("set_threshold"));
    assert_eq!(
        response.events,
        vec![Event::ThresholdChanged {
            previous: 1,
            threshold: 2
        }]
    );
    assert_eq!(harness.bridge.signers().threshold(), 2);
}

#[test]
fn test_zero_threshold_rejected_without_burning_nonce() {
    let mut harness = Harness::new(1, 1, true);
    let domain = AuthDomain::SetThreshold { threshold: 0 };
    let signatures = harness.sign_domain(&domain, 1);

    let err = harness
        .execute(
            outsider(),
            ExecuteMsg::SetThreshold {
                threshold: 0,
                signatures,
            },
        )
        .unwrap_err();
    assert_eq!(err, AuthorityError::ZeroThreshold);
    assert_eq!(err.kind(), ErrorKind::PreconditionViolation);
    assert_eq!(domain_nonce(&harness, domain), 0);
}

// ============================================================================
// Nonces
// ============================================================================

#[test]
fn test_nonce_increases_on_every_attempt() {
    let mut harness = Harness::new(2, 2, true);
    let domain = AuthDomain::SetThreshold { threshold: 1 };

    for expected in 1..=3u64 {
        harness
            .execute(
                outsider(),
                ExecuteMsg::SetThreshold {
                    threshold: 1,
                    signatures: vec![],
                },
            )
            .unwrap_err();
        assert_eq!(domain_nonce(&harness, domain.clone()), expected);
    }

    // Signatures prepared before the burn no longer verify
    let stale = harness.sign_domain(&domain, 2);
    harness
        .execute(
            outsider(),
            ExecuteMsg::SetThreshold {
                threshold: 1,
                signatures: vec![],
            },
        )
        .unwrap_err();
    let err = harness
        .execute(
            outsider(),
            ExecuteMsg::SetThreshold {
                threshold: 1,
                signatures: stale,
            },
        )
        .unwrap_err();
    assert!(matches!(err, AuthorityError::UnknownSigner { .. }));
    assert_eq!(domain_nonce(&harness, domain.clone()), 5);

    let fresh = harness.sign_domain(&domain, 2);
    harness
        .execute(
            outsider(),
            ExecuteMsg::SetThreshold {
                threshold: 1,
                signatures: fresh,
            },
        )
        .unwrap();
    assert_eq!(domain_nonce(&harness, domain), 6);
}

#[test]
fn test_domains_have_independent_nonces() {
    let mut harness = Harness::new(1, 1, true);
    let signatures = harness.sign_domain(&AuthDomain::Pause, 1);
    harness
        .execute(outsider(), ExecuteMsg::Pause { signatures })
        .unwrap();

    assert_eq!(domain_nonce(&harness, AuthDomain::Pause), 1);
    assert_eq!(domain_nonce(&harness, AuthDomain::Unpause), 0);
    assert_eq!(
        domain_nonce(&harness, AuthDomain::SetThreshold { threshold: 1 }),
        0
    );
}

#[test]
fn test_signature_for_other_parameters_rejected() {
    let mut harness = Harness::new(1, 1, true);
    let signatures = harness.sign_domain(&AuthDomain::SetThreshold { threshold: 3 }, 1);

    let err = harness
        .execute(
            outsider(),
            ExecuteMsg::SetThreshold {
                threshold: 2,
                signatures,
            },
        )
        .unwrap_err();
    assert!(matches!(err, AuthorityError::UnknownSigner { .. }));
}

// ============================================================================
// Roster
// ============================================================================

#[test]
fn test_prefix_collision_rejected_on_add() {
    let (first, second) = colliding_signers();
    let mut harness = Harness::new(0, 1, false);
    let owner = harness.owner;

    harness
        .execute(
            owner,
            ExecuteMsg::AddSigners {
                signers: vec![first.address()],
                signatures: vec![],
            },
        )
        .unwrap();

    let err = harness
        .execute(
            owner,
            ExecuteMsg::AddSigners {
                signers: vec![second.address()],
                signatures: vec![],
            },
        )
        .unwrap_err();
    assert!(matches!(err, AuthorityError::SignerPrefixCollision { .. }));
    assert_eq!(err.kind(), ErrorKind::PreconditionViolation);
    assert!(!harness.bridge.signers().is_signer(&second.address()));
}

#[test]
fn test_duplicate_signatures_do_not_count_twice() {
    let mut harness = Harness::new(2, 2, true);
    let domain = AuthDomain::SetThreshold { threshold: 1 };
    let one = harness.sign_domain(&domain, 1);
    let signatures = vec![one[0].clone(), one[0].clone()];

    let err = harness
        .execute(
            outsider(),
            ExecuteMsg::SetThreshold {
                threshold: 1,
                signatures,
            },
        )
        .unwrap_err();
    assert!(matches!(err, AuthorityError::DuplicateSigner { .. }));
}

#[test]
fn test_signature_order_is_irrelevant() {
    let mut harness = Harness::new(3, 2, true);
    let domain = AuthDomain::SetThreshold { threshold: 3 };
    let mut signatures = harness.sign_domain(&domain, 3);
    signatures.reverse();

    harness
        .execute(
            outsider(),
            ExecuteMsg::SetThreshold {
                threshold: 3,
                signatures,
            },
        )
        .unwrap();
    assert_eq!(harness.bridge.signers().threshold(), 3);
}

#[test]
fn test_remove_signers_below_threshold_locks_signatures() {
    let mut harness = Harness::new(2, 2, true);
    let removed = harness.signers[1].address();
    let domain = AuthDomain::RemoveSigners {
        signers: vec![removed],
    };
    let signatures = harness.sign_domain(&domain, 2);

    let response = harness
        .execute(
            outsider(),
            ExecuteMsg::RemoveSigners {
                signers: vec![removed],
                signatures,
            },
        )
        .unwrap();
    assert_eq!(
        response.events,
        vec![Event::SignersRemoved {
            signers: vec![removed]
        }]
    );

    let value = query(&harness.bridge, QueryMsg::Signers {}).unwrap();
    let signers: SignersResponse = serde_json::from_value(value).unwrap();
    assert_eq!(signers.signers, vec![harness.signers[0].address()]);
    assert_eq!(signers.threshold, 2);

    // One remaining signer can never reach a threshold of two
    let signatures = harness.sign_domain(&AuthDomain::SetThreshold { threshold: 1 }, 1);
    assert!(harness
        .execute(
            outsider(),
            ExecuteMsg::SetThreshold {
                threshold: 1,
                signatures,
            },
        )
        .is_err());
}

// ============================================================================
// Mode & Ownership
// ============================================================================

#[test]
fn test_owner_mode_ignores_signatures() {
    let mut harness = Harness::new(1, 1, false);
    let signatures = harness.sign_domain(&AuthDomain::SetThreshold { threshold: 2 }, 1);

    let err = harness
        .execute(
            outsider(),
            ExecuteMsg::SetThreshold {
                threshold: 2,
                signatures,
            },
        )
        .unwrap_err();
    assert_eq!(err, AuthorityError::Unauthorized { caller: outsider() });

    let owner = harness.owner;
    harness
        .execute(
            owner,
            ExecuteMsg::SetThreshold {
                threshold: 2,
                signatures: vec![],
            },
        )
        .unwrap();
}

#[test]
fn test_toggle_mode_and_transfer_ownership() {
    let mut harness = Harness::new(1, 1, true);
    let new_owner = Address::repeat_byte(0x0b);

    let signatures = harness.sign_domain(&AuthDomain::TransferOwnership { new_owner }, 1);
    harness
        .execute(
            outsider(),
            ExecuteMsg::TransferOwnership {
                new_owner,
                signatures,
            },
        )
        .unwrap();
    assert_eq!(harness.bridge.signers().owner(), new_owner);

    let signatures = harness.sign_domain(&AuthDomain::ToggleMode { mode: false }, 1);
    let response = harness
        .execute(
            outsider(),
            ExecuteMsg::ToggleMode {
                signers_mode: false,
                signatures,
            },
        )
        .unwrap();
    assert_eq!(
        response.events,
        vec![Event::ModeToggled {
            signers_mode: false
        }]
    );

    // The new owner now acts alone
    harness
        .execute(
            new_owner,
            ExecuteMsg::SetThreshold {
                threshold: 5,
                signatures: vec![],
            },
        )
        .unwrap();
    assert_eq!(harness.bridge.signers().threshold(), 5);
}
