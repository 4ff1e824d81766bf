//! Property-Based Tests for Lease Invariants
//!
//! These tests verify that the lease state machine holds for arbitrary inputs:
//! 1. STABILITY: renewal never changes the secret (token, lease id, scope)
//! 2. FINALITY: a revoked lease never renews again
//! 3. BOUNDS: renewal never pushes expiry past the maximum TTL
//!
//! Uses proptest for property-based testing with arbitrary inputs.

use chrono::{Duration, Utc};
use proptest::prelude::*;
use tfsecrets_core::{
    EngineError, IssuedSecret, LeaseId, LeaseRecord, LeaseState, Role, RoleKind, RoleScope,
};

fn issued(token: &str, scope: RoleScope) -> IssuedSecret {
    IssuedSecret {
        lease_id: LeaseId::generate(),
        token: token.to_string(),
        token_id: Some(format!("at-{}", token)),
        role: "prop-role".into(),
        scope,
        issued_at: Utc::now(),
    }
}

fn scope_strategy() -> impl Strategy<Value = RoleScope> {
    prop_oneof![
        "[a-z][a-z0-9-]{2,15}".prop_map(|organization| RoleScope::Organization { organization }),
        ("[a-z][a-z0-9-]{2,15}", "team-[A-Za-z0-9]{4,12}").prop_map(|(organization, team_id)| {
            RoleScope::Team {
                organization,
                team_id,
            }
        }),
    ]
}

// =============================================================================
// INVARIANT 1: STABILITY - renewal never rotates the secret
// =============================================================================

proptest! {
    /// Any sequence of renewals leaves the secret untouched
    #[test]
    fn prop_renew_never_rotates_secret(
        token in "[A-Za-z0-9.]{8,64}",
        scope in scope_strategy(),
        ttl in 1u64..3_600,
        steps in prop::collection::vec(0i64..30, 1..20),
    ) {
        let secret = issued(&token, scope);
        let mut lease = LeaseRecord::new(secret.clone(), ttl, 10 * 86_400);

        let mut now = secret.issued_at;
        for step in steps {
            now += Duration::seconds(step.min(ttl as i64));
            let before = lease.expires_at;
            lease.renew(now).expect("renewal within ttl should succeed");

            prop_assert_eq!(&lease.secret, &secret);
            prop_assert_eq!(&lease.secret.token, &secret.token);
            prop_assert_eq!(lease.secret.lease_id, secret.lease_id);
            prop_assert!(lease.expires_at >= now);
            prop_assert!(lease.expires_at >= before || lease.expires_at == lease.max_expires_at);
        }
    }

    /// Renewal expiry is always within [now, max_expires_at]
    #[test]
    fn prop_renew_bounded_by_max_ttl(
        ttl in 1u64..7_200,
        max_ttl in 1u64..7_200,
        offset in 0i64..7_200,
    ) {
        let secret = issued("tfc-bounded", RoleScope::Organization { organization: "acme".into() });
        let mut lease = LeaseRecord::new(secret.clone(), ttl, max_ttl);
        let now = secret.issued_at + Duration::seconds(offset);

        match lease.renew(now) {
            Ok(expires_at) => {
                prop_assert!(expires_at <= lease.max_expires_at);
                prop_assert!(expires_at >= now);
            }
            Err(EngineError::LeaseExpired(_)) => {
                prop_assert!(now >= lease.max_expires_at);
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }
}

// =============================================================================
// INVARIANT 2: FINALITY - revoked is terminal
// =============================================================================

proptest! {
    /// Once revoked, any number of further revokes are no-ops and renew fails
    #[test]
    fn prop_revoke_is_terminal(
        renewals_before in 0usize..5,
        revokes_after in 1usize..5,
    ) {
        let secret = issued("tfc-terminal", RoleScope::Organization { organization: "acme".into() });
        let mut lease = LeaseRecord::new(secret.clone(), 3_600, 86_400);
        let now = secret.issued_at;

        for _ in 0..renewals_before {
            lease.renew(now).unwrap();
        }

        prop_assert!(lease.revoke(now));
        for _ in 0..revokes_after {
            prop_assert!(!lease.revoke(now));
            prop_assert_eq!(lease.state, LeaseState::Revoked);
        }

        let is_already_revoked = matches!(lease.renew(now), Err(EngineError::AlreadyRevoked(_)));
        prop_assert!(is_already_revoked);
        prop_assert_eq!(&lease.secret, &secret);
    }
}

// =============================================================================
// Role round-trip
// =============================================================================

proptest! {
    /// Roles built from request fields keep exactly the supplied fields
    #[test]
    fn prop_role_fields_round_trip(
        name in "[a-z][a-z0-9-]{0,30}",
        organization in "[a-z][a-z0-9-]{2,15}",
        team_id in prop::option::of("team-[A-Za-z0-9]{4,12}"),
    ) {
        let scope = RoleScope::from_parts(None, Some(organization.clone()), team_id.clone()).unwrap();
        let role = Role::new(name.clone(), scope).unwrap();

        let json = serde_json::to_string(&role).unwrap();
        let back: Role = serde_json::from_str(&json).unwrap();

        prop_assert_eq!(&back, &role);
        prop_assert_eq!(back.name, name);
        prop_assert_eq!(back.scope.organization(), organization.as_str());
        prop_assert_eq!(back.scope.team_id().map(str::to_string), team_id.clone());
        let expected_kind = if team_id.is_some() { RoleKind::Team } else { RoleKind::Organization };
        prop_assert_eq!(back.scope.kind(), expected_kind);
    }
}
