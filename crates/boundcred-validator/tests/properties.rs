//! Property-Based Tests for Bound Validation
//!
//! These tests check the validator's decision rules for arbitrary inputs:
//! 1. Live, matching objects always produce the claimed identity
//! 2. The deletion grace window is inclusive at `now - leeway`
//! 3. Secret and pod failures always collapse onto one rejection
//!
//! Uses proptest for property-based testing with arbitrary inputs.

use boundcred_core::{
    FixedClock, NumericDate, ObjectKind, ObjectRef, PrivateClaims, PublicClaims, ValidationError,
};
use boundcred_validator::{BoundObject, BoundValidator, MemoryStore, ValidationResult};
use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use std::sync::Arc;

fn now() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

fn live_window() -> PublicClaims {
    PublicClaims {
        expiry: Some(NumericDate::from_datetime(now() + Duration::hours(1))),
        ..Default::default()
    }
}

fn run<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime")
        .block_on(future)
}

/// Ways a secret or pod binding can fail
#[derive(Debug, Clone, Copy)]
enum BindingFailure {
    Missing,
    DeletedPastGrace,
    Recreated,
}

fn binding_failure() -> impl Strategy<Value = BindingFailure> {
    prop_oneof![
        Just(BindingFailure::Missing),
        Just(BindingFailure::DeletedPastGrace),
        Just(BindingFailure::Recreated),
    ]
}

fn store_binding(store: &MemoryStore, kind: ObjectKind, name: &str, uid: &str, failure: BindingFailure, leeway: Duration) {
    match failure {
        BindingFailure::Missing => {}
        BindingFailure::DeletedPastGrace => store.insert(
            kind,
            "ns",
            name,
            BoundObject::new(uid).with_deletion_timestamp(now() - leeway - Duration::seconds(1)),
        ),
        BindingFailure::Recreated => store.insert(kind, "ns", name, BoundObject::new(format!("{}-new", uid))),
    }
}

proptest! {
    /// Live, identity-matching objects produce exactly the claimed identity
    #[test]
    fn prop_live_bindings_produce_claimed_identity(
        namespace in "[a-z]{1,12}",
        account in "[a-z]{1,12}",
        account_uid in "[a-f0-9]{8}",
        pod in proptest::option::of(("[a-z]{1,12}", "[a-f0-9]{8}")),
    ) {
        let store = Arc::new(MemoryStore::new());
        store.insert_account(&namespace, &account, BoundObject::new(account_uid.clone()));

        let mut claims = PrivateClaims::new(namespace.clone(), ObjectRef::new(account.clone(), account_uid.clone()));
        if let Some((ref name, ref uid)) = pod {
            store.insert_instance(&namespace, name, BoundObject::new(uid.clone()));
            claims = claims.with_instance(ObjectRef::new(name.clone(), uid.clone()));
        }

        let validator = BoundValidator::new(store).with_clock(FixedClock(now()));
        let result = run(validator.validate(&live_window(), &claims)).unwrap();

        let (instance_name, instance_uid) = pod.unwrap_or_default();
        prop_assert_eq!(result, ValidationResult {
            namespace,
            account_name: account,
            account_uid,
            instance_name,
            instance_uid,
        });
    }

    /// Deletion at or after `now - leeway` is tolerated, strictly before is not
    #[test]
    fn prop_account_grace_window(
        leeway_secs in 0i64..600,
        offset_secs in -1200i64..1200,
    ) {
        let leeway = Duration::seconds(leeway_secs);
        let deleted_at = now() + Duration::seconds(offset_secs);

        let store = Arc::new(MemoryStore::new());
        store.insert_account("ns", "sa", BoundObject::new("u1").with_deletion_timestamp(deleted_at));
        let validator = BoundValidator::new(store)
            .with_clock(FixedClock(now()))
            .with_leeway(leeway);

        let claims = PrivateClaims::new("ns", ObjectRef::new("sa", "u1"));
        let result = run(validator.validate(&live_window(), &claims));

        if deleted_at < now() - leeway {
            prop_assert_eq!(result.unwrap_err(), ValidationError::AccountDeleted {
                namespace: "ns".into(),
                name: "sa".into(),
            });
        } else {
            prop_assert!(result.is_ok());
        }
    }

    /// Any uid other than the claimed one is a mismatch
    #[test]
    fn prop_account_uid_mismatch(
        claimed in "[a-f0-9]{8}",
        actual in "[a-f0-9]{8}",
    ) {
        prop_assume!(claimed != actual);

        let store = Arc::new(MemoryStore::new());
        store.insert_account("ns", "sa", BoundObject::new(actual.clone()));
        let validator = BoundValidator::new(store).with_clock(FixedClock(now()));

        let claims = PrivateClaims::new("ns", ObjectRef::new("sa", claimed.clone()));
        let err = run(validator.validate(&live_window(), &claims)).unwrap_err();

        prop_assert_eq!(err, ValidationError::AccountUidMismatch { actual, claimed });
    }

    /// Every secret or pod binding failure is the same rejection
    #[test]
    fn prop_binding_failures_collapse(
        failure in binding_failure(),
        bind_secret in any::<bool>(),
        leeway_secs in 0i64..600,
    ) {
        let leeway = Duration::seconds(leeway_secs);
        let store = Arc::new(MemoryStore::new());
        store.insert_account("ns", "sa", BoundObject::new("u1"));

        let mut claims = PrivateClaims::new("ns", ObjectRef::new("sa", "u1"));
        if bind_secret {
            store_binding(&store, ObjectKind::Secret, "s1", "s-uid", failure, leeway);
            claims = claims.with_secret(ObjectRef::new("s1", "s-uid"));
        } else {
            store_binding(&store, ObjectKind::Instance, "pod1", "p1", failure, leeway);
            claims = claims.with_instance(ObjectRef::new("pod1", "p1"));
        }

        let validator = BoundValidator::new(store)
            .with_clock(FixedClock(now()))
            .with_leeway(leeway);
        let err = run(validator.validate(&live_window(), &claims)).unwrap_err();

        prop_assert_eq!(err, ValidationError::TokenInvalidated);
    }

    /// Expired tokens are rejected as expired whatever the store holds
    #[test]
    fn prop_expired_regardless_of_store(
        expired_for_secs in 61i64..100_000,
        account_present in any::<bool>(),
    ) {
        let store = Arc::new(MemoryStore::new());
        if account_present {
            store.insert_account("ns", "sa", BoundObject::new("other-uid"));
        }
        let validator = BoundValidator::new(store).with_clock(FixedClock(now()));

        let public = PublicClaims {
            expiry: Some(NumericDate::from_datetime(now() - Duration::seconds(expired_for_secs))),
            ..Default::default()
        };
        let claims = PrivateClaims::new("ns", ObjectRef::new("sa", "u1"));
        let err = run(validator.validate(&public, &claims)).unwrap_err();

        prop_assert_eq!(err, ValidationError::Expired);
    }
}
