//! Property-Based Tests for Time-Window Rules
//!
//! Uses proptest for property-based testing with arbitrary inputs.

use boundcred_core::{NumericDate, PublicClaims, TimeWindow, TimeWindowOutcome};
use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

fn now() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

fn at(offset_secs: i64) -> NumericDate {
    NumericDate::from_datetime(now() + Duration::seconds(offset_secs))
}

proptest! {
    /// Expiry more than `leeway` in the past is always `Expired`
    #[test]
    fn prop_expiry_respects_leeway(
        leeway_secs in 0i64..3600,
        exp_offset in -10_000i64..10_000,
    ) {
        let claims = PublicClaims {
            expiry: Some(at(exp_offset)),
            ..Default::default()
        };
        let outcome = claims.validate_time_window(now(), Duration::seconds(leeway_secs));

        if exp_offset < -leeway_secs {
            prop_assert_eq!(outcome, TimeWindowOutcome::Expired);
        } else {
            prop_assert_eq!(outcome, TimeWindowOutcome::Ok);
        }
    }

    /// Not-before more than `leeway` in the future is always `NotYetValid`
    #[test]
    fn prop_not_before_respects_leeway(
        leeway_secs in 0i64..3600,
        nbf_offset in -10_000i64..10_000,
    ) {
        let claims = PublicClaims {
            not_before: Some(at(nbf_offset)),
            ..Default::default()
        };
        let outcome = claims.validate_time_window(now(), Duration::seconds(leeway_secs));

        if nbf_offset > leeway_secs {
            prop_assert_eq!(outcome, TimeWindowOutcome::NotYetValid);
        } else {
            prop_assert_eq!(outcome, TimeWindowOutcome::Ok);
        }
    }
}
