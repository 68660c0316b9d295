//! Bound token validator
//!
//! Confirms that the objects a token is bound to still exist, under the
//! same uid, and were not deleted more than a leeway ago.

use boundcred_core::{
    default_leeway, Clock, ObjectKind, ObjectRef, PrivateClaims, Result, StoreError, SystemClock,
    TimeWindow, TimeWindowOutcome, ValidationError,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

use crate::config::{ValidatorConfig, MAX_LEEWAY_SECS};
use crate::store::{BoundObject, ObjectGetter};

/// Identity confirmed against the backing store
///
/// Downstream authorization must use this, never the raw claims.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub namespace: String,
    pub account_name: String,
    pub account_uid: String,
    /// Empty unless the token was bound to a pod
    pub instance_name: String,
    /// Empty unless the token was bound to a pod
    pub instance_uid: String,
}

impl ValidationResult {
    /// Username of the service account, `system:serviceaccount:<ns>:<name>`
    pub fn username(&self) -> String {
        format!("system:serviceaccount:{}:{}", self.namespace, self.account_name)
    }

    /// Groups every service account in the namespace belongs to
    pub fn groups(&self) -> Vec<String> {
        vec![
            "system:serviceaccounts".to_string(),
            format!("system:serviceaccounts:{}", self.namespace),
        ]
    }

    /// Check if the token was bound to a pod
    pub fn has_instance(&self) -> bool {
        !self.instance_name.is_empty()
    }
}

/// Validator for bound service account tokens
///
/// Stateless apart from its injected store and clock; share it behind an
/// `Arc` and call [`BoundValidator::validate`] concurrently.
pub struct BoundValidator {
    getter: Arc<dyn ObjectGetter>,
    clock: Arc<dyn Clock>,
    leeway: Duration,
}

impl BoundValidator {
    /// Create a validator over a store, using the wall clock and default leeway
    pub fn new<G: ObjectGetter + 'static>(getter: G) -> Self {
        Self {
            getter: Arc::new(getter),
            clock: Arc::new(SystemClock),
            leeway: default_leeway(),
        }
    }

    /// Create a validator from configuration
    pub fn from_config<G: ObjectGetter + 'static>(getter: G, config: &ValidatorConfig) -> Self {
        Self::new(getter).with_leeway(config.leeway())
    }

    /// Replace the clock
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Replace the leeway used for both expiry and deletion grace
    ///
    /// Clamped to `0..=MAX_LEEWAY_SECS` seconds.
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway.clamp(Duration::zero(), Duration::seconds(MAX_LEEWAY_SECS as i64));
        self
    }

    pub fn leeway(&self) -> Duration {
        self.leeway
    }

    /// Empty private claims for the token layer to fill in while parsing
    pub fn new_private_claims(&self) -> PrivateClaims {
        PrivateClaims::default()
    }

    /// Validate a parsed token against the current time and store state
    ///
    /// Checks run in a fixed order and the first failure ends the call:
    /// time window, account, secret (if bound), pod (if bound).
    pub async fn validate<C>(&self, public: &C, private: &PrivateClaims) -> Result<ValidationResult>
    where
        C: TimeWindow + ?Sized,
    {
        let now = self.clock.now();
        check_time_window(public.validate_time_window(now, self.leeway))?;

        // consider things deleted prior to now-leeway to be invalid
        let Some(invalid_if_deleted_before) = now.checked_sub_signed(self.leeway) else {
            error!(now = %now, leeway = ?self.leeway, "Deletion grace cutoff is out of range");
            return Err(ValidationError::UnexpectedValidationError);
        };
        let namespace = private.namespace.as_str();
        let account = &private.account;

        let found = self
            .getter
            .get_account(namespace, &account.name)
            .await
            .inspect_err(|e| {
                debug!(namespace = %namespace, name = %account.name, error = %e, "Could not retrieve service account");
            })?;
        check_account(namespace, account, &found, invalid_if_deleted_before)?;

        if let Some(ref secret) = private.secret {
            let found = self.getter.get_secret(namespace, &secret.name).await;
            check_binding(ObjectKind::Secret, namespace, account, secret, found, invalid_if_deleted_before)?;
        }

        let mut result = ValidationResult {
            namespace: private.namespace.clone(),
            account_name: account.name.clone(),
            account_uid: account.uid.clone(),
            ..Default::default()
        };

        if let Some(ref instance) = private.instance {
            let found = self.getter.get_instance(namespace, &instance.name).await;
            check_binding(ObjectKind::Instance, namespace, account, instance, found, invalid_if_deleted_before)?;
            result.instance_name = instance.name.clone();
            result.instance_uid = instance.uid.clone();
        }

        Ok(result)
    }
}

impl std::fmt::Debug for BoundValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundValidator")
            .field("getter", &self.getter.description())
            .field("leeway", &self.leeway)
            .finish()
    }
}

fn check_time_window(outcome: TimeWindowOutcome) -> Result<()> {
    match outcome {
        TimeWindowOutcome::Ok => Ok(()),
        TimeWindowOutcome::Expired => Err(ValidationError::Expired),
        TimeWindowOutcome::NotYetValid => Err(ValidationError::NotYetValid),
        // only time is expected, so identity mismatches point at a misconfiguration
        TimeWindowOutcome::StructurallyInvalid(mismatch) => {
            error!(error = %mismatch, "Service account token claim validation got unexpected validation failure");
            Err(ValidationError::ClaimValidationFailed(mismatch.to_string()))
        }
        TimeWindowOutcome::Unknown(detail) => {
            error!(error = %detail, "Service account token claim validation got unexpected error");
            Err(ValidationError::UnexpectedValidationError)
        }
    }
}

fn check_account(
    namespace: &str,
    claimed: &ObjectRef,
    found: &BoundObject,
    invalid_if_deleted_before: DateTime<Utc>,
) -> Result<()> {
    if found.deleted_before(invalid_if_deleted_before) {
        debug!(namespace = %namespace, name = %claimed.name, "Service account has been deleted");
        return Err(ValidationError::AccountDeleted {
            namespace: namespace.to_string(),
            name: claimed.name.clone(),
        });
    }

    if found.uid != claimed.uid {
        debug!(
            namespace = %namespace,
            name = %claimed.name,
            actual = %found.uid,
            claimed = %claimed.uid,
            "Service account UID no longer matches"
        );
        return Err(ValidationError::AccountUidMismatch {
            actual: found.uid.clone(),
            claimed: claimed.uid.clone(),
        });
    }

    Ok(())
}

/// Check a secret or pod binding
///
/// Every failure maps to `TokenInvalidated`; the cause is only logged.
fn check_binding(
    kind: ObjectKind,
    namespace: &str,
    account: &ObjectRef,
    claimed: &ObjectRef,
    found: std::result::Result<BoundObject, StoreError>,
    invalid_if_deleted_before: DateTime<Utc>,
) -> Result<()> {
    let found = match found {
        Ok(found) => found,
        Err(e) => {
            debug!(
                %kind,
                namespace = %namespace,
                name = %claimed.name,
                account = %account.name,
                error = %e,
                "Could not retrieve bound object"
            );
            return Err(ValidationError::TokenInvalidated);
        }
    };

    if found.deleted_before(invalid_if_deleted_before) {
        debug!(
            %kind,
            namespace = %namespace,
            name = %claimed.name,
            account = %account.name,
            "Bound object is deleted and awaiting removal"
        );
        return Err(ValidationError::TokenInvalidated);
    }

    if found.uid != claimed.uid {
        debug!(
            %kind,
            namespace = %namespace,
            name = %claimed.name,
            actual = %found.uid,
            claimed = %claimed.uid,
            "Bound object UID no longer matches"
        );
        return Err(ValidationError::TokenInvalidated);
    }

    Ok(())
}
