//! Rejection types for bound token validation

use thiserror::Error;

use crate::claims::ObjectKind;

/// Result type alias using ValidationError
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Errors reported by the backing object store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No object with that name exists in the namespace
    #[error("{kind} \"{name}\" not found")]
    NotFound {
        kind: ObjectKind,
        namespace: String,
        name: String,
    },

    /// The store could not answer
    #[error("object store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn not_found(kind: ObjectKind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        StoreError::NotFound {
            kind,
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Why a bound token was rejected
///
/// The set is closed. Account failures are reported with the names already
/// known to the token holder. Secret and pod binding failures all collapse
/// onto [`ValidationError::TokenInvalidated`], and unexpected claim-library
/// states onto [`ValidationError::UnexpectedValidationError`]; their detail
/// only goes to the logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("service account token has expired")]
    Expired,

    #[error("service account token is not valid yet")]
    NotYetValid,

    /// An identity expectation failed; the detail is safe to return
    #[error("service account token claims could not be validated: {0}")]
    ClaimValidationFailed(String),

    #[error("service account token claims could not be validated due to unexpected validation error")]
    UnexpectedValidationError,

    /// Account lookup failed; the store error is passed through as-is
    #[error(transparent)]
    AccountLookupFailed(StoreError),

    #[error("service account {namespace}/{name} has been deleted")]
    AccountDeleted { namespace: String, name: String },

    #[error("service account UID ({actual}) does not match claim ({claimed})")]
    AccountUidMismatch { actual: String, claimed: String },

    #[error("service account token has been invalidated")]
    TokenInvalidated,
}

impl ValidationError {
    /// Check if this rejection carries no detail about its cause
    pub fn is_opaque(&self) -> bool {
        matches!(
            self,
            ValidationError::UnexpectedValidationError | ValidationError::TokenInvalidated
        )
    }

    /// Check if this rejection came from the token's time window
    pub fn is_time_window(&self) -> bool {
        matches!(self, ValidationError::Expired | ValidationError::NotYetValid)
    }

    /// Check if this rejection came from the account binding
    pub fn is_account_binding(&self) -> bool {
        matches!(
            self,
            ValidationError::AccountLookupFailed(_)
                | ValidationError::AccountDeleted { .. }
                | ValidationError::AccountUidMismatch { .. }
        )
    }
}

impl From<StoreError> for ValidationError {
    fn from(err: StoreError) -> Self {
        ValidationError::AccountLookupFailed(err)
    }
}
