//! Error types for token authentication and configuration

use boundcred_core::ValidationError;
use thiserror::Error;

/// Result type for token authentication
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors from authenticating a raw token
#[derive(Error, Debug)]
pub enum AuthError {
    /// Token could not be decoded
    #[error("Invalid token format: {0}")]
    InvalidFormat(String),

    /// Signature did not verify
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// Issuer or audience did not match the authenticator's expectations
    #[error("Invalid claim: {0}")]
    InvalidClaim(String),

    /// Token decoded but failed bound validation
    #[error(transparent)]
    Rejected(#[from] ValidationError),
}

impl AuthError {
    /// The bound validation rejection, if that is what failed
    pub fn rejection(&self) -> Option<&ValidationError> {
        match self {
            AuthError::Rejected(e) => Some(e),
            _ => None,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidKeyFormat => AuthError::InvalidSignature(err.to_string()),
            ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience | ErrorKind::InvalidSubject => {
                AuthError::InvalidClaim(err.to_string())
            }
            _ => AuthError::InvalidFormat(err.to_string()),
        }
    }
}

/// Errors from loading configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}
