//! JWT adapter
//!
//! Verifies the signature of a compact JWS with `jsonwebtoken`, decodes the
//! payload into [`TokenClaims`] and hands it to the [`BoundValidator`].
//! `exp` and `nbf` are deliberately not checked here; the bound validator
//! owns every time decision.

use boundcred_core::TokenClaims;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use tracing::debug;

use crate::error::{AuthError, Result};
use crate::validator::{BoundValidator, ValidationResult};

/// Authenticates raw bound tokens
pub struct TokenAuthenticator {
    validator: Arc<BoundValidator>,
    key: DecodingKey,
    validation: Validation,
}

impl TokenAuthenticator {
    /// Create an authenticator accepting tokens signed with `key` using `algorithm`
    pub fn new(validator: Arc<BoundValidator>, key: DecodingKey, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            validator,
            key,
            validation,
        }
    }

    /// Require a specific issuer
    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.validation.set_issuer(&[issuer]);
        self
    }

    /// Require a specific audience
    pub fn with_audience(mut self, audience: &str) -> Self {
        self.validation.set_audience(&[audience]);
        self.validation.validate_aud = true;
        self
    }

    /// Verify the signature and decode the claims, without bound validation
    pub fn decode(&self, token: &str) -> Result<TokenClaims> {
        let data = decode::<TokenClaims>(token, &self.key, &self.validation).map_err(|e| {
            debug!(error = %e, "Failed to decode token");
            AuthError::from(e)
        })?;
        Ok(data.claims)
    }

    /// Verify, decode and validate a token
    pub async fn authenticate(&self, token: &str) -> Result<ValidationResult> {
        let claims = self.decode(token)?;
        let result = self
            .validator
            .validate(&claims.public, &claims.private)
            .await?;

        debug!(
            namespace = %result.namespace,
            account = %result.account_name,
            "Token authenticated"
        );
        Ok(result)
    }
}
