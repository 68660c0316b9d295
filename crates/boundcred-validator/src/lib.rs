//! Bound Token Validator
//!
//! Validates bound service account tokens against live state: a token is
//! only accepted while the service account it names, and the secret or pod
//! it may be bound to, still exist with the uids recorded in the token.
//!
//! ## Pipeline
//!
//! 1. Time window (`exp`, `nbf`, `iat`) with leeway
//! 2. Service account liveness (name, uid, deletion grace)
//! 3. Secret liveness, if the token is bound to one
//! 4. Pod liveness, if the token is bound to one
//!
//! The first failing gate ends the call. Secret and pod failures are
//! reported as one generic rejection so callers cannot tell which condition
//! tripped.
//!
//! ## Usage
//!
//! ```ignore
//! use boundcred_validator::{BoundValidator, MemoryStore, TokenAuthenticator};
//!
//! let validator = Arc::new(BoundValidator::new(store));
//! let authenticator = TokenAuthenticator::new(validator, key, Algorithm::RS256);
//!
//! let identity = authenticator.authenticate(&raw_token).await?;
//! println!("Authenticated {}", identity.username());
//! ```

pub mod config;
pub mod error;
pub mod store;
pub mod token;
pub mod validator;

pub use config::ValidatorConfig;
pub use error::{AuthError, ConfigError, Result};
pub use store::{BoundObject, MemoryStore, ObjectGetter};
pub use token::TokenAuthenticator;
pub use validator::{BoundValidator, ValidationResult};

pub use boundcred_core::{ObjectRef, PrivateClaims, PublicClaims, StoreError, ValidationError};
