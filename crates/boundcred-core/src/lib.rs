//! # Boundcred Core
//!
//! Claims model, time-window rules and rejection types for bound service
//! account tokens.
//!
//! ## Key Concepts
//!
//! - **Bound token**: a token whose trust depends on the continued existence
//!   of the objects it names, not only on a valid signature
//! - **ObjectRef**: a `(name, uid)` pair; the uid changes whenever an object
//!   with that name is deleted and recreated
//! - **Leeway**: the grace window shared by the expiry check and the
//!   deletion check
//!
//! This crate is inert data plus pure functions. The liveness checks against
//! a backing store live in `boundcred-validator`.

pub mod claims;
pub mod error;
pub mod time;

pub use claims::{ObjectKind, ObjectRef, PrivateClaims, TokenClaims};
pub use error::{Result, StoreError, ValidationError};
pub use time::{
    default_leeway, Audience, ClaimMismatch, Clock, Expected, FixedClock, NumericDate,
    PublicClaims, SystemClock, TimeWindow, TimeWindowOutcome, DEFAULT_LEEWAY_SECS,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
