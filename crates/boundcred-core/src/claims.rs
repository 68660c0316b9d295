//! Private claims carried by a bound service account token

use serde::{Deserialize, Serialize};

use crate::time::{NumericDate, PublicClaims};

/// Reference to a backing object by name and uid
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uid: String,
}

impl ObjectRef {
    /// Create a new object reference
    pub fn new(name: impl Into<String>, uid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uid: uid.into(),
        }
    }
}

/// Kinds of backing objects a token can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// The service account the token was issued for
    Account,
    /// A secret the token is bound to
    Secret,
    /// A workload instance (pod) the token is bound to
    Instance,
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectKind::Account => write!(f, "serviceaccounts"),
            ObjectKind::Secret => write!(f, "secrets"),
            ObjectKind::Instance => write!(f, "pods"),
        }
    }
}

/// The private claims embedded in a bound token
///
/// Every field falls back to its zero value when absent from the payload.
/// Nothing here is trusted until the validator has confirmed it against the
/// backing store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivateClaims {
    /// Namespace scoping every referenced object
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,

    /// Service account the token asserts (always checked)
    #[serde(rename = "serviceaccount")]
    pub account: ObjectRef,

    /// Workload instance the token is bound to, if any
    #[serde(rename = "pod", skip_serializing_if = "Option::is_none")]
    pub instance: Option<ObjectRef>,

    /// Secret the token is bound to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<ObjectRef>,

    /// Informational threshold after which clients should refresh
    #[serde(rename = "warnafter")]
    pub warn_after: NumericDate,
}

impl PrivateClaims {
    /// Create claims for an account in a namespace, with no extra bindings
    pub fn new(namespace: impl Into<String>, account: ObjectRef) -> Self {
        Self {
            namespace: namespace.into(),
            account,
            ..Self::default()
        }
    }

    /// Bind the token to a secret
    pub fn with_secret(mut self, secret: ObjectRef) -> Self {
        self.secret = Some(secret);
        self
    }

    /// Bind the token to a workload instance
    pub fn with_instance(mut self, instance: ObjectRef) -> Self {
        self.instance = Some(instance);
        self
    }

    /// Set the warn-after threshold
    pub fn with_warn_after(mut self, warn_after: NumericDate) -> Self {
        self.warn_after = warn_after;
        self
    }
}

/// Full token payload: registered claims plus the bound private claims
///
/// The private claims sit under the `kubernetes.io` key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(flatten)]
    pub public: PublicClaims,

    #[serde(rename = "kubernetes.io", default)]
    pub private: PrivateClaims,
}
