//! Validator configuration

use boundcred_core::DEFAULT_LEEWAY_SECS;
use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable overriding the leeway, in seconds
pub const LEEWAY_ENV: &str = "BOUNDCRED_LEEWAY_SECS";

/// Upper bound on the leeway; anything longer defeats deletion checks
pub const MAX_LEEWAY_SECS: u64 = 3600;

/// Configuration for a [`crate::BoundValidator`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Grace applied to expiry, not-before and deletion timestamps
    #[serde(default = "default_leeway_secs")]
    pub leeway_secs: u64,
}

fn default_leeway_secs() -> u64 {
    DEFAULT_LEEWAY_SECS as u64
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            leeway_secs: default_leeway_secs(),
        }
    }
}

impl ValidatorConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(LEEWAY_ENV) {
            config.leeway_secs = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidValue {
                    key: LEEWAY_ENV.to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.leeway_secs > MAX_LEEWAY_SECS {
            return Err(ConfigError::InvalidValue {
                key: "leeway_secs".to_string(),
                value: self.leeway_secs.to_string(),
                reason: format!("must be at most {} seconds", MAX_LEEWAY_SECS),
            });
        }
        Ok(())
    }

    /// Leeway as a duration
    pub fn leeway(&self) -> Duration {
        Duration::seconds(self.leeway_secs.min(MAX_LEEWAY_SECS) as i64)
    }
}
