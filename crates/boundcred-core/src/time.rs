//! Token time-window rules and clocks
//!
//! The registered claims (`iss`, `sub`, `aud`, `exp`, `nbf`, `iat`, `jti`)
//! are checked the way JOSE libraries do it: every time comparison is
//! relaxed by a leeway, and identity expectations are only enforced when the
//! caller sets them.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Default leeway in seconds, matching the JOSE default of one minute
pub const DEFAULT_LEEWAY_SECS: i64 = 60;

/// Default leeway as a duration
pub fn default_leeway() -> Duration {
    Duration::seconds(DEFAULT_LEEWAY_SECS)
}

/// Seconds since the Unix epoch, as used by JWT time claims
///
/// Fractional values on the wire are truncated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NumericDate(pub i64);

impl NumericDate {
    /// Convert a timestamp, dropping sub-second precision
    pub fn from_datetime(time: DateTime<Utc>) -> Self {
        Self(time.timestamp())
    }

    /// The instant this date denotes, if representable
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.0, 0).single()
    }
}

impl From<DateTime<Utc>> for NumericDate {
    fn from(time: DateTime<Utc>) -> Self {
        Self::from_datetime(time)
    }
}

impl Serialize for NumericDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

impl<'de> Deserialize<'de> for NumericDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Int(i64),
            Float(f64),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Int(secs) => Ok(NumericDate(secs)),
            Repr::Float(secs) => Ok(NumericDate(secs as i64)),
        }
    }
}

/// The `aud` claim: a single string or an array of strings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Audience(pub Vec<String>);

impl Audience {
    /// Check if the audience list contains a value
    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|a| a == value)
    }
}

impl Serialize for Audience {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let [single] = self.0.as_slice() {
            serializer.serialize_str(single)
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Audience {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            One(String),
            Many(Vec<String>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::One(aud) => Ok(Audience(vec![aud])),
            Repr::Many(auds) => Ok(Audience(auds)),
        }
    }
}

/// Registered JWT claims
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicClaims {
    #[serde(rename = "iss", default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    #[serde(rename = "sub", default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    #[serde(rename = "aud", default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<Audience>,

    #[serde(rename = "exp", default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<NumericDate>,

    #[serde(rename = "nbf", default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<NumericDate>,

    #[serde(rename = "iat", default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<NumericDate>,

    #[serde(rename = "jti", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Expectations to check registered claims against
///
/// Unset fields are not checked. `time` unset skips all time checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expected {
    pub issuer: Option<String>,
    pub subject: Option<String>,
    pub id: Option<String>,
    pub audience: Vec<String>,
    pub time: Option<DateTime<Utc>>,
}

impl Expected {
    /// Expect only that the token is valid at `time`
    pub fn at(time: DateTime<Utc>) -> Self {
        Self {
            time: Some(time),
            ..Self::default()
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience.push(audience.into());
        self
    }
}

/// Identity claim that did not match its expectation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimMismatch {
    Audience,
    Issuer,
    Subject,
    Id,
}

impl std::fmt::Display for ClaimMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClaimMismatch::Audience => write!(f, "validation failed, invalid audience claim (aud)"),
            ClaimMismatch::Issuer => write!(f, "validation failed, invalid issuer claim (iss)"),
            ClaimMismatch::Subject => write!(f, "validation failed, invalid subject claim (sub)"),
            ClaimMismatch::Id => write!(f, "validation failed, invalid ID claim (jti)"),
        }
    }
}

/// Result of checking registered claims against expectations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeWindowOutcome {
    Ok,
    Expired,
    NotYetValid,
    /// An identity expectation failed
    StructurallyInvalid(ClaimMismatch),
    /// Any other failure; the detail is for operators only
    Unknown(String),
}

impl PublicClaims {
    /// Check claims against expectations with the given leeway
    ///
    /// Identity claims are checked first (issuer, subject, id, audience),
    /// then `nbf`, `exp` and `iat`. A negative leeway counts as zero.
    pub fn validate_with_leeway(&self, expected: &Expected, leeway: Duration) -> TimeWindowOutcome {
        if let Some(ref issuer) = expected.issuer {
            if self.issuer.as_ref() != Some(issuer) {
                return TimeWindowOutcome::StructurallyInvalid(ClaimMismatch::Issuer);
            }
        }

        if let Some(ref subject) = expected.subject {
            if self.subject.as_ref() != Some(subject) {
                return TimeWindowOutcome::StructurallyInvalid(ClaimMismatch::Subject);
            }
        }

        if let Some(ref id) = expected.id {
            if self.id.as_ref() != Some(id) {
                return TimeWindowOutcome::StructurallyInvalid(ClaimMismatch::Id);
            }
        }

        for aud in &expected.audience {
            let present = self.audience.as_ref().is_some_and(|a| a.contains(aud));
            if !present {
                return TimeWindowOutcome::StructurallyInvalid(ClaimMismatch::Audience);
            }
        }

        let Some(now) = expected.time else {
            return TimeWindowOutcome::Ok;
        };

        let leeway = leeway.max(Duration::zero());
        let (Some(earliest), Some(latest)) = (now.checked_sub_signed(leeway), now.checked_add_signed(leeway)) else {
            return TimeWindowOutcome::Unknown(format!(
                "leeway of {}s overflows the validation time",
                leeway.num_seconds()
            ));
        };

        if let Some(nbf) = self.not_before {
            match nbf.to_datetime() {
                Some(nbf) if latest < nbf => return TimeWindowOutcome::NotYetValid,
                Some(_) => {}
                None => return out_of_range("nbf", nbf),
            }
        }

        if let Some(exp) = self.expiry {
            match exp.to_datetime() {
                Some(exp) if earliest > exp => return TimeWindowOutcome::Expired,
                Some(_) => {}
                None => return out_of_range("exp", exp),
            }
        }

        if let Some(iat) = self.issued_at {
            match iat.to_datetime() {
                Some(iat) if latest < iat => {
                    return TimeWindowOutcome::Unknown(
                        "validation failed, token issued in the future (iat)".to_string(),
                    )
                }
                Some(_) => {}
                None => return out_of_range("iat", iat),
            }
        }

        TimeWindowOutcome::Ok
    }
}

fn out_of_range(claim: &str, value: NumericDate) -> TimeWindowOutcome {
    TimeWindowOutcome::Unknown(format!("{} claim out of range: {}", claim, value.0))
}

/// Time-window check as seen by the bound validator
pub trait TimeWindow {
    /// Check the token is usable at `now`, relaxed by `leeway`
    fn validate_time_window(&self, now: DateTime<Utc>, leeway: Duration) -> TimeWindowOutcome;
}

impl TimeWindow for PublicClaims {
    fn validate_time_window(&self, now: DateTime<Utc>, leeway: Duration) -> TimeWindowOutcome {
        self.validate_with_leeway(&Expected::at(now), leeway)
    }
}

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
