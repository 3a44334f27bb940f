//! Payload claims and time validation.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::{ClaimError, StructuralError};

/// Slack applied to `exp`, `nbf` and `iat`.
pub const CLOCK_SKEW_SECONDS: i64 = 300;

/// 2000-01-01T00:00:00Z
pub const MIN_TIMESTAMP: i64 = 946_684_800;

/// 2100-01-01T00:00:00Z
pub const MAX_TIMESTAMP: i64 = 4_102_444_800;

/// Decoded payload: an ordered JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JwtPayload {
    claims: Map<String, Value>,
}

impl JwtPayload {
    /// Empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing claim map.
    #[must_use]
    pub const fn from_map(claims: Map<String, Value>) -> Self {
        Self { claims }
    }

    /// Parse decoded payload JSON.
    ///
    /// # Errors
    ///
    /// Fails when the JSON is invalid or is not an object.
    pub fn from_json(json: &str) -> Result<Self, StructuralError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| StructuralError::InvalidJson {
                segment: "payload",
                reason: e.to_string(),
            })?;
        match value {
            Value::Object(claims) => Ok(Self { claims }),
            _ => Err(StructuralError::NotAnObject { segment: "payload" }),
        }
    }

    /// Compact JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        Value::Object(self.claims.clone()).to_string()
    }

    /// Add or replace a claim.
    #[must_use]
    pub fn with_claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Add or replace a claim in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.claims.insert(name.into(), value.into());
    }

    /// All claims.
    #[must_use]
    pub const fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    /// Raw claim by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// `sub`
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.string_claim("sub")
    }

    /// `iss`
    #[must_use]
    pub fn issuer(&self) -> Option<&str> {
        self.string_claim("iss")
    }

    /// `jti`
    #[must_use]
    pub fn jwt_id(&self) -> Option<&str> {
        self.string_claim("jti")
    }

    /// `aud`, which may be a single string or an array of strings.
    #[must_use]
    pub fn audience(&self) -> Vec<&str> {
        match self.claims.get("aud") {
            Some(Value::String(aud)) => vec![aud.as_str()],
            Some(Value::Array(values)) => values.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// `exp`
    ///
    /// # Errors
    ///
    /// Fails when present but not a number in the accepted range.
    pub fn expiration(&self) -> Result<Option<DateTime<Utc>>, ClaimError> {
        self.timestamp_claim("exp")
    }

    /// `iat`
    ///
    /// # Errors
    ///
    /// Fails when present but not a number in the accepted range.
    pub fn issued_at(&self) -> Result<Option<DateTime<Utc>>, ClaimError> {
        self.timestamp_claim("iat")
    }

    /// `nbf`
    ///
    /// # Errors
    ///
    /// Fails when present but not a number in the accepted range.
    pub fn not_before(&self) -> Result<Option<DateTime<Utc>>, ClaimError> {
        self.timestamp_claim("nbf")
    }

    /// Check `exp`, `nbf` and `iat` against `now` with
    /// [`CLOCK_SKEW_SECONDS`] of slack each way. Absent claims are not
    /// required.
    ///
    /// # Errors
    ///
    /// [`ClaimError::Expired`] when `now > exp + skew`,
    /// [`ClaimError::NotYetValid`] when `now < nbf - skew`,
    /// [`ClaimError::IssuedInFuture`] when `now < iat - skew`, or a
    /// malformed-timestamp error.
    pub fn validate_time_claims(&self, now: DateTime<Utc>) -> Result<(), ClaimError> {
        let now = now.timestamp();

        if let Some(exp) = self.expiration()? {
            if now > exp.timestamp() + CLOCK_SKEW_SECONDS {
                return Err(ClaimError::Expired { expired_at: exp });
            }
        }
        if let Some(nbf) = self.not_before()? {
            if now < nbf.timestamp() - CLOCK_SKEW_SECONDS {
                return Err(ClaimError::NotYetValid { valid_from: nbf });
            }
        }
        if let Some(iat) = self.issued_at()? {
            if now < iat.timestamp() - CLOCK_SKEW_SECONDS {
                return Err(ClaimError::IssuedInFuture { issued_at: iat });
            }
        }
        Ok(())
    }

    fn string_claim(&self, name: &str) -> Option<&str> {
        self.claims.get(name).and_then(Value::as_str)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn timestamp_claim(&self, name: &str) -> Result<Option<DateTime<Utc>>, ClaimError> {
        let Some(value) = self.claims.get(name) else {
            return Ok(None);
        };
        let non_numeric = || ClaimError::NonNumeric {
            claim: name.to_string(),
        };
        let out_of_range = |value: f64| ClaimError::OutOfRange {
            claim: name.to_string(),
            value,
        };

        let number = value.as_number().ok_or_else(non_numeric)?;
        let seconds = if let Some(seconds) = number.as_i64() {
            seconds
        } else {
            let float = number.as_f64().ok_or_else(non_numeric)?;
            if !(MIN_TIMESTAMP as f64..=MAX_TIMESTAMP as f64).contains(&float) {
                return Err(out_of_range(float));
            }
            float.floor() as i64
        };

        if !(MIN_TIMESTAMP..=MAX_TIMESTAMP).contains(&seconds) {
            return Err(out_of_range(seconds as f64));
        }
        DateTime::from_timestamp(seconds, 0)
            .map(Some)
            .ok_or_else(|| out_of_range(seconds as f64))
    }
}

impl From<Map<String, Value>> for JwtPayload {
    fn from(claims: Map<String, Value>) -> Self {
        Self::from_map(claims)
    }
}
