use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};

use crate::clock::Clock;
use crate::jwt::claims::JwtPayload;

/// Assembles a [`JwtPayload`] with registered claims stamped from a [`Clock`].
#[derive(Debug, Clone)]
pub struct JwtBuilder {
    issuer: Option<String>,
    subject: Option<String>,
    audience: Vec<String>,
    ttl: Duration,
    not_before_offset: Option<Duration>,
    with_jwt_id: bool,
    custom_claims: Map<String, Value>,
}

impl Default for JwtBuilder {
    fn default() -> Self {
        Self {
            issuer: None,
            subject: None,
            audience: Vec::new(),
            ttl: Duration::seconds(900), // 15 minutes default
            not_before_offset: Some(Duration::zero()),
            with_jwt_id: true,
            custom_claims: Map::new(),
        }
    }
}

impl JwtBuilder {
    /// Builder with the given `iss`.
    #[must_use]
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: Some(issuer.into()),
            ..Self::default()
        }
    }

    /// `sub`
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// `aud`; a single audience is written as a string.
    #[must_use]
    pub fn audience(mut self, audience: Vec<String>) -> Self {
        self.audience = audience;
        self
    }

    /// Lifetime added to `iat` to produce `exp`.
    #[must_use]
    pub const fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Lifetime in seconds. Values beyond what [`Duration`] holds saturate.
    #[must_use]
    pub fn ttl_seconds(self, seconds: i64) -> Self {
        let ttl = Duration::try_seconds(seconds).unwrap_or(if seconds < 0 {
            Duration::MIN
        } else {
            Duration::MAX
        });
        self.ttl(ttl)
    }

    /// Offset from `iat` for `nbf`; `None` omits the claim.
    #[must_use]
    pub const fn not_before(mut self, offset: Option<Duration>) -> Self {
        self.not_before_offset = offset;
        self
    }

    /// Whether to stamp a random `jti`.
    #[must_use]
    pub const fn jwt_id(mut self, enabled: bool) -> Self {
        self.with_jwt_id = enabled;
        self
    }

    /// Extra claim. Registered claims set by the builder take precedence.
    #[must_use]
    pub fn custom_claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.custom_claims.insert(name.into(), value.into());
        self
    }

    /// Produce the payload with `iat` taken from `clock`.
    #[must_use]
    pub fn build(self, clock: &dyn Clock) -> JwtPayload {
        let now = clock.now();
        let mut payload = JwtPayload::from_map(self.custom_claims);

        if let Some(issuer) = self.issuer {
            payload.insert("iss", issuer);
        }
        if let Some(subject) = self.subject {
            payload.insert("sub", subject);
        }
        match self.audience.len() {
            0 => {}
            1 => payload.insert("aud", self.audience[0].clone()),
            _ => payload.insert("aud", self.audience),
        }

        payload.insert("iat", now.timestamp());
        payload.insert("exp", saturating_add(now, self.ttl).timestamp());
        if let Some(offset) = self.not_before_offset {
            payload.insert("nbf", saturating_add(now, offset).timestamp());
        }
        if self.with_jwt_id {
            payload.insert("jti", uuid::Uuid::new_v4().to_string());
        }
        payload
    }
}

/// `at + by`, clamped to chrono's representable range. Clamped values fall
/// outside the accepted timestamp window and fail validation.
fn saturating_add(at: DateTime<Utc>, by: Duration) -> DateTime<Utc> {
    at.checked_add_signed(by).unwrap_or(if by < Duration::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}
