//! Header and payload after structural decoding.

use chrono::{DateTime, Utc};

use crate::error::ClaimError;
use crate::jwt::claims::JwtPayload;
use crate::jwt::header::JwtHeader;

/// Decoded token. Holding one says nothing about time validity or
/// signature; callers that skip the facade must call
/// [`Self::validate_time_claims`] themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedJwtToken {
    header: JwtHeader,
    payload: JwtPayload,
}

impl DecodedJwtToken {
    /// Pair a header with its payload.
    #[must_use]
    pub const fn new(header: JwtHeader, payload: JwtPayload) -> Self {
        Self { header, payload }
    }

    /// Header.
    #[must_use]
    pub const fn header(&self) -> &JwtHeader {
        &self.header
    }

    /// Payload.
    #[must_use]
    pub const fn payload(&self) -> &JwtPayload {
        &self.payload
    }

    /// Split into parts.
    #[must_use]
    pub fn into_parts(self) -> (JwtHeader, JwtPayload) {
        (self.header, self.payload)
    }

    /// See [`JwtPayload::validate_time_claims`].
    ///
    /// # Errors
    ///
    /// Propagates the payload's claim error.
    pub fn validate_time_claims(&self, now: DateTime<Utc>) -> Result<(), ClaimError> {
        self.payload.validate_time_claims(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::Jwt;
    use test_utils::fixtures;

    #[test]
    fn test_decode_does_not_check_time() {
        let decoded = Jwt::parse(fixtures::HS256_TOKEN).unwrap().decode().unwrap();
        assert_eq!(decoded.payload().subject(), Some("123"));

        let after_expiry = DateTime::from_timestamp(fixtures::FIXTURE_EXP + 301, 0).unwrap();
        assert!(matches!(
            decoded.validate_time_claims(after_expiry),
            Err(ClaimError::Expired { .. })
        ));

        let (header, payload) = decoded.into_parts();
        assert_eq!(header.key_id(), None);
        assert!(payload.get("exp").is_some());
    }
}
