//! Sign and verify tokens with directly supplied keys.

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::error::JwtError;
use crate::events::{EventSink, JwtEvent, TracingEventSink};
use crate::jwt::{self, Algorithm, DecodedJwtToken, Jwt, JwtHeader, JwtPayload};
use crate::protocol::{Protocol, SigningKey, VerificationKey};

/// Entry point for token signing and verification.
///
/// Verification always decodes, then validates time claims against the
/// injected clock, then checks the signature with the protocol named by
/// the token's own header.
#[derive(Clone)]
pub struct JwtFacade {
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventSink>,
}

impl Default for JwtFacade {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(TracingEventSink))
    }
}

impl JwtFacade {
    /// Facade with the given collaborators.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, events: Arc<dyn EventSink>) -> Self {
        Self { clock, events }
    }

    /// Sign `payload` under `algorithm` with a default header.
    ///
    /// # Errors
    ///
    /// [`JwtError::UnsupportedOperation`] or [`JwtError::Key`] when `key`
    /// does not fit `algorithm`.
    pub fn sign(
        &self,
        payload: &JwtPayload,
        algorithm: Algorithm,
        key: SigningKey<'_>,
    ) -> Result<Jwt, JwtError> {
        self.sign_with_header(&JwtHeader::new(algorithm), payload, key)
    }

    /// Sign `payload` under an explicit header, e.g. one carrying a `kid`.
    ///
    /// # Errors
    ///
    /// As [`Self::sign`].
    pub fn sign_with_header(
        &self,
        header: &JwtHeader,
        payload: &JwtPayload,
        key: SigningKey<'_>,
    ) -> Result<Jwt, JwtError> {
        let input = jwt::signing_input(header, payload);
        let signature = Protocol::for_algorithm(header.algorithm()).sign(input.as_bytes(), key)?;
        Ok(Jwt::parse(format!("{input}.{signature}"))?)
    }

    /// Parse then verify a raw token string.
    ///
    /// # Errors
    ///
    /// As [`Self::verify`], plus structural errors from parsing.
    pub fn verify_str(
        &self,
        token: &str,
        key: VerificationKey<'_>,
    ) -> Result<DecodedJwtToken, JwtError> {
        match Jwt::parse(token) {
            Ok(jwt) => self.verify(&jwt, key),
            Err(e) => {
                let e = JwtError::from(e);
                self.emit_failure(None, &e);
                Err(e)
            }
        }
    }

    /// Verify a parsed token.
    ///
    /// # Errors
    ///
    /// [`JwtError::Structural`] when the payload is not an object,
    /// [`JwtError::Claim`] on a time violation, [`JwtError::Signature`]
    /// when the key has the wrong type or the signature does not match.
    pub fn verify(
        &self,
        token: &Jwt,
        key: VerificationKey<'_>,
    ) -> Result<DecodedJwtToken, JwtError> {
        let algorithm = token.algorithm();
        self.events.emit(&JwtEvent::VerificationStarted {
            algorithm: Some(algorithm),
        });

        match self.check(token, key) {
            Ok(decoded) => {
                self.events
                    .emit(&JwtEvent::VerificationCompleted { algorithm });
                Ok(decoded)
            }
            Err(e) => {
                self.emit_failure(Some(algorithm), &e);
                Err(e)
            }
        }
    }

    fn check(&self, token: &Jwt, key: VerificationKey<'_>) -> Result<DecodedJwtToken, JwtError> {
        let decoded = token.decode()?;
        decoded.validate_time_claims(self.clock.now())?;
        Protocol::for_algorithm(decoded.header().algorithm()).verify(
            token.signing_input().as_bytes(),
            token.signature(),
            key,
        )?;
        Ok(decoded)
    }

    fn emit_failure(&self, algorithm: Option<Algorithm>, error: &JwtError) {
        self.events.emit(&JwtEvent::VerificationFailed {
            algorithm,
            error_code: error.error_code(),
            reason: error.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::{ClaimError, SignatureError, StructuralError};
    use crate::events::NoopEventSink;
    use crate::keys::{Ed25519KeyPair, SharedKey};
    use test_utils::fixtures;

    fn facade() -> JwtFacade {
        JwtFacade::new(
            Arc::new(FixedClock::at_timestamp(fixtures::FIXTURE_IAT)),
            Arc::new(NoopEventSink),
        )
    }

    #[test]
    fn test_eddsa_example() {
        let pair = Ed25519KeyPair::generate().unwrap();
        let payload = JwtPayload::new().with_claim("sub", "123");

        let token = facade()
            .sign(&payload, Algorithm::EdDSA, SigningKey::Ed25519(&pair))
            .unwrap();
        let decoded = facade()
            .verify(&token, VerificationKey::Ed25519(&pair.public_key()))
            .unwrap();
        assert_eq!(decoded.payload().to_json(), r#"{"sub":"123"}"#);

        let other = Ed25519KeyPair::generate().unwrap();
        assert!(matches!(
            facade().verify(&token, VerificationKey::Ed25519(&other.public_key())),
            Err(JwtError::Signature(_))
        ));
    }

    #[test]
    fn test_hs256_fixture_verifies() {
        let key = SharedKey::new(fixtures::HS256_SECRET.to_vec()).unwrap();
        let decoded = facade()
            .verify_str(fixtures::HS256_TOKEN, VerificationKey::Shared(&key))
            .unwrap();
        assert_eq!(decoded.header().algorithm(), Algorithm::HS256);
        assert_eq!(decoded.payload().subject(), Some("123"));
    }

    #[test]
    fn test_claims_checked_before_signature() {
        let key = SharedKey::new(fixtures::HS256_SECRET.to_vec()).unwrap();
        let payload = JwtPayload::new().with_claim("exp", fixtures::FIXTURE_IAT - 3600);
        let token = facade()
            .sign(&payload, Algorithm::HS256, SigningKey::Shared(&key))
            .unwrap();

        let other = SharedKey::generate().unwrap();
        let err = facade()
            .verify(&token, VerificationKey::Shared(&other))
            .unwrap_err();
        assert!(matches!(err, JwtError::Claim(ClaimError::Expired { .. })));
        assert!(err.is_expired());
    }

    #[test]
    fn test_header_decides_protocol() {
        let key = SharedKey::new(fixtures::HS256_SECRET.to_vec()).unwrap();
        let public =
            crate::keys::RsaSignaturePublicKey::from_pem(fixtures::RSA_3072_A_PUBLIC_PEM).unwrap();
        let err = facade()
            .verify_str(fixtures::HS256_TOKEN, VerificationKey::Rsa(&public))
            .unwrap_err();
        assert!(matches!(
            err,
            JwtError::Signature(SignatureError::AlgorithmConfusion {
                algorithm: Algorithm::HS256,
                key_type: "RSA",
            })
        ));

        let err = facade()
            .verify_str(fixtures::RS256_TOKEN_KEY_A, VerificationKey::Shared(&key))
            .unwrap_err();
        assert!(matches!(
            err,
            JwtError::Signature(SignatureError::AlgorithmConfusion {
                algorithm: Algorithm::RS256,
                ..
            })
        ));
    }

    #[test]
    fn test_sign_with_kid() {
        let key = SharedKey::generate().unwrap();
        let header = JwtHeader::new(Algorithm::HS256).with_key_id("k-1");
        let token = facade()
            .sign_with_header(&header, &JwtPayload::new(), SigningKey::Shared(&key))
            .unwrap();
        assert_eq!(token.key_id(), Some("k-1"));
        assert_eq!(token.header(), r#"{"alg":"HS256","typ":"JWT","kid":"k-1"}"#);
    }

    #[test]
    fn test_malformed_input() {
        let key = SharedKey::generate().unwrap();
        assert!(matches!(
            facade().verify_str("only.two", VerificationKey::Shared(&key)),
            Err(JwtError::Structural(StructuralError::SegmentCount { found: 2 }))
        ));
    }
}
