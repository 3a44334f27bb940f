//! Token verification against keys published at a JWKS endpoint.

use std::sync::Arc;

use crate::asn1;
use crate::clock::Clock;
use crate::error::{JwtError, KeyResolutionError};
use crate::events::{EventSink, JwtEvent};
use crate::jwks::cache::CacheStore;
use crate::jwks::http::HttpClient;
use crate::jwks::model::{JsonWebKey, KeyUse};
use crate::jwks::resolver::JwksResolver;
use crate::jwks::uri::JwksUri;
use crate::jwt::{Algorithm, DecodedJwtToken, Jwt};
use crate::keys::RsaSignaturePublicKey;
use crate::protocol::{AsymmetricProtocol, Rs256, VerificationKey};

/// Reason recorded when the token's `kid` is absent from the set.
pub const REASON_KEY_NOT_FOUND: &str = "key_not_found";

/// Reason recorded when the selected key does not verify the signature.
pub const REASON_SIGNATURE_FAILED: &str = "signature_verification_failed";

/// Verifies RS256 tokens whose `kid` names a key in a JWKS.
///
/// A missing `kid` is refused outright; keys are never tried in turn. A
/// missing key or bad signature drops the cached set so the next call
/// refetches, but the failing call is not retried.
pub struct JwksJwtVerifier<H, S> {
    resolver: JwksResolver<H, S>,
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventSink>,
}

impl<H: HttpClient, S: CacheStore> JwksJwtVerifier<H, S> {
    /// Verifier over a resolver.
    pub fn new(
        resolver: JwksResolver<H, S>,
        clock: Arc<dyn Clock>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            resolver,
            clock,
            events,
        }
    }

    /// Underlying resolver.
    pub const fn resolver(&self) -> &JwksResolver<H, S> {
        &self.resolver
    }

    /// Parse and verify `token` against the set at `uri`.
    ///
    /// # Errors
    ///
    /// Structural and claim errors first, then
    /// [`KeyResolutionError`] for a missing `kid`, unknown key or unusable
    /// key, transport and format errors from resolution, and signature
    /// errors.
    pub async fn verify(&self, token: &str, uri: &JwksUri) -> Result<DecodedJwtToken, JwtError> {
        let jwt = match Jwt::parse(token) {
            Ok(jwt) => jwt,
            Err(e) => {
                let e = JwtError::from(e);
                self.emit_failure(None, &e);
                return Err(e);
            }
        };
        self.verify_jwt(&jwt, uri).await
    }

    /// Verify an already-parsed token against the set at `uri`.
    ///
    /// # Errors
    ///
    /// As [`Self::verify`].
    pub async fn verify_jwt(&self, jwt: &Jwt, uri: &JwksUri) -> Result<DecodedJwtToken, JwtError> {
        let algorithm = jwt.algorithm();
        self.events.emit(&JwtEvent::VerificationStarted {
            algorithm: Some(algorithm),
        });

        match self.check(jwt, uri).await {
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

    async fn check(&self, jwt: &Jwt, uri: &JwksUri) -> Result<DecodedJwtToken, JwtError> {
        let decoded = jwt.decode()?;
        decoded.validate_time_claims(self.clock.now())?;

        let kid = decoded
            .header()
            .key_id()
            .ok_or(KeyResolutionError::MissingKeyId)?;

        let set = self.resolver.resolve(uri).await?;
        let Some(jwk) = set.find(kid) else {
            self.resolver.invalidate(uri, REASON_KEY_NOT_FOUND).await;
            return Err(KeyResolutionError::KeyNotFound {
                kid: kid.to_string(),
            }
            .into());
        };

        let key = public_key_for(jwk, decoded.header().algorithm())?;
        if let Err(e) = Rs256.verify(
            jwt.signing_input().as_bytes(),
            jwt.signature(),
            VerificationKey::Rsa(&key),
        ) {
            if matches!(e, JwtError::Signature(_)) {
                self.resolver.invalidate(uri, REASON_SIGNATURE_FAILED).await;
            }
            return Err(e);
        }
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

/// Turn a JWK into an RS256 verification key, refusing every other
/// type/algorithm combination.
fn public_key_for(jwk: &JsonWebKey, algorithm: Algorithm) -> Result<RsaSignaturePublicKey, JwtError> {
    let unusable = |reason: String| KeyResolutionError::UnsupportedKey {
        kid: jwk.key_id().to_string(),
        reason,
    };

    if algorithm != Algorithm::RS256 {
        return Err(unusable(format!("{algorithm} tokens are not verified through JWKS")).into());
    }
    if jwk.key_use() == Some(KeyUse::Encryption) {
        return Err(unusable("key is published for encryption".to_string()).into());
    }
    if let Some(declared) = jwk.algorithm() {
        if declared != algorithm.as_str() {
            return Err(unusable(format!("key is for {declared}, token uses {algorithm}")).into());
        }
    }
    let (n, e) = jwk
        .rsa_components()
        .ok_or_else(|| unusable(format!("key type {} cannot verify RS256", jwk.key_type())))?;

    let pem = asn1::jwk_to_pem(n, e)?;
    Ok(RsaSignaturePublicKey::from_pem(&pem)?)
}
