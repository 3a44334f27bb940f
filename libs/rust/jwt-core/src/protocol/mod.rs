//! Per-algorithm sign/verify.
//!
//! RS256 and EdDSA implement [`AsymmetricProtocol`]; HS256 implements
//! [`SymmetricProtocol`]. [`Protocol`] picks one by [`Algorithm`] and
//! rejects keys from the wrong discipline. Signatures travel as base64url
//! strings without padding.

pub mod eddsa;
pub mod hs256;
pub mod rs256;

pub use eddsa::EdDsa;
pub use hs256::Hs256;
pub use rs256::Rs256;

use crate::error::{JwtError, KeyError, Operation, SignatureError};
use crate::jwt::Algorithm;
use crate::keys::{
    Ed25519KeyPair, Ed25519PublicKey, RsaSignatureKeyPair, RsaSignaturePublicKey, SharedKey,
};

/// Key handed to a protocol for signing.
#[derive(Debug, Clone, Copy)]
pub enum SigningKey<'a> {
    /// RSA key pair
    Rsa(&'a RsaSignatureKeyPair),
    /// Ed25519 key pair
    Ed25519(&'a Ed25519KeyPair),
    /// HMAC secret
    Shared(&'a SharedKey),
}

/// Key handed to a protocol for verification.
#[derive(Debug, Clone, Copy)]
pub enum VerificationKey<'a> {
    /// RSA public key
    Rsa(&'a RsaSignaturePublicKey),
    /// Ed25519 public key
    Ed25519(&'a Ed25519PublicKey),
    /// HMAC secret
    Shared(&'a SharedKey),
}

impl VerificationKey<'_> {
    /// Short key kind used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Rsa(_) => "RSA",
            Self::Ed25519(_) => "Ed25519",
            Self::Shared(_) => "shared",
        }
    }
}

impl<'a> From<&'a RsaSignaturePublicKey> for VerificationKey<'a> {
    fn from(key: &'a RsaSignaturePublicKey) -> Self {
        Self::Rsa(key)
    }
}

impl<'a> From<&'a Ed25519PublicKey> for VerificationKey<'a> {
    fn from(key: &'a Ed25519PublicKey) -> Self {
        Self::Ed25519(key)
    }
}

impl<'a> From<&'a SharedKey> for VerificationKey<'a> {
    fn from(key: &'a SharedKey) -> Self {
        Self::Shared(key)
    }
}

impl<'a> From<&'a RsaSignatureKeyPair> for SigningKey<'a> {
    fn from(key: &'a RsaSignatureKeyPair) -> Self {
        Self::Rsa(key)
    }
}

impl<'a> From<&'a Ed25519KeyPair> for SigningKey<'a> {
    fn from(key: &'a Ed25519KeyPair) -> Self {
        Self::Ed25519(key)
    }
}

impl<'a> From<&'a SharedKey> for SigningKey<'a> {
    fn from(key: &'a SharedKey) -> Self {
        Self::Shared(key)
    }
}

/// Public/secret key signature scheme.
pub trait AsymmetricProtocol {
    /// Algorithm implemented.
    const ALGORITHM: Algorithm;

    /// Sign `signing_input` with the secret half of `key`.
    ///
    /// # Errors
    ///
    /// [`JwtError::UnsupportedOperation`] when `key` belongs to another
    /// discipline, or a backend key error.
    fn sign(&self, signing_input: &[u8], key: SigningKey<'_>) -> Result<String, JwtError>;

    /// Check `signature` over `signing_input`. Any key that is not of this
    /// protocol's own type is refused before cryptography runs.
    ///
    /// # Errors
    ///
    /// [`SignatureError`] variants.
    fn verify(
        &self,
        signing_input: &[u8],
        signature: &str,
        key: VerificationKey<'_>,
    ) -> Result<(), JwtError>;
}

/// Shared-secret MAC scheme.
pub trait SymmetricProtocol {
    /// Algorithm implemented.
    const ALGORITHM: Algorithm;

    /// MAC `signing_input`.
    ///
    /// # Errors
    ///
    /// Backend failure only.
    fn sign_symmetric(&self, signing_input: &[u8], key: &SharedKey) -> Result<String, JwtError>;

    /// Check `signature` over `signing_input` in constant time.
    ///
    /// # Errors
    ///
    /// [`SignatureError`] variants.
    fn verify_symmetric(
        &self,
        signing_input: &[u8],
        signature: &str,
        key: &SharedKey,
    ) -> Result<(), JwtError>;
}

/// Protocol selected by algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// RS256
    Rs256(Rs256),
    /// HS256
    Hs256(Hs256),
    /// EdDSA
    EdDsa(EdDsa),
}

impl Protocol {
    /// Protocol for `algorithm`.
    #[must_use]
    pub const fn for_algorithm(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::RS256 => Self::Rs256(Rs256),
            Algorithm::HS256 => Self::Hs256(Hs256),
            Algorithm::EdDSA => Self::EdDsa(EdDsa),
        }
    }

    /// Algorithm implemented.
    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        match self {
            Self::Rs256(_) => Rs256::ALGORITHM,
            Self::Hs256(_) => Hs256::ALGORITHM,
            Self::EdDsa(_) => EdDsa::ALGORITHM,
        }
    }

    /// Sign with whichever discipline the protocol implements.
    ///
    /// # Errors
    ///
    /// [`JwtError::UnsupportedOperation`] naming the operation `key` would
    /// need when the protocol does not implement it.
    pub fn sign(&self, signing_input: &[u8], key: SigningKey<'_>) -> Result<String, JwtError> {
        match (self, key) {
            (Self::Rs256(p), key) => p.sign(signing_input, key),
            (Self::EdDsa(p), key) => p.sign(signing_input, key),
            (Self::Hs256(p), SigningKey::Shared(secret)) => p.sign_symmetric(signing_input, secret),
            (Self::Hs256(_), _) => Err(unsupported(Algorithm::HS256, Operation::AsymmetricSigning)),
        }
    }

    /// Verify with whichever discipline the protocol implements.
    ///
    /// # Errors
    ///
    /// [`SignatureError::AlgorithmConfusion`] when `key` belongs to another
    /// discipline, else the protocol's own errors.
    pub fn verify(
        &self,
        signing_input: &[u8],
        signature: &str,
        key: VerificationKey<'_>,
    ) -> Result<(), JwtError> {
        match (self, key) {
            (Self::Rs256(p), key) => p.verify(signing_input, signature, key),
            (Self::EdDsa(p), key) => p.verify(signing_input, signature, key),
            (Self::Hs256(p), VerificationKey::Shared(secret)) => {
                p.verify_symmetric(signing_input, signature, secret)
            }
            (Self::Hs256(_), key) => Err(confusion(Algorithm::HS256, key)),
        }
    }
}

impl From<Algorithm> for Protocol {
    fn from(algorithm: Algorithm) -> Self {
        Self::for_algorithm(algorithm)
    }
}

pub(crate) const fn unsupported(algorithm: Algorithm, operation: Operation) -> JwtError {
    JwtError::UnsupportedOperation {
        algorithm,
        operation,
    }
}

pub(crate) fn wrong_signing_key(expected: &'static str, key: SigningKey<'_>) -> JwtError {
    KeyError::WrongKeyType {
        expected,
        found: match key {
            SigningKey::Rsa(_) => "RSA",
            SigningKey::Ed25519(_) => "Ed25519",
            SigningKey::Shared(_) => "shared",
        }
        .to_string(),
    }
    .into()
}

pub(crate) fn confusion(algorithm: Algorithm, key: VerificationKey<'_>) -> JwtError {
    SignatureError::AlgorithmConfusion {
        algorithm,
        key_type: key.kind(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::fixtures;

    #[test]
    fn test_protocol_selection_is_exhaustive() {
        for alg in Algorithm::ALL {
            assert_eq!(Protocol::for_algorithm(alg).algorithm(), alg);
        }
    }

    #[test]
    fn test_hs256_refuses_asymmetric_signing() {
        let pair = Ed25519KeyPair::generate().unwrap();
        let err = Protocol::for_algorithm(Algorithm::HS256)
            .sign(b"a.b", SigningKey::Ed25519(&pair))
            .unwrap_err();
        assert!(matches!(
            err,
            JwtError::UnsupportedOperation {
                algorithm: Algorithm::HS256,
                operation: Operation::AsymmetricSigning,
            }
        ));
        assert_eq!(err.to_string(), "HS256 does not support asymmetric signing");
    }

    #[test]
    fn test_asymmetric_protocols_refuse_shared_signing() {
        let secret = SharedKey::new(fixtures::HS256_SECRET.to_vec()).unwrap();
        for alg in [Algorithm::RS256, Algorithm::EdDSA] {
            let err = Protocol::for_algorithm(alg)
                .sign(b"a.b", SigningKey::Shared(&secret))
                .unwrap_err();
            assert!(matches!(
                err,
                JwtError::UnsupportedOperation {
                    operation: Operation::SymmetricSigning,
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_hs256_refuses_public_keys() {
        let public = RsaSignaturePublicKey::from_pem(fixtures::RSA_2048_PUBLIC_PEM).unwrap();
        let err = Protocol::for_algorithm(Algorithm::HS256)
            .verify(b"a.b", "c2ln", VerificationKey::Rsa(&public))
            .unwrap_err();
        assert!(matches!(
            err,
            JwtError::Signature(SignatureError::AlgorithmConfusion {
                algorithm: Algorithm::HS256,
                key_type: "RSA",
            })
        ));
    }

    #[test]
    fn test_wrong_discipline_verification_is_confusion() {
        let secret = SharedKey::new(fixtures::HS256_SECRET.to_vec()).unwrap();
        let ed = Ed25519KeyPair::generate().unwrap().public_key();
        let rsa = RsaSignaturePublicKey::from_pem(fixtures::RSA_2048_PUBLIC_PEM).unwrap();
        let cases = [
            (Algorithm::RS256, VerificationKey::Shared(&secret)),
            (Algorithm::RS256, VerificationKey::Ed25519(&ed)),
            (Algorithm::EdDSA, VerificationKey::Shared(&secret)),
            (Algorithm::EdDSA, VerificationKey::Rsa(&rsa)),
            (Algorithm::HS256, VerificationKey::Ed25519(&ed)),
        ];
        for (alg, key) in cases {
            let err = Protocol::for_algorithm(alg)
                .verify(b"a.b", "c2ln", key)
                .unwrap_err();
            assert!(
                matches!(err, JwtError::Signature(SignatureError::AlgorithmConfusion { .. })),
                "{alg}: {err:?}"
            );
        }
    }
}
