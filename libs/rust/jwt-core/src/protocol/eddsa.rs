use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use ring::signature::{ED25519, UnparsedPublicKey};

use crate::error::{JwtError, Operation, SignatureError};
use crate::jwt::Algorithm;
use crate::protocol::{
    AsymmetricProtocol, SigningKey, VerificationKey, confusion, unsupported, wrong_signing_key,
};

/// Ed25519 detached signatures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdDsa;

impl AsymmetricProtocol for EdDsa {
    const ALGORITHM: Algorithm = Algorithm::EdDSA;

    fn sign(&self, signing_input: &[u8], key: SigningKey<'_>) -> Result<String, JwtError> {
        match key {
            SigningKey::Ed25519(pair) => Ok(URL_SAFE_NO_PAD.encode(pair.sign(signing_input))),
            SigningKey::Shared(_) => Err(unsupported(Self::ALGORITHM, Operation::SymmetricSigning)),
            SigningKey::Rsa(_) => Err(wrong_signing_key("Ed25519 private", key)),
        }
    }

    fn verify(
        &self,
        signing_input: &[u8],
        signature: &str,
        key: VerificationKey<'_>,
    ) -> Result<(), JwtError> {
        let VerificationKey::Ed25519(public) = key else {
            return Err(confusion(Self::ALGORITHM, key));
        };
        // Checked before the primitive sees the input.
        if signature.is_empty() {
            return Err(SignatureError::Empty.into());
        }
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| SignatureError::InvalidEncoding)?;
        if signature.is_empty() {
            return Err(SignatureError::Empty.into());
        }

        UnparsedPublicKey::new(&ED25519, public.as_bytes())
            .verify(signing_input, &signature)
            .map_err(|_| {
                SignatureError::Mismatch {
                    algorithm: Self::ALGORITHM,
                }
                .into()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{Ed25519KeyPair, RsaSignaturePublicKey};
    use test_utils::fixtures;

    #[test]
    fn test_sign_verify_roundtrip() {
        let pair = Ed25519KeyPair::generate().unwrap();
        let signature = EdDsa.sign(b"header.payload", SigningKey::Ed25519(&pair)).unwrap();
        EdDsa
            .verify(
                b"header.payload",
                &signature,
                VerificationKey::Ed25519(&pair.public_key()),
            )
            .unwrap();
    }

    #[test]
    fn test_different_key_pair_fails() {
        let pair = Ed25519KeyPair::generate().unwrap();
        let other = Ed25519KeyPair::generate().unwrap();
        let signature = EdDsa.sign(b"header.payload", SigningKey::Ed25519(&pair)).unwrap();

        assert!(matches!(
            EdDsa.verify(
                b"header.payload",
                &signature,
                VerificationKey::Ed25519(&other.public_key())
            ),
            Err(JwtError::Signature(SignatureError::Mismatch { .. }))
        ));
    }

    #[test]
    fn test_empty_signature_rejected_first() {
        let pair = Ed25519KeyPair::generate().unwrap();
        assert!(matches!(
            EdDsa.verify(b"a.b", "", VerificationKey::Ed25519(&pair.public_key())),
            Err(JwtError::Signature(SignatureError::Empty))
        ));
    }

    #[test]
    fn test_rsa_key_is_refused() {
        let public = RsaSignaturePublicKey::from_pem(fixtures::RSA_2048_PUBLIC_PEM).unwrap();
        assert!(matches!(
            EdDsa.verify(b"a.b", "c2ln", VerificationKey::Rsa(&public)),
            Err(JwtError::Signature(SignatureError::AlgorithmConfusion {
                algorithm: Algorithm::EdDSA,
                ..
            }))
        ));
        let rsa = crate::keys::RsaSignatureKeyPair::from_pem(fixtures::RSA_3072_A_PRIVATE_PEM)
            .unwrap();
        assert!(matches!(
            EdDsa.sign(b"a.b", SigningKey::Rsa(&rsa)),
            Err(JwtError::Key(_))
        ));
    }
}
