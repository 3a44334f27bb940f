use jsonwebtoken::crypto;
use jsonwebtoken::errors::ErrorKind;

use crate::error::{JwtError, KeyError, Operation, SignatureError};
use crate::jwt::Algorithm;
use crate::protocol::{
    AsymmetricProtocol, SigningKey, VerificationKey, confusion, unsupported, wrong_signing_key,
};

/// RSASSA-PKCS1-v1_5 using SHA-256.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rs256;

impl AsymmetricProtocol for Rs256 {
    const ALGORITHM: Algorithm = Algorithm::RS256;

    fn sign(&self, signing_input: &[u8], key: SigningKey<'_>) -> Result<String, JwtError> {
        let pair = match key {
            SigningKey::Rsa(pair) => pair,
            SigningKey::Shared(_) => {
                return Err(unsupported(Self::ALGORITHM, Operation::SymmetricSigning));
            }
            SigningKey::Ed25519(_) => return Err(wrong_signing_key("RSA private", key)),
        };
        crypto::sign(
            signing_input,
            pair.secret().encoding_key(),
            jsonwebtoken::Algorithm::RS256,
        )
        .map_err(|e| KeyError::InvalidKeyMaterial(e.to_string()).into())
    }

    fn verify(
        &self,
        signing_input: &[u8],
        signature: &str,
        key: VerificationKey<'_>,
    ) -> Result<(), JwtError> {
        // Anything but an RSA public key is refused, whatever the header says.
        let VerificationKey::Rsa(public) = key else {
            return Err(confusion(Self::ALGORITHM, key));
        };
        if signature.is_empty() {
            return Err(SignatureError::Empty.into());
        }

        match crypto::verify(
            signature,
            signing_input,
            public.decoding_key(),
            jsonwebtoken::Algorithm::RS256,
        ) {
            Ok(true) => Ok(()),
            Ok(false) => Err(SignatureError::Mismatch {
                algorithm: Self::ALGORITHM,
            }
            .into()),
            Err(e) if matches!(e.kind(), ErrorKind::Base64(_)) => {
                Err(SignatureError::InvalidEncoding.into())
            }
            Err(_) => Err(SignatureError::Mismatch {
                algorithm: Self::ALGORITHM,
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{RsaSignatureKeyPair, RsaSignaturePublicKey, SharedKey};
    use test_utils::fixtures;

    fn pair_a() -> RsaSignatureKeyPair {
        RsaSignatureKeyPair::from_pem(fixtures::RSA_3072_A_PRIVATE_PEM).unwrap()
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let pair = pair_a();
        let signature = Rs256.sign(b"header.payload", SigningKey::Rsa(&pair)).unwrap();
        Rs256
            .verify(b"header.payload", &signature, VerificationKey::Rsa(pair.public()))
            .unwrap();
    }

    #[test]
    fn test_verify_fixture_token() {
        let public = RsaSignaturePublicKey::from_pem(fixtures::RSA_3072_A_PUBLIC_PEM).unwrap();
        let (input, signature) = fixtures::RS256_TOKEN_KEY_A.rsplit_once('.').unwrap();
        Rs256
            .verify(input.as_bytes(), signature, VerificationKey::Rsa(&public))
            .unwrap();
    }

    #[test]
    fn test_other_key_pair_mismatches() {
        let pair = pair_a();
        let other = RsaSignaturePublicKey::from_pem(fixtures::RSA_3072_B_PUBLIC_PEM).unwrap();
        let signature = Rs256.sign(b"header.payload", SigningKey::Rsa(&pair)).unwrap();

        let err = Rs256
            .verify(b"header.payload", &signature, VerificationKey::Rsa(&other))
            .unwrap_err();
        assert!(matches!(
            err,
            JwtError::Signature(SignatureError::Mismatch {
                algorithm: Algorithm::RS256
            })
        ));
    }

    #[test]
    fn test_shared_key_is_algorithm_confusion() {
        let secret = SharedKey::new(fixtures::HS256_SECRET.to_vec()).unwrap();
        let (input, signature) = fixtures::RS256_TOKEN_KEY_A.rsplit_once('.').unwrap();

        let err = Rs256
            .verify(input.as_bytes(), signature, VerificationKey::Shared(&secret))
            .unwrap_err();
        assert!(matches!(
            err,
            JwtError::Signature(SignatureError::AlgorithmConfusion {
                algorithm: Algorithm::RS256,
                key_type: "shared",
            })
        ));
    }

    #[test]
    fn test_empty_and_garbage_signatures() {
        let public = RsaSignaturePublicKey::from_pem(fixtures::RSA_3072_A_PUBLIC_PEM).unwrap();
        assert!(matches!(
            Rs256.verify(b"a.b", "", VerificationKey::Rsa(&public)),
            Err(JwtError::Signature(SignatureError::Empty))
        ));
        assert!(matches!(
            Rs256.verify(b"a.b", "!!!", VerificationKey::Rsa(&public)),
            Err(JwtError::Signature(SignatureError::InvalidEncoding))
        ));
    }
}
