use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use ring::hmac;
use subtle::ConstantTimeEq;

use crate::error::{JwtError, SignatureError};
use crate::jwt::Algorithm;
use crate::keys::SharedKey;
use crate::protocol::SymmetricProtocol;

/// HMAC using SHA-256.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hs256;

impl Hs256 {
    fn mac(signing_input: &[u8], key: &SharedKey) -> String {
        let key = hmac::Key::new(hmac::HMAC_SHA256, key.as_bytes());
        URL_SAFE_NO_PAD.encode(hmac::sign(&key, signing_input))
    }
}

impl SymmetricProtocol for Hs256 {
    const ALGORITHM: Algorithm = Algorithm::HS256;

    fn sign_symmetric(&self, signing_input: &[u8], key: &SharedKey) -> Result<String, JwtError> {
        Ok(Self::mac(signing_input, key))
    }

    fn verify_symmetric(
        &self,
        signing_input: &[u8],
        signature: &str,
        key: &SharedKey,
    ) -> Result<(), JwtError> {
        if signature.is_empty() {
            return Err(SignatureError::Empty.into());
        }
        // Compared as encoded text; unequal lengths compare unequal.
        let expected = Self::mac(signing_input, key);
        if bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            Ok(())
        } else {
            Err(SignatureError::Mismatch {
                algorithm: Self::ALGORITHM,
            }
            .into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::fixtures;

    fn secret() -> SharedKey {
        SharedKey::new(fixtures::HS256_SECRET.to_vec()).unwrap()
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let key = secret();
        let signature = Hs256.sign_symmetric(b"header.payload", &key).unwrap();
        Hs256.verify_symmetric(b"header.payload", &signature, &key).unwrap();
    }

    #[test]
    fn test_verify_fixture_token() {
        let (input, signature) = fixtures::HS256_TOKEN.rsplit_once('.').unwrap();
        Hs256
            .verify_symmetric(input.as_bytes(), signature, &secret())
            .unwrap();
    }

    #[test]
    fn test_wrong_secret_and_tampering() {
        let key = secret();
        let other = SharedKey::generate().unwrap();
        let signature = Hs256.sign_symmetric(b"header.payload", &key).unwrap();

        assert!(matches!(
            Hs256.verify_symmetric(b"header.payload", &signature, &other),
            Err(JwtError::Signature(SignatureError::Mismatch { .. }))
        ));
        assert!(Hs256.verify_symmetric(b"header.payloaX", &signature, &key).is_err());
        assert!(Hs256.verify_symmetric(b"header.payload", &signature[1..], &key).is_err());
        assert!(matches!(
            Hs256.verify_symmetric(b"header.payload", "", &key),
            Err(JwtError::Signature(SignatureError::Empty))
        ));
    }
}
