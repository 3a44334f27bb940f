//! RSA keys for RS256.
//!
//! Verification accepts smaller moduli than signing produces: public keys
//! may be 2048 bits, secret keys must be at least 3072.

use jsonwebtoken::{DecodingKey, EncodingKey};
use ring::signature::RsaKeyPair;
use std::fmt;
use x509_parser::prelude::{FromDer, SubjectPublicKeyInfo};
use x509_parser::public_key::PublicKey;

use crate::asn1;
use crate::error::KeyError;
use crate::keys::pem_contents;

/// Modulus sizes accepted for verification.
pub const RSA_PUBLIC_KEY_SIZES: &[usize] = &[2048, 3072, 4096];

/// Modulus sizes accepted for signing.
pub const RSA_SECRET_KEY_SIZES: &[usize] = &[3072, 4096];

/// RSA public key loaded from a SubjectPublicKeyInfo.
#[derive(Clone)]
pub struct RsaSignaturePublicKey {
    rsa_der: Vec<u8>,
    key_size: usize,
    decoding_key: DecodingKey,
}

impl RsaSignaturePublicKey {
    /// Load a `PUBLIC KEY` PEM block.
    ///
    /// # Errors
    ///
    /// Fails on malformed PEM, a non-RSA key, or a modulus size outside
    /// [`RSA_PUBLIC_KEY_SIZES`].
    pub fn from_pem(pem: &str) -> Result<Self, KeyError> {
        let der = pem_contents(pem, "RSA public", "PUBLIC KEY")?;
        Self::from_spki_der(&der)
    }

    /// Load a DER SubjectPublicKeyInfo.
    ///
    /// # Errors
    ///
    /// As [`Self::from_pem`].
    pub fn from_spki_der(der: &[u8]) -> Result<Self, KeyError> {
        let (_, spki) = SubjectPublicKeyInfo::from_der(der)
            .map_err(|e| KeyError::InvalidPem(e.to_string()))?;

        let modulus = match spki.parsed() {
            Ok(PublicKey::RSA(rsa)) => rsa.modulus,
            Ok(other) => {
                return Err(KeyError::WrongKeyType {
                    expected: "RSA public",
                    found: public_key_kind(&other).to_string(),
                });
            }
            Err(e) => return Err(KeyError::InvalidKeyMaterial(e.to_string())),
        };
        let key_size = modulus_bits(modulus);
        check_size(key_size, RSA_PUBLIC_KEY_SIZES)?;

        let rsa_der: &[u8] = spki.subject_public_key.data.as_ref();
        let rsa_der = rsa_der.to_vec();
        let decoding_key = DecodingKey::from_rsa_der(&rsa_der);

        Ok(Self {
            rsa_der,
            key_size,
            decoding_key,
        })
    }

    /// Modulus size in bits.
    #[must_use]
    pub const fn key_size(&self) -> usize {
        self.key_size
    }

    /// PEM `PUBLIC KEY` encoding.
    #[must_use]
    pub fn to_pem(&self) -> String {
        asn1::public_key_pem(&asn1::subject_public_key_info(&self.rsa_der))
    }

    pub(crate) const fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

impl fmt::Debug for RsaSignaturePublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaSignaturePublicKey")
            .field("key_size", &self.key_size)
            .finish_non_exhaustive()
    }
}

/// RSA private key loaded from PKCS#8 or PKCS#1 PEM.
#[derive(Clone)]
pub struct RsaSignatureSecretKey {
    encoding_key: EncodingKey,
    key_size: usize,
    public_der: Vec<u8>,
}

impl RsaSignatureSecretKey {
    /// Load a `PRIVATE KEY` or `RSA PRIVATE KEY` PEM block.
    ///
    /// # Errors
    ///
    /// Fails on malformed PEM, a non-RSA key, or a modulus size outside
    /// [`RSA_SECRET_KEY_SIZES`].
    pub fn from_pem(pem: &str) -> Result<Self, KeyError> {
        let block = pem::parse(pem).map_err(|e| KeyError::InvalidPem(e.to_string()))?;
        let key_pair = match block.tag() {
            "PRIVATE KEY" => RsaKeyPair::from_pkcs8(block.contents()),
            "RSA PRIVATE KEY" => RsaKeyPair::from_der(block.contents()),
            other => {
                return Err(KeyError::WrongKeyType {
                    expected: "RSA private",
                    found: other.to_string(),
                });
            }
        }
        .map_err(|e| KeyError::InvalidKeyMaterial(e.to_string()))?;

        let key_size = key_pair.public().modulus_len() * 8;
        check_size(key_size, RSA_SECRET_KEY_SIZES)?;

        let encoding_key = EncodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| KeyError::InvalidKeyMaterial(e.to_string()))?;

        Ok(Self {
            encoding_key,
            key_size,
            public_der: key_pair.public().as_ref().to_vec(),
        })
    }

    /// Modulus size in bits.
    #[must_use]
    pub const fn key_size(&self) -> usize {
        self.key_size
    }

    /// Derive the matching public key.
    ///
    /// # Errors
    ///
    /// Only if the derived key fails to re-parse, which indicates a backend fault.
    pub fn public_key(&self) -> Result<RsaSignaturePublicKey, KeyError> {
        RsaSignaturePublicKey::from_spki_der(&asn1::subject_public_key_info(&self.public_der))
    }

    pub(crate) const fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }
}

impl fmt::Debug for RsaSignatureSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaSignatureSecretKey")
            .field("key_size", &self.key_size)
            .finish_non_exhaustive()
    }
}

/// Matched secret and public key of one size.
#[derive(Debug, Clone)]
pub struct RsaSignatureKeyPair {
    secret: RsaSignatureSecretKey,
    public: RsaSignaturePublicKey,
}

impl RsaSignatureKeyPair {
    /// Pair two keys.
    ///
    /// # Errors
    ///
    /// [`KeyError::MismatchedKeyPair`] unless `public` was derived from `secret`.
    pub fn new(secret: RsaSignatureSecretKey, public: RsaSignaturePublicKey) -> Result<Self, KeyError> {
        if secret.key_size != public.key_size || secret.public_der != public.rsa_der {
            return Err(KeyError::MismatchedKeyPair);
        }
        Ok(Self { secret, public })
    }

    /// Load the secret key and derive its public half.
    ///
    /// # Errors
    ///
    /// As [`RsaSignatureSecretKey::from_pem`].
    pub fn from_pem(secret_pem: &str) -> Result<Self, KeyError> {
        let secret = RsaSignatureSecretKey::from_pem(secret_pem)?;
        let public = secret.public_key()?;
        Ok(Self { secret, public })
    }

    /// Load both halves and check they match.
    ///
    /// # Errors
    ///
    /// As [`Self::new`] plus the loaders' errors.
    pub fn from_pems(secret_pem: &str, public_pem: &str) -> Result<Self, KeyError> {
        Self::new(
            RsaSignatureSecretKey::from_pem(secret_pem)?,
            RsaSignaturePublicKey::from_pem(public_pem)?,
        )
    }

    /// Secret half.
    #[must_use]
    pub const fn secret(&self) -> &RsaSignatureSecretKey {
        &self.secret
    }

    /// Public half.
    #[must_use]
    pub const fn public(&self) -> &RsaSignaturePublicKey {
        &self.public
    }

    /// Modulus size in bits.
    #[must_use]
    pub const fn key_size(&self) -> usize {
        self.public.key_size
    }
}

fn check_size(bits: usize, allowed: &'static [usize]) -> Result<(), KeyError> {
    if allowed.contains(&bits) {
        Ok(())
    } else {
        Err(KeyError::DisallowedKeySize { bits, allowed })
    }
}

fn modulus_bits(modulus: &[u8]) -> usize {
    let start = modulus.iter().position(|b| *b != 0).unwrap_or(modulus.len());
    let significant = &modulus[start..];
    significant
        .first()
        .map_or(0, |first| significant.len() * 8 - first.leading_zeros() as usize)
}

const fn public_key_kind(key: &PublicKey<'_>) -> &'static str {
    match key {
        PublicKey::RSA(_) => "RSA",
        PublicKey::EC(_) => "EC",
        PublicKey::DSA(_) => "DSA",
        _ => "unknown",
    }
}
