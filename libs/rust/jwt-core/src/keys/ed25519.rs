use ring::rand::SystemRandom;
use ring::signature::{self, KeyPair};
use std::fmt;

use crate::error::KeyError;
use crate::keys::pem_contents;

/// DER prefix of an Ed25519 SubjectPublicKeyInfo, followed by the 32 key bytes.
const ED25519_SPKI_PREFIX: [u8; 12] = [
    0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00,
];

const ED25519_PUBLIC_KEY_LEN: usize = 32;

/// Ed25519 signing key.
pub struct Ed25519KeyPair {
    inner: signature::Ed25519KeyPair,
}

impl Ed25519KeyPair {
    /// Fresh random key pair.
    ///
    /// # Errors
    ///
    /// Fails if the system RNG is unavailable.
    pub fn generate() -> Result<Self, KeyError> {
        let rng = SystemRandom::new();
        let pkcs8 = signature::Ed25519KeyPair::generate_pkcs8(&rng)
            .map_err(|_| KeyError::InvalidKeyMaterial("system RNG unavailable".into()))?;
        Self::from_pkcs8(pkcs8.as_ref())
    }

    /// Load a PKCS#8 v1 or v2 document.
    ///
    /// # Errors
    ///
    /// Fails when the document is not an Ed25519 private key.
    pub fn from_pkcs8(der: &[u8]) -> Result<Self, KeyError> {
        signature::Ed25519KeyPair::from_pkcs8_maybe_unchecked(der)
            .map(|inner| Self { inner })
            .map_err(|e| KeyError::InvalidKeyMaterial(e.to_string()))
    }

    /// Load a `PRIVATE KEY` PEM block.
    ///
    /// # Errors
    ///
    /// As [`Self::from_pkcs8`] plus PEM framing errors.
    pub fn from_pem(pem: &str) -> Result<Self, KeyError> {
        Self::from_pkcs8(&pem_contents(pem, "Ed25519 private", "PRIVATE KEY")?)
    }

    /// Public half.
    #[must_use]
    pub fn public_key(&self) -> Ed25519PublicKey {
        let mut bytes = [0u8; ED25519_PUBLIC_KEY_LEN];
        bytes.copy_from_slice(self.inner.public_key().as_ref());
        Ed25519PublicKey { bytes }
    }

    pub(crate) fn sign(&self, message: &[u8]) -> signature::Signature {
        self.inner.sign(message)
    }
}

impl fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ed25519KeyPair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// Ed25519 verification key.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ed25519PublicKey {
    bytes: [u8; ED25519_PUBLIC_KEY_LEN],
}

impl Ed25519PublicKey {
    /// Wrap raw 32-byte key.
    ///
    /// # Errors
    ///
    /// Fails on any other length.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let bytes = bytes.try_into().map_err(|_| {
            KeyError::InvalidKeyMaterial(format!(
                "Ed25519 public key must be {ED25519_PUBLIC_KEY_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self { bytes })
    }

    /// Load a `PUBLIC KEY` PEM block.
    ///
    /// # Errors
    ///
    /// Fails when the block is not an Ed25519 SubjectPublicKeyInfo.
    pub fn from_pem(pem: &str) -> Result<Self, KeyError> {
        let der = pem_contents(pem, "Ed25519 public", "PUBLIC KEY")?;
        let raw = der
            .strip_prefix(ED25519_SPKI_PREFIX.as_slice())
            .ok_or_else(|| KeyError::WrongKeyType {
                expected: "Ed25519 public",
                found: "non-Ed25519 SubjectPublicKeyInfo".to_string(),
            })?;
        Self::from_bytes(raw)
    }

    /// Raw key bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ED25519_PUBLIC_KEY_LEN] {
        &self.bytes
    }
}

impl fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Ed25519PublicKey")
            .field(&hex_prefix(&self.bytes))
            .finish()
    }
}

fn hex_prefix(bytes: &[u8]) -> String {
    bytes.iter().take(4).map(|b| format!("{b:02x}")).collect()
}
