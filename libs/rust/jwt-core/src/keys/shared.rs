use ring::rand::{SecureRandom, SystemRandom};
use std::fmt;
use zeroize::Zeroizing;

use crate::error::KeyError;

/// Minimum HMAC-SHA256 secret length in bytes.
pub const MIN_SHARED_KEY_LEN: usize = 32;

/// HMAC secret. Zeroed on drop.
#[derive(Clone)]
pub struct SharedKey {
    bytes: Zeroizing<Vec<u8>>,
}

impl SharedKey {
    /// Wrap secret bytes.
    ///
    /// # Errors
    ///
    /// [`KeyError::SharedKeyTooShort`] below [`MIN_SHARED_KEY_LEN`] bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, KeyError> {
        let bytes = Zeroizing::new(bytes.into());
        if bytes.len() < MIN_SHARED_KEY_LEN {
            return Err(KeyError::SharedKeyTooShort {
                len: bytes.len(),
                min: MIN_SHARED_KEY_LEN,
            });
        }
        Ok(Self { bytes })
    }

    /// Random 32-byte secret.
    ///
    /// # Errors
    ///
    /// Fails if the system RNG is unavailable.
    pub fn generate() -> Result<Self, KeyError> {
        let mut bytes = Zeroizing::new(vec![0u8; MIN_SHARED_KEY_LEN]);
        SystemRandom::new()
            .fill(&mut bytes)
            .map_err(|_| KeyError::InvalidKeyMaterial("system RNG unavailable".into()))?;
        Ok(Self { bytes })
    }

    /// Secret length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; construction enforces a minimum length.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for SharedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedKey")
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimum_length() {
        assert_eq!(
            SharedKey::new(vec![1u8; 31]).unwrap_err(),
            KeyError::SharedKeyTooShort { len: 31, min: 32 }
        );
        assert_eq!(SharedKey::new(vec![1u8; 32]).unwrap().len(), 32);
    }

    #[test]
    fn test_generate_is_random() {
        let a = SharedKey::generate().unwrap();
        let b = SharedKey::generate().unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_debug_redacts() {
        let key = SharedKey::new(b"super-secret-value-0123456789abcdef".to_vec()).unwrap();
        assert!(!format!("{key:?}").contains("super-secret"));
    }
}
