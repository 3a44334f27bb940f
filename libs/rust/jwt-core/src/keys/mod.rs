//! Key material for each signing discipline.
//!
//! `Debug` output of every key type omits secret material.

pub mod ed25519;
pub mod rsa;
pub mod shared;

pub use ed25519::{Ed25519KeyPair, Ed25519PublicKey};
pub use rsa::{
    RSA_PUBLIC_KEY_SIZES, RSA_SECRET_KEY_SIZES, RsaSignatureKeyPair, RsaSignaturePublicKey,
    RsaSignatureSecretKey,
};
pub use shared::{MIN_SHARED_KEY_LEN, SharedKey};

use crate::error::KeyError;

/// Parse a PEM block and require `tag`.
pub(crate) fn pem_contents(input: &str, expected: &'static str, tag: &str) -> Result<Vec<u8>, KeyError> {
    let block = pem::parse(input).map_err(|e| KeyError::InvalidPem(e.to_string()))?;
    if block.tag() != tag {
        return Err(KeyError::WrongKeyType {
            expected,
            found: block.tag().to_string(),
        });
    }
    Ok(block.into_contents())
}
