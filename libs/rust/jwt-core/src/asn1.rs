//! Minimal ASN.1 DER encoder for RSA public keys.
//!
//! Builds a SubjectPublicKeyInfo from JWK `n` and `e` so a JWKS key can be
//! handed to the RS256 protocol as a `PUBLIC KEY` PEM. Every length prefix
//! and padding byte matters: a wrong one makes verification fail silently.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use pem::{EncodeConfig, LineEnding, Pem};

use crate::error::FormatError;

const TAG_INTEGER: u8 = 0x02;
const TAG_BIT_STRING: u8 = 0x03;
const TAG_NULL: u8 = 0x05;
const TAG_OID: u8 = 0x06;
const TAG_SEQUENCE: u8 = 0x30;

/// rsaEncryption, 1.2.840.113549.1.1.1
pub const RSA_ENCRYPTION_OID: [u64; 7] = [1, 2, 840, 113_549, 1, 1, 1];

/// Definite length: short form below 128, else `0x80 | n` and `n`
/// big-endian bytes.
#[must_use]
pub fn encode_length(len: usize) -> Vec<u8> {
    if len < 0x80 {
        #[allow(clippy::cast_possible_truncation)]
        return vec![len as u8];
    }
    let bytes = len.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    let significant = &bytes[skip..];

    let mut out = Vec::with_capacity(significant.len() + 1);
    #[allow(clippy::cast_possible_truncation)]
    out.push(0x80 | significant.len() as u8);
    out.extend_from_slice(significant);
    out
}

fn tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    out.extend(encode_length(content.len()));
    out.extend_from_slice(content);
    out
}

/// Unsigned big-endian integer. Redundant leading zeros are dropped and a
/// `0x00` is prepended when the high bit is set.
#[must_use]
pub fn encode_integer(unsigned: &[u8]) -> Vec<u8> {
    let skip = unsigned.iter().take_while(|b| **b == 0).count();
    let trimmed = &unsigned[skip..];

    let mut content = Vec::with_capacity(trimmed.len() + 1);
    match trimmed.first() {
        None => content.push(0),
        Some(first) if first & 0x80 != 0 => content.push(0),
        Some(_) => {}
    }
    content.extend_from_slice(trimmed);
    tlv(TAG_INTEGER, &content)
}

/// SEQUENCE of already-encoded elements.
#[must_use]
pub fn encode_sequence(elements: &[&[u8]]) -> Vec<u8> {
    tlv(TAG_SEQUENCE, &elements.concat())
}

/// OBJECT IDENTIFIER from its arcs. The first two arcs share one byte;
/// the rest are base-128 with continuation bits.
#[must_use]
pub fn encode_oid(arcs: &[u64]) -> Vec<u8> {
    let first = arcs.first().copied().unwrap_or(0);
    let second = arcs.get(1).copied().unwrap_or(0);

    let mut content = Vec::new();
    push_base128(&mut content, first * 40 + second);
    for arc in arcs.iter().skip(2) {
        push_base128(&mut content, *arc);
    }
    tlv(TAG_OID, &content)
}

fn push_base128(out: &mut Vec<u8>, mut value: u64) {
    let mut groups = Vec::new();
    loop {
        #[allow(clippy::cast_possible_truncation)]
        groups.push((value & 0x7f) as u8);
        value >>= 7;
        if value == 0 {
            break;
        }
    }
    let last = groups.len() - 1;
    for (i, group) in groups.iter().rev().enumerate() {
        out.push(if i == last { *group } else { group | 0x80 });
    }
}

/// NULL
#[must_use]
pub fn encode_null() -> Vec<u8> {
    vec![TAG_NULL, 0x00]
}

/// BIT STRING with zero unused bits.
#[must_use]
pub fn encode_bitstring(bytes: &[u8]) -> Vec<u8> {
    let mut content = Vec::with_capacity(bytes.len() + 1);
    content.push(0x00);
    content.extend_from_slice(bytes);
    tlv(TAG_BIT_STRING, &content)
}

/// PKCS#1 `RSAPublicKey ::= SEQUENCE { modulus INTEGER, publicExponent INTEGER }`
#[must_use]
pub fn rsa_public_key(modulus: &[u8], exponent: &[u8]) -> Vec<u8> {
    encode_sequence(&[&encode_integer(modulus), &encode_integer(exponent)])
}

/// Wrap a PKCS#1 RSA key in a SubjectPublicKeyInfo with the rsaEncryption
/// AlgorithmIdentifier.
#[must_use]
pub fn subject_public_key_info(rsa_public_key: &[u8]) -> Vec<u8> {
    let algorithm = encode_sequence(&[&encode_oid(&RSA_ENCRYPTION_OID), &encode_null()]);
    encode_sequence(&[&algorithm, &encode_bitstring(rsa_public_key)])
}

/// `-----BEGIN PUBLIC KEY-----` block, 64-column base64, LF line endings.
#[must_use]
pub fn public_key_pem(spki_der: &[u8]) -> String {
    let config = EncodeConfig::new().set_line_ending(LineEnding::LF);
    pem::encode_config(&Pem::new("PUBLIC KEY", spki_der), config)
}

/// Convert JWK RSA components to a `PUBLIC KEY` PEM.
///
/// # Errors
///
/// Fails when `n` or `e` is empty or not base64url.
pub fn jwk_to_pem(n: &str, e: &str) -> Result<String, FormatError> {
    let modulus = decode_component("n", n)?;
    let exponent = decode_component("e", e)?;
    let spki = subject_public_key_info(&rsa_public_key(&modulus, &exponent));
    Ok(public_key_pem(&spki))
}

fn decode_component(field: &'static str, value: &str) -> Result<Vec<u8>, FormatError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(value)
        .map_err(|e| FormatError::InvalidField {
            field,
            reason: e.to_string(),
        })?;
    if bytes.iter().all(|b| *b == 0) {
        return Err(FormatError::InvalidField {
            field,
            reason: "must be a positive integer".to_string(),
        });
    }
    Ok(bytes)
}
