//! Error taxonomy for token handling and key resolution.
//!
//! Every failure is terminal for the call that raised it; nothing in this
//! crate retries. [`JwtError::is_retryable`] only tells callers whether a
//! retry of their own could plausibly succeed.

use chrono::{DateTime, Utc};
use rust_common::PlatformError;
use std::fmt;
use thiserror::Error;

use crate::jwt::Algorithm;

/// Top-level error returned by every fallible operation in this crate.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum JwtError {
    /// Token envelope or header is malformed
    #[error(transparent)]
    Structural(#[from] StructuralError),

    /// A time claim is invalid or violated
    #[error(transparent)]
    Claim(#[from] ClaimError),

    /// Signature did not verify
    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// No usable key could be selected for the token
    #[error(transparent)]
    KeyResolution(#[from] KeyResolutionError),

    /// The JWKS endpoint could not be reached or answered badly
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A JWKS document or JWK is malformed
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Key material is invalid or outside the accepted sizes
    #[error(transparent)]
    Key(#[from] KeyError),

    /// The protocol does not implement the requested key discipline
    #[error("{algorithm} does not support {operation}")]
    UnsupportedOperation {
        /// Algorithm whose protocol was asked
        algorithm: Algorithm,
        /// Operation that was requested
        operation: Operation,
    },

    /// Cache backend failed while storing or deleting
    #[error("Cache backend error: {0}")]
    Cache(#[from] PlatformError),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Signing disciplines a protocol may be asked for. Verification with the
/// wrong key discipline is reported as [`SignatureError::AlgorithmConfusion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Signing with a private key
    AsymmetricSigning,
    /// Signing with a shared secret
    SymmetricSigning,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AsymmetricSigning => "asymmetric signing",
            Self::SymmetricSigning => "symmetric signing",
        })
    }
}

/// Malformed token structure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    /// Token does not have exactly three dot-separated segments
    #[error("Token must have 3 segments, found {found}")]
    SegmentCount {
        /// Number of segments found
        found: usize,
    },

    /// Segment is empty or uses characters outside the base64url alphabet
    #[error("Token {segment} is not valid base64url")]
    InvalidSegment {
        /// Which segment failed
        segment: &'static str,
    },

    /// Segment is not UTF-8 JSON
    #[error("Token {segment} is not valid JSON: {reason}")]
    InvalidJson {
        /// Which segment failed
        segment: &'static str,
        /// Parser message
        reason: String,
    },

    /// Segment decoded to JSON that is not an object
    #[error("Token {segment} must be a JSON object")]
    NotAnObject {
        /// Which segment failed
        segment: &'static str,
    },

    /// Header lacks a string `alg`
    #[error("Token header is missing the alg parameter")]
    MissingAlgorithm,

    /// Header declares `alg: none`
    #[error("Unsigned tokens (alg=none) are not accepted")]
    AlgorithmNone,

    /// Header declares an algorithm outside RS256/HS256/EdDSA
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

/// Invalid or violated time claim.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClaimError {
    /// `exp` plus skew is in the past
    #[error("Token expired at {expired_at}")]
    Expired {
        /// Expiration instant from the token
        expired_at: DateTime<Utc>,
    },

    /// `nbf` minus skew is in the future
    #[error("Token not valid before {valid_from}")]
    NotYetValid {
        /// Not-before instant from the token
        valid_from: DateTime<Utc>,
    },

    /// `iat` minus skew is in the future
    #[error("Token issued in the future at {issued_at}")]
    IssuedInFuture {
        /// Issued-at instant from the token
        issued_at: DateTime<Utc>,
    },

    /// Timestamp claim is not a JSON number
    #[error("Claim {claim} must be a numeric timestamp")]
    NonNumeric {
        /// Claim name
        claim: String,
    },

    /// Timestamp claim lies outside years 2000..=2100
    #[error("Claim {claim} timestamp {value} is out of range")]
    OutOfRange {
        /// Claim name
        claim: String,
        /// Offending value
        value: f64,
    },
}

/// Signature verification failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// Signature does not match the signing input under the given key
    #[error("{algorithm} signature verification failed")]
    Mismatch {
        /// Algorithm that was checked
        algorithm: Algorithm,
    },

    /// Signature segment is empty
    #[error("Signature is empty")]
    Empty,

    /// Signature segment is not base64url
    #[error("Signature is not valid base64url")]
    InvalidEncoding,

    /// Key type does not belong to the declared algorithm
    #[error("{algorithm} cannot be verified with a {key_type} key")]
    AlgorithmConfusion {
        /// Algorithm declared by the token
        algorithm: Algorithm,
        /// Kind of key that was supplied
        key_type: &'static str,
    },
}

/// Key selection failure for JWKS-backed verification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyResolutionError {
    /// Token header carries no `kid`
    #[error("Token header has no kid")]
    MissingKeyId,

    /// No JWK with the token's `kid`
    #[error("key_not_found: no key with kid {kid}")]
    KeyNotFound {
        /// Requested key id
        kid: String,
    },

    /// JWK cannot verify this token
    #[error("Key {kid} is not usable: {reason}")]
    UnsupportedKey {
        /// Key id
        kid: String,
        /// Why the key was refused
        reason: String,
    },
}

/// JWKS fetch failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Endpoint answered with a non-200 status
    #[error("JWKS fetch failed with status {status} {reason}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Reason phrase
        reason: String,
    },

    /// Endpoint answered 200 with an empty body
    #[error("JWKS fetch returned an empty body")]
    EmptyBody,

    /// Connection or protocol failure
    #[error("JWKS fetch network error: {0}")]
    Network(String),

    /// Request exceeded its timeout
    #[error("JWKS fetch timed out: {0}")]
    Timeout(String),
}

/// Malformed JWKS document, JWK or JWKS URI.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Document is not JSON
    #[error("JWKS is not valid JSON: {0}")]
    InvalidJson(String),

    /// Document root is not an object
    #[error("JWKS root must be a JSON object")]
    RootMustBeObject,

    /// Document has no `keys` member
    #[error("JWKS is missing the keys member")]
    MissingKeys,

    /// `keys` is not an array
    #[error("JWKS keys member must be an array")]
    KeysMustBeArray,

    /// `keys` is empty
    #[error("JWKS contains no keys")]
    EmptyKeySet,

    /// An element of `keys` is not an object
    #[error("JWKS key at index {index} must be a JSON object")]
    KeyMustBeObject {
        /// Position in `keys`
        index: usize,
    },

    /// A required JWK member is absent or not a string
    #[error("JWK is missing required member {field}")]
    MissingField {
        /// Member name
        field: &'static str,
    },

    /// A JWK member has an unacceptable value
    #[error("JWK member {field} is invalid: {reason}")]
    InvalidField {
        /// Member name
        field: &'static str,
        /// Why it was refused
        reason: String,
    },

    /// JWKS URI is not an absolute HTTPS URL
    #[error("Invalid JWKS URI {uri}: {reason}")]
    InvalidUri {
        /// Offending input
        uri: String,
        /// Why it was refused
        reason: String,
    },
}

/// Invalid key material.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// PEM framing or DER body could not be parsed
    #[error("Invalid PEM: {0}")]
    InvalidPem(String),

    /// Key parsed but is of the wrong kind
    #[error("Expected {expected} key, found {found}")]
    WrongKeyType {
        /// Kind the caller needed
        expected: &'static str,
        /// Kind that was supplied
        found: String,
    },

    /// RSA modulus size is not permitted for this use
    #[error("RSA key size {bits} is not one of {allowed:?}")]
    DisallowedKeySize {
        /// Modulus size in bits
        bits: usize,
        /// Permitted sizes
        allowed: &'static [usize],
    },

    /// Public key does not belong to the secret key
    #[error("Public key does not match secret key")]
    MismatchedKeyPair,

    /// Shared secret is too short for HMAC-SHA256
    #[error("Shared key must be at least {min} bytes, got {len}")]
    SharedKeyTooShort {
        /// Supplied length
        len: usize,
        /// Minimum length
        min: usize,
    },

    /// Key bytes rejected by the crypto backend
    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),
}

impl JwtError {
    /// Whether the token was well-formed and signed but has expired, so the
    /// caller should obtain a fresh one rather than treat it as malicious.
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        matches!(self, Self::Claim(ClaimError::Expired { .. }))
    }

    /// Whether a caller-initiated retry might succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(TransportError::Network(_) | TransportError::Timeout(_)) => true,
            Self::Transport(TransportError::Status { status, .. }) => *status >= 500,
            Self::Cache(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Stable machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Structural(StructuralError::AlgorithmNone) => "JWT_ALG_NONE",
            Self::Structural(_) => "JWT_MALFORMED",
            Self::Claim(ClaimError::Expired { .. }) => "JWT_EXPIRED",
            Self::Claim(ClaimError::NotYetValid { .. }) => "JWT_NOT_YET_VALID",
            Self::Claim(ClaimError::IssuedInFuture { .. }) => "JWT_ISSUED_IN_FUTURE",
            Self::Claim(_) => "JWT_CLAIM_INVALID",
            Self::Signature(SignatureError::AlgorithmConfusion { .. }) => "JWT_KEY_ALG_MISMATCH",
            Self::Signature(_) => "JWT_SIGNATURE_INVALID",
            Self::KeyResolution(KeyResolutionError::KeyNotFound { .. }) => "JWKS_KEY_NOT_FOUND",
            Self::KeyResolution(_) => "JWKS_KEY_UNUSABLE",
            Self::Transport(_) => "JWKS_FETCH_FAILED",
            Self::Format(_) => "JWKS_MALFORMED",
            Self::Key(_) => "KEY_INVALID",
            Self::UnsupportedOperation { .. } => "UNSUPPORTED_OPERATION",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expired_is_distinct_from_invalid() {
        let expired: JwtError = ClaimError::Expired {
            expired_at: Utc::now(),
        }
        .into();
        let future: JwtError = ClaimError::NotYetValid {
            valid_from: Utc::now(),
        }
        .into();

        assert!(expired.is_expired());
        assert!(!future.is_expired());
        assert_ne!(expired.error_code(), future.error_code());
    }

    #[test]
    fn test_retryability() {
        assert!(JwtError::from(TransportError::Timeout("10s".into())).is_retryable());
        assert!(JwtError::from(TransportError::Network("reset".into())).is_retryable());
        assert!(
            JwtError::from(TransportError::Status {
                status: 503,
                reason: "Service Unavailable".into()
            })
            .is_retryable()
        );
        assert!(
            !JwtError::from(TransportError::Status {
                status: 404,
                reason: "Not Found".into()
            })
            .is_retryable()
        );
        assert!(!JwtError::from(SignatureError::Empty).is_retryable());
        assert!(!JwtError::from(FormatError::EmptyKeySet).is_retryable());
    }

    #[test]
    fn test_unsupported_operation_message() {
        let err = JwtError::UnsupportedOperation {
            algorithm: Algorithm::HS256,
            operation: Operation::AsymmetricSigning,
        };
        assert_eq!(err.to_string(), "HS256 does not support asymmetric signing");
    }

    #[test]
    fn test_key_not_found_message() {
        let err = JwtError::from(KeyResolutionError::KeyNotFound {
            kid: "k1".to_string(),
        });
        assert!(err.to_string().starts_with("key_not_found"));
        assert_eq!(err.error_code(), "JWKS_KEY_NOT_FOUND");
    }
}
