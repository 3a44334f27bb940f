//! Immutable three-segment token envelope.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use std::fmt;
use std::str::FromStr;

use crate::error::StructuralError;
use crate::jwt::claims::JwtPayload;
use crate::jwt::decoded::DecodedJwtToken;
use crate::jwt::header::{Algorithm, JwtHeader};

const SEGMENTS: [&str; 3] = ["header", "payload", "signature"];

/// A structurally valid compact JWS.
///
/// Parsing is the only validation point: once a `Jwt` exists its segments
/// are base64url, its header is a JSON object and its `alg` is one of
/// [`Algorithm::ALL`]. Claims and signature are not checked here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Jwt {
    value: String,
    header: JwtHeader,
    header_json: String,
    payload_json: String,
}

impl Jwt {
    /// Parse and structurally validate a token string.
    ///
    /// # Errors
    ///
    /// Returns [`StructuralError`] on a wrong segment count, an empty or
    /// non-base64url segment, a header or payload that is not UTF-8, or a
    /// header whose `alg` is missing, `none` or unsupported.
    pub fn parse(value: impl Into<String>) -> Result<Self, StructuralError> {
        let value = value.into();
        let parts: Vec<&str> = value.split('.').collect();
        if parts.len() != SEGMENTS.len() {
            return Err(StructuralError::SegmentCount { found: parts.len() });
        }
        for (part, segment) in parts.iter().zip(SEGMENTS) {
            if !is_base64url(part) {
                return Err(StructuralError::InvalidSegment { segment });
            }
        }

        let header_json = decode_segment(parts[0], "header")?;
        let header = JwtHeader::from_json(&header_json)?;
        let payload_json = decode_segment(parts[1], "payload")?;

        Ok(Self {
            value,
            header,
            header_json,
            payload_json,
        })
    }

    /// Full token string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Decoded header JSON.
    #[must_use]
    pub fn header(&self) -> &str {
        &self.header_json
    }

    /// Decoded payload JSON.
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload_json
    }

    /// Raw base64url signature segment.
    #[must_use]
    pub fn signature(&self) -> &str {
        self.value
            .rsplit_once('.')
            .map_or("", |(_, signature)| signature)
    }

    /// The `header.payload` prefix that was signed.
    #[must_use]
    pub fn signing_input(&self) -> &str {
        self.value
            .rsplit_once('.')
            .map_or("", |(input, _)| input)
    }

    /// Algorithm declared in the header.
    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.header.algorithm()
    }

    /// `kid` declared in the header.
    #[must_use]
    pub fn key_id(&self) -> Option<&str> {
        self.header.key_id()
    }

    /// Decode header and payload into typed views. Time claims are not
    /// checked; see [`DecodedJwtToken::validate_time_claims`].
    ///
    /// # Errors
    ///
    /// Fails when the payload is not a JSON object.
    pub fn decode(&self) -> Result<DecodedJwtToken, StructuralError> {
        let payload = JwtPayload::from_json(&self.payload_json)?;
        Ok(DecodedJwtToken::new(self.header.clone(), payload))
    }
}

impl FromStr for Jwt {
    type Err = StructuralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Jwt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

fn is_base64url(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

fn decode_segment(segment: &str, name: &'static str) -> Result<String, StructuralError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| StructuralError::InvalidSegment { segment: name })?;
    String::from_utf8(bytes).map_err(|e| StructuralError::InvalidJson {
        segment: name,
        reason: e.to_string(),
    })
}
