//! JOSE header and the closed set of accepted algorithms.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::StructuralError;

/// Signature algorithms this crate accepts. Anything else, `none` included,
/// is rejected when a header is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// RSASSA-PKCS1-v1_5 with SHA-256
    RS256,
    /// HMAC with SHA-256
    HS256,
    /// Ed25519
    EdDSA,
}

impl Algorithm {
    /// Every accepted algorithm.
    pub const ALL: [Self; 3] = [Self::RS256, Self::HS256, Self::EdDSA];

    /// JOSE `alg` value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RS256 => "RS256",
            Self::HS256 => "HS256",
            Self::EdDSA => "EdDSA",
        }
    }

    /// Whether the algorithm uses a public/secret key pair.
    #[must_use]
    pub const fn is_asymmetric(self) -> bool {
        !matches!(self, Self::HS256)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = StructuralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("none") {
            return Err(StructuralError::AlgorithmNone);
        }
        Self::ALL
            .into_iter()
            .find(|alg| alg.as_str() == s)
            .ok_or_else(|| StructuralError::UnsupportedAlgorithm(s.to_string()))
    }
}

/// Decoded JOSE header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwtHeader {
    algorithm: Algorithm,
    token_type: String,
    key_id: Option<String>,
}

impl JwtHeader {
    /// Header with `typ: JWT` and no `kid`.
    #[must_use]
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            token_type: "JWT".to_string(),
            key_id: None,
        }
    }

    /// Set the `kid`.
    #[must_use]
    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    /// Declared algorithm.
    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// `typ`
    #[must_use]
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// `kid`, when present.
    #[must_use]
    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    /// Parse decoded header JSON.
    ///
    /// # Errors
    ///
    /// Fails when the JSON is not an object, has no string `alg`, declares
    /// `none`, or names an algorithm outside [`Algorithm::ALL`].
    pub fn from_json(json: &str) -> Result<Self, StructuralError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| StructuralError::InvalidJson {
                segment: "header",
                reason: e.to_string(),
            })?;
        let Value::Object(object) = value else {
            return Err(StructuralError::NotAnObject { segment: "header" });
        };

        let algorithm = object
            .get("alg")
            .and_then(Value::as_str)
            .ok_or(StructuralError::MissingAlgorithm)?
            .parse::<Algorithm>()?;

        let token_type = object
            .get("typ")
            .and_then(Value::as_str)
            .unwrap_or("JWT")
            .to_string();
        let key_id = object.get("kid").and_then(Value::as_str).map(str::to_string);

        Ok(Self {
            algorithm,
            token_type,
            key_id,
        })
    }

    /// Canonical JSON: `alg`, `typ`, then `kid` when set.
    #[must_use]
    pub fn to_json(&self) -> String {
        let wire = WireHeader {
            alg: self.algorithm,
            typ: &self.token_type,
            kid: self.key_id.as_deref(),
        };
        serde_json::to_string(&wire).unwrap_or_default()
    }
}

/// Field order here is the serialized order.
#[derive(Serialize)]
struct WireHeader<'a> {
    alg: Algorithm,
    typ: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kid: Option<&'a str>,
}
