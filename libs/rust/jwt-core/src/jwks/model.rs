//! JWKS document model.

use serde_json::{Map, Value};
use std::fmt;

use crate::error::FormatError;

/// Intended use of a key (`use`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyUse {
    /// `sig`
    Signature,
    /// `enc`
    Encryption,
}

impl KeyUse {
    /// JWK `use` value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Signature => "sig",
            Self::Encryption => "enc",
        }
    }
}

impl fmt::Display for KeyUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One key of a JWKS.
///
/// `kid` and `kty` are required. RSA keys must carry `n` and `e`, EC keys
/// `crv`, `x` and `y`. Other key types are kept but never used for
/// verification.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonWebKey {
    key_id: String,
    key_type: String,
    key_use: Option<KeyUse>,
    algorithm: Option<String>,
    key_data: Map<String, Value>,
}

impl JsonWebKey {
    /// Validate one JWK object.
    ///
    /// # Errors
    ///
    /// [`FormatError::MissingField`] or [`FormatError::InvalidField`].
    pub fn parse(object: &Map<String, Value>) -> Result<Self, FormatError> {
        let key_id = required_str(object, "kid")?.to_string();
        if key_id.is_empty() {
            return Err(FormatError::InvalidField {
                field: "kid",
                reason: "must not be empty".to_string(),
            });
        }
        let key_type = required_str(object, "kty")?.to_string();

        let key_use = match object.get("use") {
            None => None,
            Some(Value::String(s)) if s == "sig" => Some(KeyUse::Signature),
            Some(Value::String(s)) if s == "enc" => Some(KeyUse::Encryption),
            Some(other) => {
                return Err(FormatError::InvalidField {
                    field: "use",
                    reason: format!("expected sig or enc, got {other}"),
                });
            }
        };
        let algorithm = match object.get("alg") {
            None => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                return Err(FormatError::InvalidField {
                    field: "alg",
                    reason: format!("expected a string, got {other}"),
                });
            }
        };

        let required: &[&'static str] = match key_type.as_str() {
            "RSA" => &["n", "e"],
            "EC" => &["crv", "x", "y"],
            _ => &[],
        };
        for field in required {
            required_str(object, field)?;
        }

        Ok(Self {
            key_id,
            key_type,
            key_use,
            algorithm,
            key_data: object.clone(),
        })
    }

    /// `kid`
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// `kty`
    #[must_use]
    pub fn key_type(&self) -> &str {
        &self.key_type
    }

    /// `use`
    #[must_use]
    pub const fn key_use(&self) -> Option<KeyUse> {
        self.key_use
    }

    /// `alg`
    #[must_use]
    pub fn algorithm(&self) -> Option<&str> {
        self.algorithm.as_deref()
    }

    /// String member by name, e.g. `n`.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.key_data.get(name).and_then(Value::as_str)
    }

    /// RSA `(n, e)` when this is an RSA key.
    #[must_use]
    pub fn rsa_components(&self) -> Option<(&str, &str)> {
        if self.key_type != "RSA" {
            return None;
        }
        Some((self.param("n")?, self.param("e")?))
    }

    /// Every member as published.
    #[must_use]
    pub const fn key_data(&self) -> &Map<String, Value> {
        &self.key_data
    }
}

/// Non-empty, ordered key set.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonWebKeySet {
    keys: Vec<JsonWebKey>,
}

impl JsonWebKeySet {
    /// Wrap validated keys.
    ///
    /// # Errors
    ///
    /// [`FormatError::EmptyKeySet`] when `keys` is empty.
    pub fn new(keys: Vec<JsonWebKey>) -> Result<Self, FormatError> {
        if keys.is_empty() {
            return Err(FormatError::EmptyKeySet);
        }
        Ok(Self { keys })
    }

    /// Parse a JWKS document.
    ///
    /// # Errors
    ///
    /// Rejects invalid JSON, a non-object root, a missing or non-array
    /// `keys`, an empty `keys`, non-object elements and invalid JWKs.
    pub fn parse(json: &str) -> Result<Self, FormatError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| FormatError::InvalidJson(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Validate an already-parsed document.
    ///
    /// # Errors
    ///
    /// As [`Self::parse`].
    pub fn from_value(value: &Value) -> Result<Self, FormatError> {
        let root = value.as_object().ok_or(FormatError::RootMustBeObject)?;
        let keys = root
            .get("keys")
            .ok_or(FormatError::MissingKeys)?
            .as_array()
            .ok_or(FormatError::KeysMustBeArray)?;
        if keys.is_empty() {
            return Err(FormatError::EmptyKeySet);
        }

        let keys = keys
            .iter()
            .enumerate()
            .map(|(index, key)| {
                key.as_object()
                    .ok_or(FormatError::KeyMustBeObject { index })
                    .and_then(JsonWebKey::parse)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(keys)
    }

    /// Keys in document order.
    #[must_use]
    pub fn keys(&self) -> &[JsonWebKey] {
        &self.keys
    }

    /// First key with `kid`.
    #[must_use]
    pub fn find(&self, kid: &str) -> Option<&JsonWebKey> {
        self.keys.iter().find(|key| key.key_id == kid)
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always false.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// `{"keys":[...]}` with each key as published.
    #[must_use]
    pub fn to_json(&self) -> String {
        let keys = self
            .keys
            .iter()
            .map(|key| Value::Object(key.key_data.clone()))
            .collect();
        let mut root = Map::new();
        root.insert("keys".into(), Value::Array(keys));
        Value::Object(root).to_string()
    }
}

fn required_str<'a>(object: &'a Map<String, Value>, field: &'static str) -> Result<&'a str, FormatError> {
    object
        .get(field)
        .and_then(Value::as_str)
        .ok_or(FormatError::MissingField { field })
}
