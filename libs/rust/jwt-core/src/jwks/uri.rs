use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::FormatError;

/// Absolute HTTPS URL of a JWKS endpoint. Validated once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JwksUri(Url);

impl JwksUri {
    /// Validate `input`.
    ///
    /// # Errors
    ///
    /// [`FormatError::InvalidUri`] unless `input` is an absolute `https`
    /// URL with a host.
    pub fn parse(input: &str) -> Result<Self, FormatError> {
        let invalid = |reason: &str| FormatError::InvalidUri {
            uri: input.to_string(),
            reason: reason.to_string(),
        };
        let url = Url::parse(input).map_err(|e| invalid(&e.to_string()))?;
        if url.scheme() != "https" {
            return Err(invalid("scheme must be https"));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(invalid("missing host"));
        }
        Ok(Self(url))
    }

    /// Normalized URL string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Parsed URL.
    #[must_use]
    pub const fn as_url(&self) -> &Url {
        &self.0
    }

    /// Host, used for log fields.
    #[must_use]
    pub fn host(&self) -> &str {
        self.0.host_str().unwrap_or_default()
    }
}

impl FromStr for JwksUri {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for JwksUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
