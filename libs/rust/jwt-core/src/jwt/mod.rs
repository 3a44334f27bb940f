//! Token envelope, header and payload.

pub mod builder;
pub mod claims;
pub mod decoded;
pub mod header;
pub mod token;

pub use builder::JwtBuilder;
pub use claims::{CLOCK_SKEW_SECONDS, JwtPayload, MAX_TIMESTAMP, MIN_TIMESTAMP};
pub use decoded::DecodedJwtToken;
pub use header::{Algorithm, JwtHeader};
pub use token::Jwt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// `base64url(header_json) "." base64url(payload_json)`
#[must_use]
pub fn signing_input(header: &JwtHeader, payload: &JwtPayload) -> String {
    format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header.to_json()),
        URL_SAFE_NO_PAD.encode(payload.to_json())
    )
}
