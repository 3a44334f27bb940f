//! Shared proptest generators for JWT domain values.

use proptest::prelude::*;
use serde_json::{Map, Value};

/// Lower bound of accepted timestamps (2000-01-01T00:00:00Z).
pub const MIN_TIMESTAMP: i64 = 946_684_800;

/// Upper bound of accepted timestamps (2100-01-01T00:00:00Z).
pub const MAX_TIMESTAMP: i64 = 4_102_444_800;

/// Generate subject identifiers.
pub fn subject_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-]{1,64}"
}

/// Generate JWK key ids.
pub fn key_id_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-]{8,32}"
}

/// Generate issuer URLs.
pub fn issuer_strategy() -> impl Strategy<Value = String> {
    "[a-z]{3,12}".prop_map(|host| format!("https://{host}.example.com"))
}

/// Generate timestamps inside the accepted window, leaving an hour of
/// headroom at both ends so tests can shift them.
pub fn timestamp_strategy() -> impl Strategy<Value = i64> {
    (MIN_TIMESTAMP + 3600)..(MAX_TIMESTAMP - 3600)
}

/// Generate timestamps outside the accepted window.
pub fn out_of_range_timestamp_strategy() -> impl Strategy<Value = i64> {
    prop_oneof![
        0i64..MIN_TIMESTAMP,
        (MAX_TIMESTAMP + 1)..(MAX_TIMESTAMP * 4),
    ]
}

/// Generate scalar custom claim values.
pub fn claim_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,32}".prop_map(Value::String),
        any::<bool>().prop_map(Value::Bool),
        (-1_000_000i64..1_000_000).prop_map(Value::from),
    ]
}

/// Generate custom claim maps whose names never collide with registered claims.
pub fn custom_claims_strategy() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map("x_[a-z]{1,12}", claim_value_strategy(), 0..6)
        .prop_map(|claims| claims.into_iter().collect())
}

/// Generate strings that are never valid base64url segments.
pub fn invalid_segment_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9]{0,8}[+/=!. ][a-zA-Z0-9]{0,8}"
}
