//! JWT signing and verification with RS256, HS256 and EdDSA, plus
//! cache-first JWKS key resolution.
//!
//! - [`jwt`]: token envelope, header, payload and claim-time validation
//! - [`protocol`]: per-algorithm sign/verify behind asymmetric and
//!   symmetric traits
//! - [`facade::JwtFacade`]: signing and verification with supplied keys
//! - [`jwks`]: key set model, fetch, cache, resolver and
//!   [`jwks::JwksJwtVerifier`]
//! - [`asn1`]: DER encoding that turns JWK RSA components into PEM
//!
//! Collaborators are injected: a [`clock::Clock`], an
//! [`jwks::HttpClient`], a [`jwks::CacheStore`] and an
//! [`events::EventSink`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod asn1;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod facade;
pub mod jwks;
pub mod jwt;
pub mod keys;
pub mod metrics;
pub mod protocol;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::JwtConfig;
pub use error::{
    ClaimError, FormatError, JwtError, KeyError, KeyResolutionError, Operation, SignatureError,
    StructuralError, TransportError,
};
pub use events::{CompositeEventSink, EventSink, JwtEvent, NoopEventSink, TracingEventSink};
pub use facade::JwtFacade;
pub use jwks::{
    CacheStore, HttpClient, JsonWebKey, JsonWebKeySet, JwksCache, JwksFetcher, JwksJwtVerifier,
    JwksResolver, JwksUri, ReqwestHttpClient,
};
pub use jwt::{Algorithm, DecodedJwtToken, Jwt, JwtBuilder, JwtHeader, JwtPayload};
pub use keys::{
    Ed25519KeyPair, Ed25519PublicKey, RsaSignatureKeyPair, RsaSignaturePublicKey,
    RsaSignatureSecretKey, SharedKey,
};
pub use metrics::MetricsEventSink;
pub use protocol::{
    AsymmetricProtocol, EdDsa, Hs256, Protocol, Rs256, SigningKey, SymmetricProtocol,
    VerificationKey,
};
