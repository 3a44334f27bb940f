//! Shared test utilities for auth-platform JWT libraries.
//!
//! This crate provides:
//! - Proptest generators for claims, key ids and token segments
//! - Fixed key material and externally signed tokens

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

pub use generators::*;
