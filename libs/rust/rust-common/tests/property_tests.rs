//! Property-based tests for rust-common crate.
//!
//! Property 1: Cache Round-Trip
//! Property 2: Namespace Isolation
//! Property 3: Error Retryability Classification

use proptest::prelude::*;
use rust_common::{CacheClient, CacheClientConfig, PlatformError};
use std::time::Duration;

/// Generate arbitrary binary data for cache testing.
fn arb_cache_data() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..1024)
}

/// Generate arbitrary cache keys.
fn arb_cache_key() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_.-]{1,64}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property 1: Cache Round-Trip
    ///
    /// For any key and value, a stored value reads back unchanged and a
    /// second write replaces it whole.
    #[test]
    fn prop_cache_round_trip(
        key in arb_cache_key(),
        first in arb_cache_data(),
        second in arb_cache_data(),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let cache = CacheClient::new(CacheClientConfig::default().with_namespace("prop-test"));

            cache.set(&key, &first, Some(Duration::from_secs(60))).await.unwrap();
            prop_assert_eq!(cache.get(&key).await.unwrap(), Some(first));

            cache.set(&key, &second, None).await.unwrap();
            prop_assert_eq!(cache.get(&key).await.unwrap(), Some(second));
            prop_assert_eq!(cache.len().await, 1);

            cache.delete(&key).await.unwrap();
            prop_assert!(!cache.exists(&key).await.unwrap());
            Ok(())
        })?;
    }

    /// Property 2: Namespace Isolation
    ///
    /// The same key in two namespaces never collides.
    #[test]
    fn prop_namespace_isolation(
        key in arb_cache_key(),
        data1 in arb_cache_data(),
        data2 in arb_cache_data(),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let a = CacheClient::new(CacheClientConfig::default().with_namespace("ns-a"));
            let b = CacheClient::new(CacheClientConfig::default().with_namespace("ns-b"));

            a.set(&key, &data1, None).await.unwrap();
            prop_assert_eq!(b.get(&key).await.unwrap(), None);

            b.set(&key, &data2, None).await.unwrap();
            prop_assert_eq!(a.get(&key).await.unwrap(), Some(data1));
            prop_assert_eq!(b.get(&key).await.unwrap(), Some(data2));
            Ok(())
        })?;
    }

    /// Property 3: Error Retryability Classification
    ///
    /// Transient failures are retryable; caller mistakes never are.
    #[test]
    fn prop_retryable_errors_are_consistent(msg in "[a-zA-Z0-9 ]{1,50}") {
        prop_assert!(PlatformError::unavailable(msg.clone()).is_retryable());
        prop_assert!(PlatformError::Timeout(msg.clone()).is_retryable());

        prop_assert!(!PlatformError::invalid_input(msg.clone()).is_retryable());
        prop_assert!(!PlatformError::Internal(msg.clone()).is_retryable());
        prop_assert!(!PlatformError::Tracing(msg).is_retryable());
    }
}
