//! Rate-limited search provider wrapper.
//!
//! Wraps any SearchProvider implementation with rate limiting using the
//! governor crate.

use std::num::NonZeroU32;
use std::sync::Arc;

use async_trait::async_trait;
use governor::{Quota, RateLimiter};

use crate::error::SearchProviderResult;
use crate::traits::SearchProvider;
use crate::types::SearchPage;

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// A search provider wrapper that enforces a request rate.
///
/// Each page fetch waits for a permit before the inner provider is
/// called, so one wrapped provider throttles all pagination traffic for
/// a run regardless of how many queries the plan expands into.
pub struct RateLimitedSearcher<P> {
    inner: P,
    limiter: Arc<DefaultRateLimiter>,
}

impl<P: SearchProvider> RateLimitedSearcher<P> {
    /// Wrap `provider` with a sustained requests-per-second limit.
    pub fn new(provider: P, requests_per_second: u32) -> Self {
        let quota = Quota::per_second(
            NonZeroU32::new(requests_per_second).expect("requests_per_second must be > 0"),
        );
        Self {
            inner: provider,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Wrap with burst support on top of the sustained rate.
    pub fn with_burst(provider: P, requests_per_second: u32, burst: u32) -> Self {
        let quota = Quota::per_second(
            NonZeroU32::new(requests_per_second).expect("requests_per_second must be > 0"),
        )
        .allow_burst(NonZeroU32::new(burst).expect("burst must be > 0"));

        Self {
            inner: provider,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }
}

#[async_trait]
impl<P: SearchProvider> SearchProvider for RateLimitedSearcher<P> {
    async fn search_page(
        &self,
        query: &str,
        page_token: Option<&str>,
    ) -> SearchProviderResult<SearchPage> {
        self.limiter.until_ready().await;
        self.inner.search_page(query, page_token).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    use crate::traits::MockSearchProvider;
    use crate::types::{Candidate, SearchPage};

    #[tokio::test]
    async fn throttles_successive_requests() {
        let provider = MockSearchProvider::new().with_page(
            "q",
            SearchPage::last(vec![Candidate::new("A", "", "https://a.org")]),
        );
        let limited = RateLimitedSearcher::new(provider, 2);

        let start = Instant::now();
        for _ in 0..3 {
            limited.search_page("q", None).await.unwrap();
        }
        let elapsed = start.elapsed();

        // 3 requests at 2/sec: first immediate, the rest wait.
        assert!(elapsed.as_millis() >= 500, "not throttled: {elapsed:?}");
    }

    #[tokio::test]
    async fn name_is_the_inner_provider() {
        let limited = RateLimitedSearcher::new(MockSearchProvider::new(), 1);
        assert_eq!(limited.name(), "mock");
    }
}
