//! Search provider trait for external discovery.
//!
//! Abstracts over web search backends (Google Custom Search, Tavily,
//! SerpAPI, ...). Providers are paginated: each call returns one page of
//! results plus an opaque continuation token, and the absence of a token
//! means the provider is exhausted for that query.

use async_trait::async_trait;

use crate::error::SearchProviderResult;
use crate::types::SearchPage;

/// A paginated web search backend.
///
/// # Implementations
///
/// - [`GoogleSearchProvider`](crate::searchers::GoogleSearchProvider) - Google Custom Search API
/// - [`RateLimitedSearcher`](crate::searchers::RateLimitedSearcher) - QPS-limiting wrapper
/// - [`MockSearchProvider`] - For testing
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Fetch one page of results for `query`.
    ///
    /// `page_token` is `None` for the first page; subsequent calls pass
    /// the token from the previous [`SearchPage`].
    async fn search_page(
        &self,
        query: &str,
        page_token: Option<&str>,
    ) -> SearchProviderResult<SearchPage>;

    /// Provider name recorded on query audit records.
    fn name(&self) -> &str;
}

/// Mock search provider with scripted, optionally multi-page results.
#[derive(Default)]
pub struct MockSearchProvider {
    // query -> ordered pages
    pages: std::sync::RwLock<std::collections::HashMap<String, Vec<SearchPage>>>,
    fail_queries: std::sync::RwLock<std::collections::HashSet<String>>,
}

impl MockSearchProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a single final page for a query.
    pub fn with_page(self, query: &str, page: SearchPage) -> Self {
        self.with_pages(query, vec![page])
    }

    /// Script an ordered sequence of pages for a query. Pages before the
    /// last are given continuation tokens automatically.
    pub fn with_pages(self, query: &str, mut pages: Vec<SearchPage>) -> Self {
        let count = pages.len();
        for (i, page) in pages.iter_mut().enumerate() {
            if i + 1 < count && page.next_page.is_none() {
                page.next_page = Some(format!("page-{}", i + 1));
            }
        }
        self.pages.write().unwrap().insert(query.to_string(), pages);
        self
    }

    /// Make a query fail with a provider error.
    pub fn with_failure(self, query: &str) -> Self {
        self.fail_queries.write().unwrap().insert(query.to_string());
        self
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    async fn search_page(
        &self,
        query: &str,
        page_token: Option<&str>,
    ) -> SearchProviderResult<SearchPage> {
        if self.fail_queries.read().unwrap().contains(query) {
            return Err(crate::error::SearchError::Provider(format!(
                "scripted failure for query: {query}"
            )));
        }

        let pages = self.pages.read().unwrap();
        let Some(scripted) = pages.get(query) else {
            return Ok(SearchPage::default());
        };

        let index = match page_token {
            None => 0,
            Some(token) => token
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .unwrap_or(0),
        };

        Ok(scripted.get(index).cloned().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Candidate;

    #[tokio::test]
    async fn mock_provider_paginates() {
        let provider = MockSearchProvider::new().with_pages(
            "water districts in Utah",
            vec![
                SearchPage::last(vec![Candidate::new("A", "", "https://a.org")]),
                SearchPage::last(vec![Candidate::new("B", "", "https://b.org")]),
            ],
        );

        let first = provider
            .search_page("water districts in Utah", None)
            .await
            .unwrap();
        assert_eq!(first.results.len(), 1);
        let token = first.next_page.expect("continuation token");

        let second = provider
            .search_page("water districts in Utah", Some(&token))
            .await
            .unwrap();
        assert_eq!(second.results[0].title, "B");
        assert!(second.next_page.is_none());
    }

    #[tokio::test]
    async fn unknown_query_is_empty_not_error() {
        let provider = MockSearchProvider::new();
        let page = provider.search_page("anything", None).await.unwrap();
        assert!(page.results.is_empty());
        assert!(page.next_page.is_none());
    }
}
