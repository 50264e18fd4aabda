//! Candidate generation — paginating the search provider.

use crate::traits::SearchProvider;
use crate::types::Candidate;

/// Collects raw candidates for one query, paginating the provider until
/// the per-query cap is reached or the provider is exhausted.
///
/// Provider failures are absorbed per query: the caller gets an empty
/// sequence and an error log line, never an `Err`. A single failed query
/// must not abort a run.
pub struct CandidateGenerator<P> {
    provider: P,
}

impl<P: SearchProvider> CandidateGenerator<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Name of the underlying provider, for query audit records.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Fetch up to `max_results` candidates for `query`. May be empty,
    /// never errors.
    pub async fn fetch_all(&self, query: &str, max_results: usize) -> Vec<Candidate> {
        let mut collected = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let page = match self.provider.search_page(query, token.as_deref()).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::error!(error = %e, %query, "search query failed");
                    return Vec::new();
                }
            };

            collected.extend(page.results);
            if collected.len() >= max_results {
                collected.truncate(max_results);
                break;
            }
            match page.next_page {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        tracing::info!(%query, results = collected.len(), "search complete");
        collected
    }
}
