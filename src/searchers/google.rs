//! Google Custom Search JSON API client.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::{SearchError, SearchProviderResult};
use crate::traits::SearchProvider;
use crate::types::{Candidate, SearchPage};

const BASE_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Search provider backed by the Google Custom Search JSON API.
///
/// Pages carry at most 10 results; the opaque page token is the
/// 1-based `start` index of the next page, taken from the API's
/// `queries.nextPage` block.
pub struct GoogleSearchProvider {
    api_key: SecretString,
    cse_id: SecretString,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    items: Vec<GoogleItem>,
    #[serde(default)]
    queries: GoogleQueries,
}

#[derive(Debug, Deserialize)]
struct GoogleItem {
    title: String,
    #[serde(default)]
    snippet: String,
    link: String,
}

#[derive(Debug, Default, Deserialize)]
struct GoogleQueries {
    #[serde(rename = "nextPage", default)]
    next_page: Vec<GoogleNextPage>,
}

#[derive(Debug, Deserialize)]
struct GoogleNextPage {
    #[serde(rename = "startIndex")]
    start_index: u32,
}

impl GoogleSearchProvider {
    pub fn new(api_key: SecretString, cse_id: SecretString) -> SearchProviderResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| SearchError::Http(Box::new(e)))?;

        Ok(Self {
            api_key,
            cse_id,
            client,
        })
    }
}

#[async_trait::async_trait]
impl SearchProvider for GoogleSearchProvider {
    async fn search_page(
        &self,
        query: &str,
        page_token: Option<&str>,
    ) -> SearchProviderResult<SearchPage> {
        let start: u32 = match page_token {
            Some(token) => token.parse().map_err(|_| {
                SearchError::Provider(format!("malformed page token: {token:?}"))
            })?,
            None => 1,
        };

        let response = self
            .client
            .get(BASE_URL)
            .query(&[
                ("key", self.api_key.expose_secret()),
                ("cx", self.cse_id.expose_secret()),
                ("q", query),
                ("start", &start.to_string()),
            ])
            .send()
            .await
            .map_err(|e| SearchError::Http(Box::new(e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SearchError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Provider(format!(
                "google api error {status}: {body}"
            )));
        }

        let parsed: GoogleResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Provider(format!("malformed response: {e}")))?;

        let results = parsed
            .items
            .into_iter()
            .map(|item| Candidate::new(item.title, item.snippet, item.link))
            .collect();

        let next = parsed
            .queries
            .next_page
            .first()
            .map(|p| p.start_index.to_string());

        Ok(match next {
            Some(token) => SearchPage::with_next(results, token),
            None => SearchPage::last(results),
        })
    }

    fn name(&self) -> &str {
        "google"
    }
}
