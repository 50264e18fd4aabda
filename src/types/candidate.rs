//! Raw search-hit candidates.

/// One raw search hit, produced by the candidate generator.
///
/// Candidates have no identity: each is fed to the relevance classifier
/// once and then discarded. Only classified, relevant candidates are
/// materialized into [`NewOrganization`](crate::types::NewOrganization)
/// records.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Result title as returned by the provider.
    pub title: String,

    /// Snippet/description from the result page.
    pub snippet: String,

    /// Link to the result page.
    pub link: String,
}

impl Candidate {
    /// Create a new candidate.
    pub fn new(
        title: impl Into<String>,
        snippet: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            snippet: snippet.into(),
            link: link.into(),
        }
    }
}

/// One page of provider results plus the continuation token.
///
/// A missing `next_page` means the provider is exhausted for this query.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    /// Results on this page, possibly empty.
    pub results: Vec<Candidate>,

    /// Opaque token for the next page, if any.
    pub next_page: Option<String>,
}

impl SearchPage {
    /// A final page with the given results and no continuation.
    pub fn last(results: Vec<Candidate>) -> Self {
        Self {
            results,
            next_page: None,
        }
    }

    /// A page with a continuation token.
    pub fn with_next(results: Vec<Candidate>, token: impl Into<String>) -> Self {
        Self {
            results,
            next_page: Some(token.into()),
        }
    }
}
