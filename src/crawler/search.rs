//! Full-text search through the external search API
//!
//! The API lives on a third-party host, so the session credential is never
//! attached to these requests.

use serde::Deserialize;

use crate::crawler::fetcher::FetchOptions;
use crate::crawler::V2exClient;
use crate::models::{SearchHit, SearchSort};
use crate::utils::error::{ClientError, FetchError};

/// One page of search results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchQuery<'a> {
    pub q: &'a str,
    pub sort: SearchSort,
    /// Offset of the first hit
    pub from: u32,
    /// Hits per page
    pub size: u32,
}

impl<'a> SearchQuery<'a> {
    pub fn new(q: &'a str) -> Self {
        Self {
            q,
            sort: SearchSort::default(),
            from: 0,
            size: 10,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<SearchEnvelope>,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(rename = "_source", default)]
    source: SearchHit,
}

impl V2exClient {
    /// Search topics
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Fetch` if the API cannot be reached, or
    /// `ClientError::Json` if the response is not a search result
    pub async fn search(&self, query: SearchQuery<'_>) -> Result<Vec<SearchHit>, ClientError> {
        let mut url = url::Url::parse(&self.search_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {e}", self.search_url)))?;
        url.query_pairs_mut()
            .append_pair("q", query.q)
            .append_pair("sort", query.sort.as_str())
            .append_pair("from", &query.from.to_string())
            .append_pair("size", &query.size.to_string());

        let page = self.fetcher().fetch(url.as_str(), FetchOptions::default()).await?;
        let hits = parse_search_response(&page.body)?;

        tracing::debug!(q = query.q, count = hits.len(), "Search finished");
        Ok(hits)
    }
}

/// Extract hit records from a search API response
///
/// # Errors
///
/// Returns an error if `body` is not JSON
pub fn parse_search_response(body: &str) -> Result<Vec<SearchHit>, serde_json::Error> {
    let response: SearchResponse = serde_json::from_str(body)?;
    Ok(response.hits.into_iter().map(|hit| hit.source).collect())
}
