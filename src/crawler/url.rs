//! URL construction and normalization for site pages
//!
//! Every page the client touches lives under one origin. [`SiteUrls`] resolves
//! relative links against it and builds the fixed paths used for listings,
//! topics and actions.

use url::Url;

use crate::utils::error::FetchError;

/// Topic pages live under this path prefix
pub const TOPIC_PATH_PREFIX: &str = "/t/";

/// Node pages live under this path prefix
pub const NODE_PATH_PREFIX: &str = "/go/";

/// URL builder bound to a site origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteUrls {
    base: Url,
}

impl SiteUrls {
    /// Create a builder for `base_url`
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` if `base_url` is not an absolute URL
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let base = Url::parse(base_url).map_err(|e| FetchError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn host(&self) -> Option<&str> {
        self.base.host_str()
    }

    /// Resolve a path or absolute URL against the origin
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` if the input cannot be resolved
    pub fn join(&self, path_or_url: &str) -> Result<Url, FetchError> {
        self.base
            .join(path_or_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{path_or_url}: {e}")))
    }

    /// Resolve an `href` from a page into a canonical absolute link
    ///
    /// In-page anchors (`#reply12`) are stripped. Returns `None` for empty or
    /// unresolvable input.
    ///
    /// # Examples
    ///
    /// ```
    /// use v2ex_explore::crawler::url::SiteUrls;
    ///
    /// let urls = SiteUrls::new("https://www.v2ex.com").unwrap();
    /// assert_eq!(
    ///     urls.resolve_link("/t/1024#reply5").as_deref(),
    ///     Some("https://www.v2ex.com/t/1024")
    /// );
    /// ```
    pub fn resolve_link(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }
        let mut url = self.base.join(href).ok()?;
        url.set_fragment(None);
        Some(url.to_string())
    }

    /// Canonical link of a topic
    pub fn topic_link(&self, id: u64) -> String {
        format!("{}t/{id}", self.origin_with_slash())
    }

    /// One page of a topic's reply stream
    pub fn topic_page(&self, id: u64, page: u32) -> String {
        format!("{}t/{id}?p={page}", self.origin_with_slash())
    }

    /// Tab-scoped listing, e.g. `tech` or `hot`
    pub fn tab_page(&self, tab: &str) -> Result<Url, FetchError> {
        let mut url = self.join("/")?;
        url.query_pairs_mut().append_pair("tab", tab);
        Ok(url)
    }

    /// Node-scoped listing
    pub fn node_page(&self, name: &str) -> Result<Url, FetchError> {
        self.join(&format!("{NODE_PATH_PREFIX}{name}"))
    }

    fn origin_with_slash(&self) -> String {
        let origin = self.base.origin().ascii_serialization();
        format!("{origin}/")
    }
}
