//! HTTP page fetcher with credential scoping and optional proxy routing
//!
//! This module provides the single entry point through which every request to
//! the site (and to the external search API) goes:
//! - Session credential attached only for the home site
//! - Optional proxy for all hosts or for selected host suffixes
//! - Fixed request timeout surfaced as its own error
//! - Redirect metadata (final path, redirected flag) for access classification
//!
//! No request is retried here; callers decide.

use reqwest::{Client, Proxy, Url};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, ProxyConfig, ProxyMode};
use crate::crawler::headers::{attach_credential, build_page_headers};
use crate::crawler::url::SiteUrls;
use crate::session::Session;
use crate::utils::error::FetchError;
use crate::utils::host_matches_domain;

/// Raw result of a page load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Final URL after redirects
    pub url: String,

    /// Response body decoded as text
    pub body: String,

    /// Path component of the final URL
    pub final_path: String,

    /// True when the final URL differs from the requested one
    pub redirected: bool,
}

/// Per-request options
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Form fields; when present the request is a form-encoded POST
    pub form: Option<Vec<(String, String)>>,

    /// Explicit credential overriding the session's (home site only)
    pub credential: Option<String>,

    /// Referer header
    pub referer: Option<String>,

    /// Send as POST even without form fields
    pub post: bool,
}

impl FetchOptions {
    /// Form-encoded POST
    pub fn form<K: Into<String>, V: Into<String>>(fields: impl IntoIterator<Item = (K, V)>) -> Self {
        Self {
            form: Some(
                fields
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            post: true,
            ..Default::default()
        }
    }

    /// POST with an empty body
    pub fn post() -> Self {
        Self {
            post: true,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    #[must_use]
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }
}

/// Fetcher bound to one site and one session
pub struct PageFetcher {
    /// HTTP client with configured timeout, compression and proxy
    client: Client,

    /// Origin and path builder
    urls: SiteUrls,

    /// Domain that receives the credential
    home_domain: String,

    /// User agent sent with every request
    user_agent: String,

    /// Shared session context
    session: Arc<Session>,
}

impl PageFetcher {
    /// Create a fetcher from configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` for a bad base URL,
    /// `FetchError::InvalidProxy` for a bad proxy, or `FetchError::Http` if
    /// the HTTP client cannot be created
    pub fn new(config: &Config, session: Arc<Session>) -> Result<Self, FetchError> {
        Self::with_timeout(config, session, config.request_timeout())
    }

    /// Create a fetcher with an explicit timeout
    ///
    /// # Errors
    ///
    /// Same as [`PageFetcher::new`]
    pub fn with_timeout(
        config: &Config,
        session: Arc<Session>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let urls = SiteUrls::new(&config.site.base_url)?;

        let mut builder = Client::builder().timeout(timeout).gzip(true);
        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(build_proxy(proxy)?);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            urls,
            home_domain: config.site.home_domain.clone(),
            user_agent: config.site.user_agent.clone(),
            session,
        })
    }

    pub fn urls(&self) -> &SiteUrls {
        &self.urls
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Whether `url` targets the home site and may carry the credential
    pub fn is_home_host(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        host_matches_domain(host, &self.home_domain) || Some(host) == self.urls.host()
    }

    /// GET a page with default options
    ///
    /// # Errors
    ///
    /// See [`PageFetcher::fetch`]
    pub async fn get(&self, url: &str) -> Result<Page, FetchError> {
        self.fetch(url, FetchOptions::default()).await
    }

    /// Load a page
    ///
    /// `url` may be a path (resolved against the site origin) or an absolute
    /// URL. Redirects are followed and reported through [`Page`].
    ///
    /// # Errors
    ///
    /// - `FetchError::InvalidUrl` if `url` cannot be resolved
    /// - `FetchError::Timeout` if the request exceeds the timeout
    /// - `FetchError::ServerError` for a non-success final status
    /// - `FetchError::Http` for any other transport failure
    pub async fn fetch(&self, url: &str, options: FetchOptions) -> Result<Page, FetchError> {
        let target = self.urls.join(url)?;

        let mut headers = build_page_headers(&self.user_agent, options.referer.as_deref());
        if self.is_home_host(&target) {
            let credential = options.credential.or_else(|| self.session.credential());
            if let Some(credential) = credential.filter(|c| !c.is_empty()) {
                if !attach_credential(&mut headers, &credential) {
                    tracing::warn!("Credential is not a valid header value; sending request without it");
                }
            }
        }

        let request = if options.post || options.form.is_some() {
            let mut request = self.client.post(target.clone());
            if let Some(form) = &options.form {
                request = request.form(form);
            }
            request
        } else {
            self.client.get(target.clone())
        };

        let response = request
            .headers(headers)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            tracing::debug!(url = %target, status = status.as_u16(), "Request failed with status");
            return Err(FetchError::ServerError(status.as_u16()));
        }

        let body = response.text().await.map_err(transport_error)?;
        let redirected = final_url != target;

        tracing::debug!(
            url = %target,
            final_path = final_url.path(),
            redirected,
            bytes = body.len(),
            "Fetched page"
        );

        Ok(Page {
            final_path: final_url.path().to_string(),
            url: final_url.to_string(),
            body,
            redirected,
        })
    }
}

fn transport_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Http(e)
    }
}

/// Build the reqwest proxy for the configured routing mode
///
/// # Errors
///
/// Returns `FetchError::InvalidProxy` if the URL shape is not accepted
pub fn build_proxy(config: &ProxyConfig) -> Result<Proxy, FetchError> {
    if !config.is_valid_url() {
        return Err(FetchError::InvalidProxy(config.url.clone()));
    }

    // Plain `socks` is accepted in config and means SOCKS5
    let normalized = match config.url.strip_prefix("socks://") {
        Some(rest) => format!("socks5://{rest}"),
        None => config.url.clone(),
    };
    let proxy_url =
        Url::parse(&normalized).map_err(|_| FetchError::InvalidProxy(config.url.clone()))?;

    let proxy = match &config.mode {
        ProxyMode::All => Proxy::all(proxy_url),
        ProxyMode::Hosts { suffixes } => {
            let suffixes = suffixes.clone();
            Ok(Proxy::custom(move |url| {
                let host = url.host_str()?;
                suffixes
                    .iter()
                    .any(|suffix| host_matches_domain(host, suffix))
                    .then(|| proxy_url.clone())
            }))
        }
    };

    proxy.map_err(|_| FetchError::InvalidProxy(config.url.clone()))
}
