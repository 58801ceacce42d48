//! Site client: page loading, access classification and extraction
//!
//! [`V2exClient`] ties the fetcher, the shared session and the parsers
//! together. Its operations are split by concern:
//! - `list`: tab and node listings, node directory, collected nodes
//! - `topic`: topic detail with reply pagination and the unread-notice check
//! - `actions`: reply, thank, collect, daily check-in
//! - `search`: the external full-text search API

pub mod access;
pub mod actions;
pub mod fetcher;
pub mod headers;
pub mod list;
pub mod search;
pub mod topic;
pub mod url;

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::crawler::access::AccessOutcome;
use crate::crawler::fetcher::{FetchOptions, Page, PageFetcher};
use crate::notifications::{LogNotifier, Notifier};
use crate::session::{normalize_credential, Session};
use crate::utils::error::{ClientError, FetchError};

/// Page used to probe whether a credential is signed in
const CREDENTIAL_PROBE_PATH: &str = "/settings";

/// Client for one site and one session
pub struct V2exClient {
    fetcher: PageFetcher,
    notifier: Arc<dyn Notifier>,
    notice_cooldown: Duration,
    search_url: String,
}

impl V2exClient {
    /// Create a client that reports notices to the log
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if the base URL or proxy is invalid, or the HTTP
    /// client cannot be built
    pub fn new(config: &Config, session: Arc<Session>) -> Result<Self, FetchError> {
        Ok(Self {
            fetcher: PageFetcher::new(config, session)?,
            notifier: Arc::new(LogNotifier),
            notice_cooldown: config.notice_cooldown(),
            search_url: config.site.search_url.clone(),
        })
    }

    /// Replace the notice channel
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn session(&self) -> &Arc<Session> {
        self.fetcher.session()
    }

    pub fn fetcher(&self) -> &PageFetcher {
        &self.fetcher
    }

    /// Check whether `value` is a signed-in credential
    ///
    /// Blank input is rejected without touching the network. Otherwise the
    /// settings page is requested with `value` attached; a redirect means the
    /// site did not accept it. The stored session is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Fetch` if the probe request fails
    pub async fn check_credential(&self, value: &str) -> Result<bool, ClientError> {
        let Some(credential) = normalize_credential(value) else {
            return Ok(false);
        };

        let page = self
            .fetcher
            .fetch(
                CREDENTIAL_PROBE_PATH,
                FetchOptions::default().with_credential(credential),
            )
            .await?;

        tracing::debug!(redirected = page.redirected, final_path = %page.final_path, "Credential probe");
        Ok(!page.redirected)
    }

    /// Load a page that requires access classification
    ///
    /// A credential the site bounced to the sign-in page is cleared from the
    /// session before the error is returned.
    pub(crate) async fn load_page(&self, url: &str) -> Result<Page, ClientError> {
        let had_credential = self.session().has_credential();
        let page = self.fetcher.get(url).await?;

        let outcome = AccessOutcome::classify(&page, had_credential);
        if outcome.is_granted() {
            return Ok(page);
        }

        tracing::debug!(url, ?outcome, final_path = %page.final_path, "Page load not granted");
        let rejected = matches!(
            outcome,
            AccessOutcome::LoginRequired {
                credential_rejected: true
            }
        );
        if rejected && had_credential {
            tracing::warn!(url, "Credential rejected by the site; clearing it");
            if let Err(e) = self.session().clear_credential() {
                tracing::error!(error = %e, "Failed to persist cleared credential");
            }
        }

        outcome.into_result()?;
        Ok(page)
    }
}
