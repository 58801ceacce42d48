//! Signed-in actions: reply, thank, collect and the daily check-in
//!
//! Actions surface transport errors as they are; no access classification is
//! applied. Every state-changing request carries the `once` token read from
//! a previously loaded page.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::crawler::fetcher::FetchOptions;
use crate::crawler::V2exClient;
use crate::models::{DailyOutcome, ThankResponse};
use crate::utils::error::{ClientError, FetchError};

const DAILY_MISSION_PATH: &str = "/mission/daily";

/// Shown on the mission page once today's reward has been taken
const ALREADY_REDEEMED_MARKER: &str = "每日登录奖励已领取";

/// Shown after a successful redeem
const REDEEMED_MARKER: &str = "已成功领取每日登录奖励";

static REDEEM_LINK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/mission/daily/redeem\?once=(\d+)").unwrap());

impl V2exClient {
    /// Post a reply to a topic
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Fetch` if the request fails
    pub async fn post_reply(&self, topic_id: u64, content: &str, once: &str) -> Result<(), ClientError> {
        let urls = self.fetcher().urls();
        let link = urls.topic_link(topic_id);

        let options = FetchOptions::form([("content", content), ("once", once)]).with_referer(link.as_str());
        let page = self.fetcher().fetch(&link, options).await?;

        tracing::info!(topic = topic_id, final_path = %page.final_path, "Reply posted");
        Ok(())
    }

    /// Thank the author of a reply
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Fetch` if the request fails, or
    /// `ClientError::Json` if the response is not a thank result
    pub async fn thank_reply(&self, reply_id: &str, once: &str) -> Result<ThankResponse, ClientError> {
        let url = self.action_url(&format!("/thank/reply/{reply_id}"), "once", once)?;
        let page = self.fetcher().fetch(url.as_str(), FetchOptions::post()).await?;

        let response: ThankResponse = serde_json::from_str(&page.body)?;
        tracing::info!(reply = reply_id, success = response.success, "Thanked reply");
        Ok(response)
    }

    /// Thank the author of a topic
    ///
    /// Older site versions answer with a page instead of JSON; the action then
    /// counts as successful when the request was not redirected.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Fetch` if the request fails
    pub async fn thank_topic(&self, topic_id: u64, once: &str) -> Result<ThankResponse, ClientError> {
        let url = self.action_url(&format!("/thank/topic/{topic_id}"), "once", once)?;
        let referer = self.fetcher().urls().topic_link(topic_id);
        let page = self
            .fetcher()
            .fetch(url.as_str(), FetchOptions::default().with_referer(referer))
            .await?;

        let response = serde_json::from_str::<ThankResponse>(&page.body).unwrap_or_else(|_| ThankResponse {
            success: !page.redirected,
            once: None,
        });
        tracing::info!(topic = topic_id, success = response.success, "Thanked topic");
        Ok(response)
    }

    /// Collect or uncollect a topic
    ///
    /// `t` is the token from [`crate::models::TopicDetail::collect_param_t`].
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Fetch` if the request fails
    pub async fn set_collected(&self, topic_id: u64, collect: bool, t: &str) -> Result<(), ClientError> {
        let action = if collect { "favorite" } else { "unfavorite" };
        let url = self.action_url(&format!("/{action}/topic/{topic_id}"), "t", t)?;
        let referer = self.fetcher().urls().topic_link(topic_id);

        self.fetcher()
            .fetch(url.as_str(), FetchOptions::default().with_referer(referer))
            .await?;

        tracing::info!(topic = topic_id, collect, "Collect state changed");
        Ok(())
    }

    /// Redeem today's sign-in reward
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Fetch` if either request fails
    pub async fn daily_checkin(&self) -> Result<DailyOutcome, ClientError> {
        let mission = self.fetcher().get(DAILY_MISSION_PATH).await?;
        if mission.body.contains(ALREADY_REDEEMED_MARKER) {
            return Ok(DailyOutcome::AlreadyRedeemed);
        }

        let Some(once) = redeem_once(&mission.body) else {
            tracing::warn!(final_path = %mission.final_path, "No redeem link on mission page");
            return Ok(DailyOutcome::Failed);
        };

        let url = self.action_url(&format!("{DAILY_MISSION_PATH}/redeem"), "once", &once)?;
        let mission_url = self.fetcher().urls().join(DAILY_MISSION_PATH)?;
        let result = self
            .fetcher()
            .fetch(
                url.as_str(),
                FetchOptions::default().with_referer(mission_url.as_str()),
            )
            .await?;

        let outcome = if result.body.contains(REDEEMED_MARKER) {
            DailyOutcome::Redeemed
        } else {
            DailyOutcome::Failed
        };
        tracing::info!(%outcome, "Daily check-in");
        Ok(outcome)
    }

    fn action_url(&self, path: &str, key: &str, value: &str) -> Result<Url, FetchError> {
        let mut url = self.fetcher().urls().join(path)?;
        url.query_pairs_mut().append_pair(key, value);
        Ok(url)
    }
}

/// `once` token of the redeem link on the mission page
fn redeem_once(body: &str) -> Option<String> {
    REDEEM_LINK_REGEX
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
