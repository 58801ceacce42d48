//! Topic detail with reply pagination
//!
//! Page 1 decides everything: its access outcome, the topic fields and the
//! number of reply pages. Pages 2..N are then requested together and their
//! replies appended in page order. A failed later page truncates the stream
//! at that page instead of failing the whole call.

use chrono::Utc;
use futures::future::join_all;
use std::fmt::Display;

use crate::crawler::V2exClient;
use crate::models::{TopicDetail, TopicReply};
use crate::notifications::{should_notify_unread, Notice};
use crate::parser::{parse_reply_page, parse_topic_page, TopicPage};
use crate::utils::error::ClientError;

/// First reply page fetched by the fan-out
const FIRST_FANOUT_PAGE: u32 = 2;

/// Upper bound on reply pages requested for one topic
///
/// The page count comes from the pager label in the page body. At 100 replies
/// per page this covers 10,000 replies; a larger label is clamped so one
/// page cannot start an unbounded number of requests.
pub const MAX_REPLY_PAGES: u32 = 100;

impl V2exClient {
    /// Load a topic with all of its replies
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Access` when page 1 is redirected (the stored
    /// credential is cleared if the site rejected it), or `ClientError::Fetch`
    /// when page 1 cannot be loaded. Failures on later pages are logged and
    /// never returned.
    pub async fn topic_detail(&self, id: u64) -> Result<TopicDetail, ClientError> {
        let urls = self.fetcher().urls();
        let page = self.load_page(&urls.topic_page(id, 1)).await?;

        let TopicPage {
            mut detail,
            total_pages,
            unread_notifications,
        } = parse_topic_page(&page.body, id, urls);

        tracing::debug!(
            topic = id,
            total_pages,
            declared = detail.reply_count,
            first_page = detail.replies.len(),
            "Parsed topic page"
        );

        let total_pages = if total_pages > MAX_REPLY_PAGES {
            tracing::warn!(topic = id, total_pages, max = MAX_REPLY_PAGES, "Pager exceeds page limit; clamping");
            MAX_REPLY_PAGES
        } else {
            total_pages
        };

        if let Some(count) = unread_notifications {
            self.surface_unread(count);
        }

        if total_pages >= FIRST_FANOUT_PAGE {
            let batches = self.fetch_reply_pages(id, total_pages).await;
            detail.extend_replies(merge_reply_batches(batches));
        }

        Ok(detail)
    }

    /// Fetch reply pages 2..=`total_pages` concurrently, tagged by page number
    async fn fetch_reply_pages(
        &self,
        id: u64,
        total_pages: u32,
    ) -> Vec<(u32, Result<Vec<TopicReply>, ClientError>)> {
        let requests = (FIRST_FANOUT_PAGE..=total_pages).map(|page_no| async move {
            let url = self.fetcher().urls().topic_page(id, page_no);
            let result = self
                .load_page(&url)
                .await
                .map(|page| parse_reply_page(&page.body));
            (page_no, result)
        });

        join_all(requests).await
    }

    /// Tell the user about unread messages, at most once per cooldown
    fn surface_unread(&self, count: u32) {
        let now = Utc::now();
        let session = self.session();
        if !should_notify_unread(count, session.last_notice_at(), now, self.notice_cooldown) {
            return;
        }

        self.notifier.notify(&Notice::UnreadMessages { count });
        if let Err(e) = session.record_notice(now) {
            tracing::warn!(error = %e, "Failed to record notice time");
        }
    }
}

/// Concatenate reply batches in page order, stopping at the first gap
///
/// Batches may arrive in any order. Pages are expected to run consecutively
/// from page 2; the first failed or missing page ends the merge so the
/// result never skips replies.
pub fn merge_reply_batches<T, E: Display>(mut batches: Vec<(u32, Result<Vec<T>, E>)>) -> Vec<T> {
    batches.sort_by_key(|(page_no, _)| *page_no);

    let mut merged = Vec::new();
    let mut expected = FIRST_FANOUT_PAGE;
    for (page_no, result) in batches {
        if page_no != expected {
            tracing::warn!(expected, page = page_no, "Reply page missing; later pages dropped");
            break;
        }
        match result {
            Ok(replies) => merged.extend(replies),
            Err(e) => {
                tracing::warn!(page = page_no, error = %e, "Reply page failed; later pages dropped");
                break;
            }
        }
        expected += 1;
    }

    merged
}
