//! Topic page parser
//!
//! A topic page has two main boxes: the first holds the header, body,
//! appends and social actions; the second holds the reply stream and the
//! pager. Later pages of the same topic repeat the layout, so the reply
//! parser works for both.

use scraper::{ElementRef, Html};

use crate::crawler::url::SiteUrls;
use crate::models::{NodeRef, TopicAppend, TopicDetail, TopicReply};
use crate::parser::fields::{
    first_integer, leading_integer, node_slug, once_token, parse_append_time,
    parse_collect_count, parse_declared_reply_count, parse_meta_line, parse_thank_count,
    query_param, reply_id, unread_notifications,
};
use crate::parser::selectors::{
    APPEND_BLOCK, APPEND_CONTENT, APPEND_TIME, CELL, COLLECT_TOGGLE, HEADER_AVATAR, HEADER_LINK,
    HEADER_META, HEADER_TITLE, MAIN_BOX, ONCE_INPUT, ONCE_LINK, ONCE_ONCLICK, PAGER_LINK,
    REPLY_AVATAR, REPLY_CELL, REPLY_CONTENT, REPLY_COUNT, REPLY_FLOOR, REPLY_THANKED,
    REPLY_THANKS, REPLY_TIME, REPLY_USER, TOPIC_CONTENT, TOPIC_STATS, TOPIC_THANK, TOPIC_THANKED,
};
use crate::parser::{child_elements, element_text, first_attr, first_html, first_text, page_title};

/// Label of the collect toggle when the topic is already collected
const UNCOLLECT_LABEL: &str = "取消收藏";

/// Path fragment of the uncollect action
const UNCOLLECT_PATH: &str = "/unfavorite/";

/// Everything read from the first page of a topic
#[derive(Debug, Clone)]
pub struct TopicPage {
    /// Topic with the first page of replies
    pub detail: TopicDetail,

    /// Number of reply pages, at least 1
    pub total_pages: u32,

    /// Pending notifications advertised in the page title
    pub unread_notifications: Option<u32>,
}

/// Parse the first page of a topic
///
/// `id` is the topic id the page was requested for.
pub fn parse_topic_page(html: &str, id: u64, urls: &SiteUrls) -> TopicPage {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let meta = first_text(root, &HEADER_META).and_then(|m| parse_meta_line(&m));
    let (author_name, display_time, visit_count) = match meta {
        Some(meta) => (
            meta.author,
            meta.time,
            first_integer(&meta.visits).unwrap_or_default(),
        ),
        None => Default::default(),
    };

    let stats = first_text(root, &TOPIC_STATS).unwrap_or_default();

    let collect_toggle = root.select(&COLLECT_TOGGLE).next();
    let (is_collected, collect_param_t) = match collect_toggle {
        Some(toggle) => {
            let href = toggle.value().attr("href").unwrap_or_default();
            let collected =
                element_text(toggle).contains(UNCOLLECT_LABEL) || href.contains(UNCOLLECT_PATH);
            (collected, query_param(href, "t"))
        }
        None => (false, None),
    };

    let reply_box = document.select(&MAIN_BOX).nth(1);
    let (reply_count, replies, total_pages) = match reply_box {
        Some(reply_box) => {
            let declared = reply_box
                .select(&CELL)
                .next()
                .and_then(|cell| first_text(cell, &REPLY_COUNT))
                .and_then(|text| parse_declared_reply_count(&text))
                .unwrap_or_default();
            let replies = parse_replies(reply_box);
            // The header can undercount or be missing; never report fewer
            // replies than were parsed.
            let reply_count = usize::try_from(declared)
                .unwrap_or(usize::MAX)
                .max(replies.len());
            (reply_count, replies, total_pages(reply_box))
        }
        None => (0, Vec::new(), 1),
    };

    let detail = TopicDetail {
        id,
        link: urls.topic_link(id),
        once: find_once(root),
        title: first_text(root, &HEADER_TITLE).unwrap_or_default(),
        node: header_node(root),
        author_name,
        author_avatar: first_attr(root, &HEADER_AVATAR, "src").unwrap_or_default(),
        display_time,
        visit_count,
        content: first_html(root, &TOPIC_CONTENT).unwrap_or_default(),
        appends: parse_appends(root),
        collect_count: parse_collect_count(&stats).unwrap_or_default(),
        thank_count: parse_thank_count(&stats).unwrap_or_default(),
        is_collected,
        is_thanked: root.select(&TOPIC_THANKED).next().is_some(),
        can_thank: root.select(&TOPIC_THANK).next().is_some(),
        collect_param_t,
        reply_count,
        replies,
    };

    TopicPage {
        detail,
        total_pages,
        unread_notifications: page_title(&document).and_then(|t| unread_notifications(&t)),
    }
}

/// Parse the replies of any page of a topic
pub fn parse_reply_page(html: &str) -> Vec<TopicReply> {
    let document = Html::parse_document(html);
    document
        .select(&MAIN_BOX)
        .nth(1)
        .map(parse_replies)
        .unwrap_or_default()
}

/// Node link is the second link of the header; the first is the site root
fn header_node(root: ElementRef<'_>) -> NodeRef {
    root.select(&HEADER_LINK)
        .nth(1)
        .map(|link| {
            let name = link
                .value()
                .attr("href")
                .and_then(node_slug)
                .unwrap_or_default();
            NodeRef::new(name, element_text(link))
        })
        .unwrap_or_default()
}

fn parse_appends(root: ElementRef<'_>) -> Vec<TopicAppend> {
    root.select(&APPEND_BLOCK)
        .map(|block| TopicAppend {
            time: first_text(block, &APPEND_TIME)
                .and_then(|t| parse_append_time(&t))
                .unwrap_or_default(),
            content: first_html(block, &APPEND_CONTENT).unwrap_or_default(),
        })
        .collect()
}

/// Anti-forgery token from the first element that carries one
fn find_once(root: ElementRef<'_>) -> Option<String> {
    root.select(&ONCE_LINK)
        .filter_map(|link| link.value().attr("href"))
        .find_map(|href| query_param(href, "once"))
        .or_else(|| {
            root.select(&ONCE_ONCLICK)
                .filter_map(|el| el.value().attr("onclick"))
                .find_map(once_token)
        })
        .or_else(|| first_attr(root, &ONCE_INPUT, "value").filter(|v| !v.is_empty()))
}

fn parse_replies(reply_box: ElementRef<'_>) -> Vec<TopicReply> {
    child_elements(reply_box, &REPLY_CELL)
        .filter_map(|cell| {
            let id = cell.value().id().and_then(reply_id)?;
            Some(parse_reply(cell, id))
        })
        .collect()
}

fn parse_reply(cell: ElementRef<'_>, id: &str) -> TopicReply {
    let thanks = first_text(cell, &REPLY_THANKS)
        .and_then(|t| first_integer(&t))
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or_default();

    TopicReply {
        reply_id: id.to_string(),
        user_name: first_html(cell, &REPLY_USER).unwrap_or_default(),
        user_avatar: first_attr(cell, &REPLY_AVATAR, "src").unwrap_or_default(),
        time: first_text(cell, &REPLY_TIME).unwrap_or_default(),
        floor: first_text(cell, &REPLY_FLOOR).unwrap_or_default(),
        content: first_html(cell, &REPLY_CONTENT).unwrap_or_default(),
        thanks,
        thanked: cell.select(&REPLY_THANKED).next().is_some(),
    }
}

/// Last page-number link of the pager, or 1 without a pager
fn total_pages(reply_box: ElementRef<'_>) -> u32 {
    reply_box
        .select(&PAGER_LINK)
        .last()
        .and_then(|link| leading_integer(&element_text(link)))
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(1)
        .max(1)
}
