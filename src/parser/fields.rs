//! Parsers for semi-structured text fields
//!
//! The site packs several values into single strings: the topic meta line
//! (`author · time · N 次点击`), the stats line (`N 人收藏 ∙ M 人感谢`), the reply
//! header (`25 条回复 • 2024-01-01`), and tokens carried in query strings.
//! Each parser here handles one field and returns `None` on mismatch so
//! callers pick their own default.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::crawler::url::{NODE_PATH_PREFIX, TOPIC_PATH_PREFIX};

static FIRST_INTEGER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

static COLLECT_COUNT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*人收藏").unwrap());

static THANK_COUNT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*人感谢").unwrap());

static TOPIC_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/t/(\d+)").unwrap());

static ONCE_TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]once=(\d+)").unwrap());

/// Pending-notification count prefixed to the page title, e.g. `(3) V2EX › ...`
static UNREAD_TITLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\((\d+)\)").unwrap());

/// Separator of the topic meta line and of append headers
pub const META_SEPARATOR: char = '·';

/// Separator of the reply header line
pub const REPLY_HEADER_SEPARATOR: char = '•';

/// Element-id prefix of reply cells
pub const REPLY_ID_PREFIX: &str = "r_";

/// Fields of the topic meta line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaLine {
    pub author: String,
    pub time: String,
    pub visits: String,
}

/// Split the topic meta line into author, time and visits
///
/// Assumes the separator never occurs inside one of the three fields. Fewer
/// than three parts is a mismatch; anything past the third part is ignored.
pub fn parse_meta_line(text: &str) -> Option<MetaLine> {
    let mut parts = text.split(META_SEPARATOR).map(str::trim);
    let author = parts.next()?;
    let time = parts.next()?;
    let visits = parts.next()?;

    Some(MetaLine {
        author: author.to_string(),
        time: time.to_string(),
        visits: visits.to_string(),
    })
}

/// First run of digits anywhere in `text`
pub fn first_integer(text: &str) -> Option<u64> {
    FIRST_INTEGER_REGEX
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
}

/// Digits at the very start of `text` after trimming, like `parseInt`
pub fn leading_integer(text: &str) -> Option<u64> {
    let trimmed = text.trim_start();
    let end = trimmed
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(trimmed.len(), |(i, _)| i);
    trimmed[..end].parse().ok()
}

/// Declared reply count from the reply header line
pub fn parse_declared_reply_count(text: &str) -> Option<u64> {
    let head = text.split(REPLY_HEADER_SEPARATOR).next()?;
    leading_integer(head)
}

/// Collect count from the stats line
pub fn parse_collect_count(stats: &str) -> Option<u32> {
    COLLECT_COUNT_REGEX
        .captures(stats)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Thank count from the stats line
pub fn parse_thank_count(stats: &str) -> Option<u32> {
    THANK_COUNT_REGEX
        .captures(stats)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Time part of an append header (`第 1 条附言 · 3 天前`)
pub fn parse_append_time(text: &str) -> Option<String> {
    text.split(META_SEPARATOR)
        .nth(1)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Value of `key` in the query string of `href`
///
/// Works on relative and absolute links.
pub fn query_param(href: &str, key: &str) -> Option<String> {
    static DUMMY_BASE: LazyLock<Url> =
        LazyLock::new(|| Url::parse("http://localhost/").unwrap());

    let url = DUMMY_BASE.join(href.trim()).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

/// `once` token embedded anywhere in `text` (href or onclick handler)
pub fn once_token(text: &str) -> Option<String> {
    ONCE_TOKEN_REGEX
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Node slug from a `/go/{slug}` link
pub fn node_slug(href: &str) -> Option<String> {
    let (_, rest) = href.split_once(NODE_PATH_PREFIX)?;
    let slug = rest
        .split(['?', '#', '/'])
        .next()
        .unwrap_or_default()
        .trim();
    (!slug.is_empty()).then(|| slug.to_string())
}

/// Topic id from a `/t/{id}` link
pub fn topic_id(href: &str) -> Option<u64> {
    if !href.contains(TOPIC_PATH_PREFIX) {
        return None;
    }
    TOPIC_ID_REGEX
        .captures(href)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Reply id from a reply cell's element id (`r_12345` → `12345`)
pub fn reply_id(element_id: &str) -> Option<&str> {
    element_id
        .strip_prefix(REPLY_ID_PREFIX)
        .filter(|rest| !rest.is_empty())
}

/// Pending-notification count encoded in the page title
pub fn unread_notifications(title: &str) -> Option<u32> {
    UNREAD_TITLE_REGEX
        .captures(title)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
