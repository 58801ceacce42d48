// Core data structures for the V2EX client

use serde::{Deserialize, Serialize};
use std::fmt;

/// Forum node (sub-category)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct NodeRef {
    pub name: String,  // Slug used in /go/{name}
    pub title: String, // Display label
}

impl NodeRef {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
        }
    }
}

/// Topic summary from a listing page
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Topic {
    pub id: u64,
    pub title: String,
    pub link: String, // Canonical https://host/t/{id}, no fragment
    pub node: NodeRef,
}

/// Result of a node-scoped listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeListing {
    pub node: NodeRef,
    pub topics: Vec<Topic>,
}

/// Post-hoc addition to a topic
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TopicAppend {
    pub time: String,
    pub content: String, // HTML fragment
}

/// One reply in a topic's reply stream
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TopicReply {
    pub reply_id: String,
    pub user_name: String, // HTML, keeps embedded formatting
    pub user_avatar: String,
    pub time: String,
    pub floor: String,
    pub content: String, // HTML fragment
    pub thanks: u32,
    pub thanked: bool,
}

/// Full topic with replies and interaction state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicDetail {
    pub id: u64,
    pub link: String,
    /// Anti-forgery token for reply/thank actions
    pub once: Option<String>,
    pub title: String,
    pub node: NodeRef,
    pub author_name: String,
    pub author_avatar: String,
    pub display_time: String,
    pub visit_count: u64,
    pub content: String,
    pub appends: Vec<TopicAppend>,
    pub collect_count: u32,
    pub thank_count: u32,
    pub is_collected: bool,
    pub is_thanked: bool,
    /// False on one's own topic or when signed out
    pub can_thank: bool,
    /// `t` parameter of the collect toggle; `None` when the toggle is absent
    pub collect_param_t: Option<String>,
    pub reply_count: usize,
    pub replies: Vec<TopicReply>,
}

impl TopicDetail {
    /// Append replies from later pages and reconcile the declared count
    ///
    /// The site sometimes undercounts; the merged length wins when larger.
    pub fn extend_replies(&mut self, more: impl IntoIterator<Item = TopicReply>) {
        self.replies.extend(more);
        if self.replies.len() > self.reply_count {
            self.reply_count = self.replies.len();
        }
    }
}

/// Sort order accepted by the search API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchSort {
    /// Relevance weighting
    #[default]
    Sumup,
    /// Post time
    Created,
}

impl SearchSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sumup => "sumup",
            Self::Created => "created",
        }
    }
}

impl fmt::Display for SearchSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `_source` record of a search hit
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchHit {
    pub id: u64,
    pub member: String,
    pub title: String,
    pub content: String,
    pub replies: u32,
    pub created: String,
}

/// Response of a thank action
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThankResponse {
    pub success: bool,
    /// Fresh token to use for the next action
    #[serde(deserialize_with = "token_from_string_or_number")]
    pub once: Option<String>,
}

// The site has sent `once` both as a JSON string and as a bare number.
fn token_from_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Result of the daily check-in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DailyOutcome {
    Redeemed,
    AlreadyRedeemed,
    Failed,
}

impl fmt::Display for DailyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Redeemed => "daily reward redeemed",
            Self::AlreadyRedeemed => "daily reward already redeemed",
            Self::Failed => "daily check-in failed",
        };
        f.write_str(text)
    }
}
