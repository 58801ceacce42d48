//! v2ex-explore - V2EX forum client
//!
//! Reads the server-rendered pages of the V2EX forum and turns them into typed
//! records: topic listings, topic detail with every reply page merged, the
//! node directory, plus the signed-in actions a reader needs.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`crawler`] - Page fetching, access classification and client operations
//! - [`parser`] - HTML parsing and record extraction
//! - [`models`] - Core data structures and types
//! - [`session`] - Credential, notice timestamp and node cache
//! - [`notifications`] - User-facing notices
//! - [`utils`] - Common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use v2ex_explore::config::Config;
//! use v2ex_explore::crawler::V2exClient;
//! use v2ex_explore::session::Session;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let client = V2exClient::new(&config, Arc::new(Session::in_memory()))?;
//!     let topic = client.topic_detail(1_000_000).await?;
//!     println!("{} ({} replies)", topic.title, topic.reply_count);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crawler;
pub mod error;
pub mod models;
pub mod notifications;
pub mod parser;
pub mod session;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::crawler::access::AccessOutcome;
    pub use crate::crawler::search::SearchQuery;
    pub use crate::crawler::V2exClient;
    pub use crate::error::{Error, ErrorCategory, Result, V2exErrorTrait};
    pub use crate::models::{
        DailyOutcome, NodeListing, NodeRef, SearchHit, SearchSort, ThankResponse, Topic,
        TopicAppend, TopicDetail, TopicReply,
    };
    pub use crate::notifications::{LogNotifier, Notice, Notifier};
    pub use crate::session::{JsonFileStore, MemoryStore, Session, StateStore};
    pub use crate::utils::error::{AccessError, ClientError, FetchError};
}

// Direct re-exports for convenience
pub use crawler::V2exClient;
pub use models::{NodeRef, Topic, TopicDetail, TopicReply};
