//! Listing operations
//!
//! Tab and node listings, the full node directory and the signed-in user's
//! collected nodes.

use crate::crawler::V2exClient;
use crate::models::{NodeListing, NodeRef, Topic};
use crate::parser::{
    parse_collected_nodes, parse_node_directory, parse_node_listing, parse_tab_listing,
};
use crate::utils::error::ClientError;

/// Node directory page
const NODE_DIRECTORY_PATH: &str = "/planes";

/// Collected nodes of the signed-in user
const COLLECTED_NODES_PATH: &str = "/my/nodes";

impl V2exClient {
    /// Topics of a front-page tab, in page order
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Access` when the tab requires a sign-in the
    /// session cannot provide, or `ClientError::Fetch` on transport failure
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use std::sync::Arc;
    /// # use v2ex_explore::config::Config;
    /// # use v2ex_explore::crawler::V2exClient;
    /// # use v2ex_explore::session::Session;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = V2exClient::new(&Config::default(), Arc::new(Session::in_memory()))?;
    /// for topic in client.tab_topics("tech").await? {
    ///     println!("{} {}", topic.id, topic.title);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn tab_topics(&self, tab: &str) -> Result<Vec<Topic>, ClientError> {
        let url = self.fetcher().urls().tab_page(tab)?;
        let page = self.load_page(url.as_str()).await?;

        let topics = parse_tab_listing(&page.body, self.fetcher().urls());
        tracing::debug!(tab, count = topics.len(), "Parsed tab listing");
        Ok(topics)
    }

    /// Topics of a node, with the node's display title
    ///
    /// # Errors
    ///
    /// Same as [`V2exClient::tab_topics`]
    pub async fn node_topics(&self, name: &str) -> Result<NodeListing, ClientError> {
        let url = self.fetcher().urls().node_page(name)?;
        let page = self.load_page(url.as_str()).await?;

        let listing = parse_node_listing(&page.body, name, self.fetcher().urls());
        tracing::debug!(node = name, count = listing.topics.len(), "Parsed node listing");
        Ok(listing)
    }

    /// Every node on the site
    ///
    /// Fetched once and then served from the session cache for the rest of
    /// the process.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Fetch` if the directory page cannot be loaded
    pub async fn all_nodes(&self) -> Result<Vec<NodeRef>, ClientError> {
        if let Some(nodes) = self.session().cached_nodes() {
            tracing::debug!(count = nodes.len(), "Node directory served from cache");
            return Ok(nodes);
        }

        let page = self.fetcher().get(NODE_DIRECTORY_PATH).await?;
        let nodes = parse_node_directory(&page.body);
        tracing::debug!(count = nodes.len(), "Parsed node directory");

        self.session().cache_nodes(nodes.clone());
        Ok(nodes)
    }

    /// Nodes the signed-in user has collected
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Access` with `LoginRequired` when signed out
    pub async fn collected_nodes(&self) -> Result<Vec<NodeRef>, ClientError> {
        let page = self.load_page(COLLECTED_NODES_PATH).await?;
        Ok(parse_collected_nodes(&page.body))
    }
}
