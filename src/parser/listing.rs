//! Topic listings and node directories
//!
//! Rows are never dropped: a row whose link or node cannot be read still
//! yields a [`Topic`] with empty fields and id 0, so the caller sees exactly
//! as many entries as the page shows.

use scraper::{ElementRef, Html};

use crate::crawler::url::SiteUrls;
use crate::models::{NodeListing, NodeRef, Topic};
use crate::parser::fields::{node_slug, topic_id};
use crate::parser::selectors::{
    COLLECTED_NODE, COLLECTED_NODE_NAME, DIRECTORY_NODE, MAIN_BOX, NODE_ROW, ROW_NODE_LINK,
    TAB_ROW, TOPIC_LINK,
};
use crate::parser::{element_text, first_text, page_title};

/// Title prefix the site puts on node pages
const SITE_TITLE_SEPARATOR: char = '›';

/// Parse a tab listing (`/?tab=...`)
///
/// Rows come from the first main box only; side boxes repeat hot topics.
pub fn parse_tab_listing(html: &str, urls: &SiteUrls) -> Vec<Topic> {
    let document = Html::parse_document(html);

    let Some(main_box) = document.select(&MAIN_BOX).next() else {
        tracing::debug!("Tab listing has no main box");
        return Vec::new();
    };

    main_box
        .select(&TAB_ROW)
        .map(|row| parse_topic_row(row, urls, None))
        .collect()
}

/// Parse a node listing (`/go/{name}`)
///
/// The node title comes from the page title; `name` is used when it is
/// missing.
pub fn parse_node_listing(html: &str, name: &str, urls: &SiteUrls) -> NodeListing {
    let document = Html::parse_document(html);

    let title = page_title(&document)
        .and_then(|t| node_title_from_page_title(&t))
        .unwrap_or_else(|| name.to_string());
    let node = NodeRef::new(name, title);

    let topics = document
        .select(&NODE_ROW)
        .map(|row| parse_topic_row(row, urls, Some(&node)))
        .collect();

    NodeListing { node, topics }
}

/// Parse the node directory (`/planes`)
pub fn parse_node_directory(html: &str) -> Vec<NodeRef> {
    let document = Html::parse_document(html);

    document
        .select(&DIRECTORY_NODE)
        .map(|link| {
            let name = link
                .value()
                .attr("href")
                .and_then(node_slug)
                .unwrap_or_default();
            NodeRef::new(name, element_text(link))
        })
        .collect()
}

/// Parse the signed-in user's collected nodes (`/my/nodes`)
pub fn parse_collected_nodes(html: &str) -> Vec<NodeRef> {
    let document = Html::parse_document(html);

    document
        .select(&COLLECTED_NODE)
        .map(|link| {
            let name = link
                .value()
                .attr("href")
                .and_then(node_slug)
                .unwrap_or_default();
            // The name span also holds a topic counter; only its own text is the title
            let title = link
                .select(&COLLECTED_NODE_NAME)
                .next()
                .map(own_text)
                .unwrap_or_else(|| element_text(link));
            NodeRef::new(name, title)
        })
        .collect()
}

fn parse_topic_row(row: ElementRef<'_>, urls: &SiteUrls, listed_node: Option<&NodeRef>) -> Topic {
    let link_el = row.select(&TOPIC_LINK).next();
    let href = link_el
        .and_then(|el| el.value().attr("href"))
        .unwrap_or_default();

    let node = row
        .select(&ROW_NODE_LINK)
        .next()
        .map(|el| {
            let name = el
                .value()
                .attr("href")
                .and_then(node_slug)
                .unwrap_or_default();
            NodeRef::new(name, element_text(el))
        })
        .or_else(|| listed_node.cloned())
        .unwrap_or_default();

    Topic {
        id: topic_id(href).unwrap_or_default(),
        title: first_text(row, &TOPIC_LINK).unwrap_or_default(),
        link: urls.resolve_link(href).unwrap_or_default(),
        node,
    }
}

fn node_title_from_page_title(title: &str) -> Option<String> {
    let last = title.rsplit(SITE_TITLE_SEPARATOR).next()?.trim();
    if last.is_empty() || !title.contains(SITE_TITLE_SEPARATOR) {
        return None;
    }
    Some(last.to_string())
}

/// Text of the element's own text nodes, excluding child elements
fn own_text(element: ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|child| child.value().as_text().map(|t| &**t))
        .collect::<String>()
        .trim()
        .to_string()
}
