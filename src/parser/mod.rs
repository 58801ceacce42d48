//! HTML parsing and record extraction
//!
//! Every page type the client reads has a parser here. Parsers are pure:
//! they take the page body and return typed records, substituting empty
//! strings and zero counts for missing elements instead of failing. A layout
//! change therefore shows up as blank fields, not as an error.

pub mod fields;
pub mod listing;
pub mod sanitize;
pub mod selectors;
pub mod topic;

pub use listing::{
    parse_collected_nodes, parse_node_directory, parse_node_listing, parse_tab_listing,
};
pub use sanitize::fragment_text;
pub use topic::{parse_reply_page, parse_topic_page, TopicPage};

use scraper::{ElementRef, Html, Selector};

/// Trimmed text content of an element
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Trimmed text of the first descendant matching `selector`
pub(crate) fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope.select(selector).next().map(element_text)
}

/// Trimmed inner HTML of the first descendant matching `selector`
pub(crate) fn first_html(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(|el| el.inner_html().trim().to_string())
}

/// Attribute of the first descendant matching `selector`
pub(crate) fn first_attr(scope: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    scope
        .select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|v| v.trim().to_string())
}

/// Direct element children of `parent` matching `selector`, in document order
pub(crate) fn child_elements<'a>(
    parent: ElementRef<'a>,
    selector: &'a Selector,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |el| selector.matches(el))
}

/// Text of the document's `<title>`
pub(crate) fn page_title(document: &Html) -> Option<String> {
    document
        .select(&selectors::PAGE_TITLE)
        .next()
        .map(element_text)
}
