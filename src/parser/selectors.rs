//! CSS selectors for the site's page types
//!
//! Listings, the node directory, collected nodes, and topic pages (header,
//! social actions, reply stream, pager) each get their own group below.

use lazy_static::lazy_static;
use scraper::Selector;

// Helper macro to parse selectors safely at compile time
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

lazy_static! {
    // Shared
    pub static ref MAIN_BOX: Selector = parse_selector!("#Main > .box");
    pub static ref PAGE_TITLE: Selector = parse_selector!("title");

    // Listings
    pub static ref TAB_ROW: Selector = parse_selector!(".cell.item");
    pub static ref NODE_ROW: Selector = parse_selector!("#TopicsNode > .cell");
    pub static ref TOPIC_LINK: Selector = parse_selector!("a.topic-link");
    pub static ref ROW_NODE_LINK: Selector = parse_selector!("a.node");

    // Node directory and collected nodes
    pub static ref DIRECTORY_NODE: Selector = parse_selector!("a.item_node");
    pub static ref COLLECTED_NODE: Selector = parse_selector!("#my-nodes a.fav-node");
    pub static ref COLLECTED_NODE_NAME: Selector = parse_selector!(".fav-node-name");

    // Topic header
    pub static ref HEADER_TITLE: Selector = parse_selector!(".header > h1");
    pub static ref HEADER_LINK: Selector = parse_selector!(".header > a");
    pub static ref HEADER_AVATAR: Selector = parse_selector!(".header > .fr img.avatar");
    pub static ref HEADER_META: Selector = parse_selector!(".header > .gray");
    pub static ref TOPIC_CONTENT: Selector = parse_selector!(".cell > .topic_content");
    pub static ref APPEND_BLOCK: Selector = parse_selector!(".subtle");
    pub static ref APPEND_TIME: Selector = parse_selector!(".fade");
    pub static ref APPEND_CONTENT: Selector = parse_selector!(".topic_content");

    // Anti-forgery token carriers
    pub static ref ONCE_LINK: Selector = parse_selector!("a[href*=\"once=\"]");
    pub static ref ONCE_ONCLICK: Selector = parse_selector!("[onclick*=\"once=\"]");
    pub static ref ONCE_INPUT: Selector = parse_selector!("input[name=\"once\"]");

    // Social actions
    pub static ref COLLECT_TOGGLE: Selector =
        parse_selector!(".topic_buttons a[href*=\"favorite/topic/\"]");
    pub static ref TOPIC_STATS: Selector = parse_selector!(".topic_stats");
    pub static ref TOPIC_THANK: Selector = parse_selector!("#topic_thank");
    pub static ref TOPIC_THANKED: Selector = parse_selector!("#topic_thank .topic_thanked");

    // Reply stream
    pub static ref CELL: Selector = parse_selector!("div.cell");
    pub static ref REPLY_COUNT: Selector = parse_selector!("span.gray");
    pub static ref REPLY_CELL: Selector = parse_selector!("div.cell[id]");
    pub static ref REPLY_AVATAR: Selector = parse_selector!("img.avatar");
    pub static ref REPLY_USER: Selector = parse_selector!("a.dark");
    pub static ref REPLY_TIME: Selector = parse_selector!("span.ago");
    pub static ref REPLY_FLOOR: Selector = parse_selector!("span.no");
    pub static ref REPLY_CONTENT: Selector = parse_selector!(".reply_content");
    pub static ref REPLY_THANKS: Selector = parse_selector!("span.small.fade");
    pub static ref REPLY_THANKED: Selector = parse_selector!(".thank_area.thanked");
    pub static ref PAGER_LINK: Selector = parse_selector!("a.page_normal");
}
