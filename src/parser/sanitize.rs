//! Plain-text rendering of HTML fragments
//!
//! Topic bodies, appends and replies are kept as HTML in the records. This
//! module turns them into readable text for terminal output.

use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());

static MULTI_NEWLINE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

static BREAK_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>|</p>|</li>|</div>").unwrap());

/// Convert an HTML fragment to plain text
///
/// Line breaks and paragraph ends become newlines; entities are decoded by
/// the HTML parser.
///
/// # Examples
///
/// ```
/// use v2ex_explore::parser::sanitize::fragment_text;
///
/// let text = fragment_text("line one<br>line &amp; two");
/// assert_eq!(text, "line one\nline & two");
/// ```
pub fn fragment_text(html: &str) -> String {
    let with_breaks = BREAK_TAG_REGEX.replace_all(html, "$0\n");
    let fragment = Html::parse_fragment(&with_breaks);
    let text: String = fragment.root_element().text().collect();

    let text = remove_zero_width(&text);
    let text = text.replace('\u{a0}', " ");
    let text = WHITESPACE_REGEX.replace_all(&text, " ");
    let text = trim_lines(&text);
    MULTI_NEWLINE_REGEX
        .replace_all(&text, "\n\n")
        .trim()
        .to_string()
}

/// Remove zero-width spaces and similar invisible characters
pub fn remove_zero_width(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(*c, '\u{200B}'..='\u{200F}' | '\u{2028}'..='\u{202F}' | '\u{FEFF}'))
        .collect()
}

fn trim_lines(text: &str) -> String {
    text.lines().map(str::trim).collect::<Vec<_>>().join("\n")
}
