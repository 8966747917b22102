//! HTML to plain text.
//!
//! Walks the parsed document collecting text from block-level content
//! elements while skipping script/style/navigation subtrees, then
//! collapses whitespace and truncates to the configured character
//! budget. The `scraper` `Html` type is not `Send`, so everything here
//! is synchronous and must not be held across an await point.

use scraper::{ElementRef, Html, Node, Selector};

const SKIP_TAGS: [&str; 9] = [
    "script", "style", "nav", "header", "footer", "noscript", "svg", "aside", "iframe",
];

const BLOCK_TAGS: [&str; 17] = [
    "p", "div", "br", "h1", "h2", "h3", "h4", "h5", "h6", "li", "tr", "td", "th", "article",
    "section", "blockquote", "pre",
];

/// Extract visible text from an HTML document, truncated to `max_chars`.
pub fn html_to_text(html: &str, max_chars: usize) -> String {
    let doc = Html::parse_document(html);

    if let Ok(body_sel) = Selector::parse("body") {
        if let Some(body) = doc.select(&body_sel).next() {
            let mut buf = String::with_capacity(max_chars.min(16_384));
            collect_text(&body, &mut buf, max_chars);
            return collapse_whitespace(&buf, max_chars);
        }
    }

    // Fragment without a <body>: take all document text.
    let raw: String = doc.root_element().text().collect();
    collapse_whitespace(&raw, max_chars)
}

fn collect_text(node: &ElementRef<'_>, buf: &mut String, max_chars: usize) {
    for child in node.children() {
        // Collect a little past the budget; collapse trims precisely.
        if buf.len() >= max_chars * 2 {
            return;
        }
        match child.value() {
            Node::Text(text) => buf.push_str(text),
            Node::Element(el) => {
                let tag = el.name();
                if SKIP_TAGS.contains(&tag) {
                    continue;
                }
                if BLOCK_TAGS.contains(&tag) {
                    buf.push('\n');
                }
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_text(&child_ref, buf, max_chars);
                }
            }
            _ => {}
        }
    }
}

fn collapse_whitespace(text: &str, max_chars: usize) -> String {
    let mut result = String::with_capacity(text.len().min(max_chars + 8));
    let mut prev_was_space = true;

    for ch in text.chars() {
        if ch.is_whitespace() {
            if !prev_was_space {
                result.push(' ');
                prev_was_space = true;
            }
        } else {
            if result.chars().count() >= max_chars {
                break;
            }
            result.push(ch);
            prev_was_space = false;
        }
    }

    result.trim().to_string()
}
