// src/extract.rs
//! YouTube link extraction from normalized message text.
//!
//! Patterns are checked in a fixed order; within one pattern, matches come in
//! text order. Every scan walks the text with a fresh iterator, so repeated
//! calls can never see each other's match positions.

use once_cell::sync::OnceCell;
use regex::Regex;

/// One pattern match: the captured video id plus the full matched substring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkMatch {
    pub identifier: String,
    pub matched: String,
}

fn patterns() -> &'static [Regex; 2] {
    static PATTERNS: OnceCell<[Regex; 2]> = OnceCell::new();
    PATTERNS.get_or_init(|| {
        [
            // short links: https://youtu.be/<id>
            Regex::new(r"https://youtu\.be/([\w-]{11,})").unwrap(),
            // watch links, with or without extra query params before v=
            Regex::new(r"https://[\w./-]*youtube\.com/watch\?[\w&=.%-]*?v=([\w-]{11,})").unwrap(),
        ]
    })
}

/// All video links in `text`, pattern order then match order.
pub fn extract_links(text: &str) -> Vec<LinkMatch> {
    let mut out = Vec::new();
    for re in patterns() {
        for caps in re.captures_iter(text) {
            out.push(LinkMatch {
                identifier: caps[1].to_string(),
                matched: caps[0].to_string(),
            });
        }
    }
    out
}

/// True if `text` contains at least one video link. Stops at the first hit.
pub fn has_link(text: &str) -> bool {
    patterns().iter().any(|re| re.is_match(text))
}
