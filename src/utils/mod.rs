//! Small helpers shared by the adapters and the index merger.

pub mod http;
pub mod log;

use std::sync::OnceLock;

use regex::Regex;
use scraper::Selector;
use url::Url;

/// Parse a hard-coded CSS selector once, caching it in the given cell.
pub fn static_selector(cell: &'static OnceLock<Selector>, css: &'static str) -> &'static Selector {
    cell.get_or_init(|| Selector::parse(css).expect("hard-coded selector"))
}

/// Compile a hard-coded pattern once, caching it in the given cell.
pub fn static_regex(cell: &'static OnceLock<Regex>, pattern: &'static str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("hard-coded pattern"))
}

/// Resolve an href against its page's base, keeping already absolute URLs
/// intact. An unjoinable href is passed through untouched.
pub fn resolve_url(base: &Url, href: &str) -> String {
    match base.join(href) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => href.to_string(),
    }
}

/// Collapse runs of three or more newlines down to exactly two.
pub fn collapse_excess_newlines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = 0usize;
    for ch in text.chars() {
        if ch == '\n' {
            run += 1;
            if run <= 2 {
                out.push(ch);
            }
        } else {
            run = 0;
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://codeforces.com/problemset/").unwrap();
        assert_eq!(
            resolve_url(&base, "/predownloaded/fig.png"),
            "https://codeforces.com/predownloaded/fig.png"
        );
        assert_eq!(
            resolve_url(&base, "fig.png"),
            "https://codeforces.com/problemset/fig.png"
        );
        assert_eq!(
            resolve_url(&base, "https://cdn.example.net/fig.png"),
            "https://cdn.example.net/fig.png"
        );
    }

    #[test]
    fn test_static_patterns_cached_per_cell() {
        static RE: OnceLock<Regex> = OnceLock::new();
        assert!(std::ptr::eq(
            static_regex(&RE, r"\d+"),
            static_regex(&RE, r"\d+")
        ));

        static SEL: OnceLock<Selector> = OnceLock::new();
        assert!(std::ptr::eq(
            static_selector(&SEL, "div.part"),
            static_selector(&SEL, "div.part")
        ));
    }

    #[test]
    fn test_collapse_excess_newlines() {
        assert_eq!(collapse_excess_newlines("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(collapse_excess_newlines("a\n\nb"), "a\n\nb");
        assert_eq!(collapse_excess_newlines("a\nb"), "a\nb");
    }
}
