//! Markup stripping and link extraction

use std::sync::OnceLock;

use regex::Regex;
use reqwest::Url;

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static pattern is valid"))
}

fn hidden_blocks() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(
        &RE,
        r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>|<noscript\b.*?</noscript\s*>|<!--.*?-->",
    )
}

fn tags() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?s)<[^>]*>")
}

fn whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"\s+")
}

fn hrefs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r#"(?i)<a\b[^>]*?\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
}

const ENTITIES: [(&str, &str); 7] = [
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&apos;", "'"),
    // 必须最后处理
    ("&amp;", "&"),
];

/// Visible text of an HTML page, whitespace collapsed
pub fn visible_text(html: &str) -> String {
    let without_hidden = hidden_blocks().replace_all(html, " ");
    let without_tags = tags().replace_all(&without_hidden, " ");

    let mut text = without_tags.into_owned();
    for (entity, replacement) in ENTITIES {
        if text.contains(entity) {
            text = text.replace(entity, replacement);
        }
    }

    whitespace().replace_all(text.trim(), " ").into_owned()
}

/// Up to `limit` link targets, resolved against `base` when relative.
///
/// Fragment-only and `javascript:` targets are skipped.
pub fn extract_links(html: &str, base: &str, limit: usize) -> Vec<String> {
    let base = Url::parse(base).ok();

    hrefs()
        .captures_iter(html)
        .filter_map(|caps| {
            caps.get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .map(|m| m.as_str().trim())
        })
        .filter(|href| {
            !href.is_empty()
                && !href.starts_with('#')
                && !href.to_ascii_lowercase().starts_with("javascript:")
        })
        .filter_map(|href| match &base {
            Some(base) => base.join(href).ok().map(String::from),
            None => Url::parse(href).ok().map(String::from),
        })
        .take(limit)
        .collect()
}
