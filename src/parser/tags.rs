use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Opens each event's container markup. The class attribute is left open on
/// purpose: the class list continues with a variant class (`em-card--list`
/// and friends), so only the leading `em-card ` prefix is stable.
const CARD_MARKER: &str = r#"<div class="em-card "#;

static EVENT_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"href="(https://calendar\.niu\.edu/event/[^"]+)""#).unwrap()
});

// The regex crate has no lookahead, so the rest of the class list is captured
// and checked for the "new" marker class instead.
static TAG_SPAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<span class="em-card_tag([^"]*)"[^>]*>(.*?)</span>"#).unwrap()
});

/// Map each event card's canonical URL to its tag labels, in document order.
/// Cards without a recognizable event URL are skipped, as are cards yielding
/// zero tags. "New" badges styled like tags are never treated as content tags.
pub fn extract_tags(html: &str) -> HashMap<String, Vec<String>> {
    let mut tags_by_url = HashMap::new();

    // Everything before the first card marker is page chrome.
    for card in html.split(CARD_MARKER).skip(1) {
        let Some(url) = EVENT_URL_RE.captures(card).map(|c| c[1].to_string()) else {
            continue;
        };

        let tags: Vec<String> = TAG_SPAN_RE
            .captures_iter(card)
            .filter(|c| !c[1].contains("em-new-tag"))
            .map(|c| c[2].trim().to_string())
            .collect();

        if !tags.is_empty() {
            tags_by_url.insert(url, tags);
        }
    }

    tags_by_url
}
