use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::warn;

static LD_JSON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<script type="application/ld\+json">\[(.*?)\]</script>"#).unwrap()
});

/// Pull every JSON-LD array block out of a page body, flattened in document
/// order. A malformed block is logged and skipped; the remaining blocks on the
/// same page still parse. No blocks at all is an empty result, not an error.
pub fn extract_events(html: &str) -> Vec<Value> {
    let mut events = Vec::new();

    for caps in LD_JSON_RE.captures_iter(html) {
        let raw = format!("[{}]", &caps[1]);
        match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(batch) => events.extend(batch),
            Err(e) => warn!("Skipping malformed JSON-LD block: {}", e),
        }
    }

    events
}
