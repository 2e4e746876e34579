pub mod events;
pub mod pagination;
pub mod tags;

use std::collections::HashMap;

use serde_json::Value;

/// Everything one listing page contributes to a run.
pub struct PageExtract {
    pub events: Vec<Value>,
    pub tags: HashMap<String, Vec<String>>,
}

/// Parse one page body into its JSON-LD events and card tag map.
pub fn parse_page(html: &str) -> PageExtract {
    PageExtract {
        events: events::extract_events(html),
        tags: tags::extract_tags(html),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_fixture_parses_events_and_tags() {
        let html = std::fs::read_to_string("tests/fixtures/listing.html").unwrap();
        let page = parse_page(&html);

        assert_eq!(page.events.len(), 2);
        assert_eq!(
            page.events[0]["url"],
            "https://calendar.niu.edu/event/jazz-ensemble-fall-concert"
        );

        assert_eq!(
            page.tags["https://calendar.niu.edu/event/jazz-ensemble-fall-concert"],
            vec!["Music".to_string(), "Free".to_string()]
        );
        // The second card carries only the "New" badge, so no entry.
        assert!(!page
            .tags
            .contains_key("https://calendar.niu.edu/event/graduate-research-forum"));
    }

    #[test]
    fn listing_fixture_paginates_to_three() {
        let html = std::fs::read_to_string("tests/fixtures/listing.html").unwrap();
        assert_eq!(pagination::max_page(&html), 3);
    }
}
