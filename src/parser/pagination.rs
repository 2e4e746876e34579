use std::sync::LazyLock;

use regex::Regex;

static PAGE_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/calendar/six_months/\d+/\d+/\d+/(\d+)").unwrap());

/// Highest page index referenced by pagination links in a page body.
/// A body without any such link is a single-page listing.
pub fn max_page(html: &str) -> u32 {
    PAGE_LINK_RE
        .captures_iter(html)
        .filter_map(|c| c[1].parse::<u32>().ok())
        .max()
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_links_means_single_page() {
        assert_eq!(max_page("<html><body>no pagination</body></html>"), 1);
    }

    #[test]
    fn takes_the_maximum_index() {
        let html = r#"
            <a href="/calendar/six_months/2025/11/27/2">2</a>
            <a href="/calendar/six_months/2025/11/27/7">7</a>
            <a href="/calendar/six_months/2025/11/27/3">3</a>
        "#;
        assert_eq!(max_page(html), 7);
    }

    #[test]
    fn absolute_urls_also_match() {
        let html = r#"<a href="https://calendar.niu.edu/calendar/six_months/2025/11/27/12">next</a>"#;
        assert_eq!(max_page(html), 12);
    }

    #[test]
    fn unrelated_paths_do_not_count() {
        let html = r#"<a href="/calendar/day/2025/11/27/9">day view</a>"#;
        assert_eq!(max_page(html), 1);
    }
}
