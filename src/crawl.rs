use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::fetch::FetchPage;
use crate::parser;

pub struct CrawlOptions {
    /// Fixed pause before each page fetch after the first.
    pub delay: Duration,
    /// Optional cap on the discovered page bound.
    pub page_cap: Option<u32>,
    /// Write page 1's raw body here for troubleshooting extraction failures.
    pub dump_first_page: Option<PathBuf>,
}

pub struct CrawlStats {
    pub pages_total: u32,
    pub pages_failed: u32,
}

/// Raw accumulation of a full run, before dedup and tag merging.
pub struct Crawl {
    pub events: Vec<Value>,
    pub tags: HashMap<String, Vec<String>>,
    pub stats: CrawlStats,
}

/// Fetch page 1, discover the page bound from its pagination links, then walk
/// pages 2..=bound strictly sequentially with a fixed pause before each fetch.
///
/// A page-1 failure aborts the run; any later page's failure is logged and
/// skipped. Tag entries from later pages overwrite earlier ones for the same
/// URL; the event sequence is append-only.
pub async fn crawl(fetcher: &dyn FetchPage, opts: &CrawlOptions) -> Result<Crawl> {
    let mut events: Vec<Value> = Vec::new();
    let mut tags: HashMap<String, Vec<String>> = HashMap::new();

    let first = fetcher.fetch(1).await.context("Failed to fetch page 1")?;

    if let Some(path) = &opts.dump_first_page {
        std::fs::write(path, &first)
            .with_context(|| format!("Failed to dump page 1 HTML to {}", path.display()))?;
    }

    debug!(
        "page 1: {} chars, ld+json present: {}, em-card present: {}",
        first.len(),
        first.contains("application/ld+json"),
        first.contains("em-card")
    );

    let extract = parser::parse_page(&first);
    info!(
        "page 1: {} events, {} cards with tags",
        extract.events.len(),
        extract.tags.len()
    );
    events.extend(extract.events);
    tags.extend(extract.tags);

    let discovered = parser::pagination::max_page(&first);
    let bound = match opts.page_cap {
        Some(cap) => discovered.min(cap),
        None => discovered,
    };
    info!(
        "pagination: {} pages discovered, fetching through page {}",
        discovered, bound
    );

    let pb = ProgressBar::new(bound as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} (eta {eta})")?
            .progress_chars("=> "),
    );
    pb.inc(1);

    let mut pages_failed = 0u32;
    for page in 2..=bound {
        tokio::time::sleep(opts.delay).await;

        match fetcher.fetch(page).await {
            Ok(body) => {
                let extract = parser::parse_page(&body);
                info!(
                    "page {}/{}: {} events (running total {})",
                    page,
                    bound,
                    extract.events.len(),
                    events.len() + extract.events.len()
                );
                events.extend(extract.events);
                tags.extend(extract.tags);
            }
            Err(e) => {
                pages_failed += 1;
                warn!("page {}/{}: {:#}", page, bound, e);
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(Crawl {
        events,
        tags,
        stats: CrawlStats {
            pages_total: bound,
            pages_failed,
        },
    })
}
