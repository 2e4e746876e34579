use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, USER_AGENT};
use tracing::debug;

pub const CALENDAR_HOST: &str = "calendar.niu.edu";
pub const DEFAULT_YEAR: u16 = 2025;
pub const DEFAULT_MONTH: u8 = 11;
pub const DEFAULT_DAY: u8 = 27;

const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// The calendar listing endpoint: a fixed host and date anchor; only the
/// trailing page index varies across requests.
#[derive(Debug, Clone)]
pub struct CalendarSource {
    pub host: String,
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl Default for CalendarSource {
    fn default() -> Self {
        Self {
            host: CALENDAR_HOST.to_string(),
            year: DEFAULT_YEAR,
            month: DEFAULT_MONTH,
            day: DEFAULT_DAY,
        }
    }
}

impl CalendarSource {
    pub fn page_url(&self, page: u32) -> String {
        format!(
            "https://{}/calendar/six_months/{}/{}/{}/{}",
            self.host, self.year, self.month, self.day, page
        )
    }
}

/// One page fetch. The crawl driver only sees this seam, so tests can feed it
/// fixture HTML instead of live responses.
#[async_trait]
pub trait FetchPage: Send + Sync {
    async fn fetch(&self, page: u32) -> Result<String>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
    source: CalendarSource,
}

impl HttpFetcher {
    pub fn new(source: CalendarSource) -> Result<Self> {
        // Browser-like headers; the site serves captchas to obvious bots.
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_UA));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, source })
    }
}

#[async_trait]
impl FetchPage for HttpFetcher {
    async fn fetch(&self, page: u32) -> Result<String> {
        let url = self.source.page_url(page);
        debug!("GET {}", url);

        // Status is deliberately not checked: an error page body simply
        // yields zero events downstream.
        let body = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Request failed for page {}", page))?
            .text()
            .await
            .with_context(|| format!("Failed to read body for page {}", page))?;

        Ok(body)
    }
}
