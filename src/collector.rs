// src/collector.rs
//! News collection: Google News RSS search -> flat article records -> the
//! shared intermediate store.

use std::path::PathBuf;
use std::time::Duration;

use chrono::DateTime;
use quick_xml::de::from_str;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::CollectError;
use crate::store::{self, article_key, NewsCollection, NewsRecord};

const SEARCH_BASE_URL: &str = "https://news.google.com/rss/search";

/// Outcome of one collection run. Zero results is a distinct non-error
/// outcome: the store is left untouched and the caller gets a "failed"
/// status with count 0.
#[derive(Debug)]
pub enum CollectionOutcome {
    Collected { count: usize, articles: NewsCollection },
    NotFound,
}

// ------------------------------------------------------------
// RSS feed model (Google News uses plain RSS 2.0)
// ------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    source: Option<ItemSource>,
}

/// `<source url="...">Publisher</source>` — we only need the text content.
#[derive(Debug, Deserialize)]
struct ItemSource {
    #[serde(rename = "$text")]
    name: Option<String>,
}

pub struct NewsCollector {
    http: reqwest::Client,
    lang: String,
    region: String,
    ceid: String,
    store_path: PathBuf,
}

impl NewsCollector {
    pub fn new(cfg: &AppConfig) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("index-sentiment-predictor/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self {
            http,
            lang: cfg.lang.clone(),
            region: cfg.region.clone(),
            ceid: cfg.ceid(),
            store_path: cfg.store_path.clone(),
        }
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}?q={}&hl={}&gl={}&ceid={}",
            SEARCH_BASE_URL,
            urlencoding::encode(query),
            self.lang,
            self.region,
            self.ceid
        )
    }

    /// Fetch news for `query` and persist the collection. Single blocking
    /// call, no retry; backend failures map to `BackendUnavailable`.
    pub async fn collect(&self, query: &str) -> Result<CollectionOutcome, CollectError> {
        let url = self.search_url(query);
        info!(query, "searching Google News");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| CollectError::BackendUnavailable(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(CollectError::BackendUnavailable(format!(
                "search returned HTTP {}",
                resp.status()
            )));
        }
        let body = resp
            .text()
            .await
            .map_err(|e| CollectError::BackendUnavailable(e.to_string()))?;

        self.collect_from_feed(&body)
    }

    /// Parse an already-fetched feed and apply the write-then-signal
    /// contract. Split out so fixtures can drive the full store behavior.
    pub fn collect_from_feed(&self, feed_xml: &str) -> Result<CollectionOutcome, CollectError> {
        let records = parse_feed(feed_xml)?;
        if records.is_empty() {
            // Deliberate: previous store content stays readable by a later
            // predict() call. Surface that so operators can tell.
            warn!("no articles found; intermediate store left untouched");
            return Ok(CollectionOutcome::NotFound);
        }

        let articles = build_collection(records);
        store::save(&self.store_path, &articles)
            .map_err(|e| CollectError::StoreWrite(e.to_string()))?;

        let count = articles.len();
        info!(count, store = %self.store_path.display(), "news collection written");
        Ok(CollectionOutcome::Collected { count, articles })
    }
}

/// Extract records from the feed in document order. Field extraction is
/// best-effort per article; a missing field never fails the operation.
fn parse_feed(feed_xml: &str) -> Result<Vec<NewsRecord>, CollectError> {
    let rss: Rss = from_str(feed_xml).map_err(|e| CollectError::MalformedFeed(e.to_string()))?;

    let mut out = Vec::with_capacity(rss.channel.items.len());
    for item in rss.channel.items {
        let source = item
            .source
            .and_then(|s| s.name)
            .or_else(|| item.title.as_deref().and_then(source_from_title));
        out.push(NewsRecord {
            title: item.title,
            source,
            date: item.pub_date.as_deref().map(normalize_date),
            url: item.link,
            summary: item.description.as_deref().map(strip_html).filter(|s| !s.is_empty()),
        });
    }
    Ok(out)
}

fn build_collection(records: Vec<NewsRecord>) -> NewsCollection {
    let mut collection = NewsCollection::with_capacity(records.len());
    for (i, record) in records.into_iter().enumerate() {
        collection.insert(article_key(i + 1), record);
    }
    collection
}

/// Google News suffixes the publisher onto the headline: "Title - Source".
fn source_from_title(title: &str) -> Option<String> {
    title.rfind(" - ").map(|pos| title[pos + 3..].trim().to_string())
}

/// Descriptions arrive as HTML snippets. Decode entities, drop tags,
/// collapse whitespace.
fn strip_html(s: &str) -> String {
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();

    let decoded = html_escape::decode_html_entities(s).to_string();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    let no_tags = re_tags.replace_all(&decoded, " ");
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    re_ws.replace_all(&no_tags, " ").trim().to_string()
}

/// RFC 2822 pubDate -> RFC 3339 when parseable; otherwise keep the raw text.
fn normalize_date(s: &str) -> String {
    DateTime::parse_from_rfc2822(s)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|_| s.trim().to_string())
}
