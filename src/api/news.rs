//! Financial news proxy.
//!
//! Forwards a search to the configured provider, normalises the two common
//! response shapes (`articles[]` and `data[]`) and keeps the last result in a
//! single-slot cache for a fixed time-to-live.

use std::future::Future;
use std::time::Duration;

use axum::http::StatusCode;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub const DEFAULT_NEWS_API_URL: &str = "https://api.marketaux.com/v1/news/all";
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);
/// Upper bound on one upstream call; the cache lock is held for its duration.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_QUERY: &str = "finance";
pub const DEFAULT_LIMIT: usize = 5;
pub const MAX_LIMIT: usize = 100;
const DEFAULT_COUNTRIES: &str = "in";

#[derive(Debug, Error)]
pub enum NewsError {
    #[error("Missing NEWS_API_KEY server env variable")]
    MissingCredentials,

    #[error("invalid NEWS_API_URL: {0}")]
    InvalidEndpoint(String),

    #[error("{0}")]
    InvalidQuery(String),

    #[error("failed to build news client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("News provider returned {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("news request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("news provider sent malformed JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

impl NewsError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            NewsError::MissingCredentials
            | NewsError::InvalidEndpoint(_)
            | NewsError::ClientBuild(_) => StatusCode::INTERNAL_SERVER_ERROR,
            NewsError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            NewsError::Provider { .. } | NewsError::Network(_) | NewsError::Decode(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct NewsConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub country: Option<String>,
    pub filter_entities: String,
    pub language: String,
    pub cache_ttl: Duration,
    pub timeout: Duration,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_NEWS_API_URL.to_string(),
            api_key: None,
            country: None,
            filter_entities: "true".to_string(),
            language: "en".to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewsParams {
    pub q: Option<String>,
    pub limit: Option<String>,
    pub countries: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewsQuery {
    pub q: String,
    pub limit: usize,
    pub countries: Option<String>,
}

impl TryFrom<NewsParams> for NewsQuery {
    type Error = NewsError;

    fn try_from(params: NewsParams) -> Result<Self, Self::Error> {
        let limit = match params.limit.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_LIMIT,
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if (1..=MAX_LIMIT).contains(&n) => n,
                _ => {
                    return Err(NewsError::InvalidQuery(format!(
                        "limit must be an integer between 1 and {MAX_LIMIT}"
                    )));
                }
            },
        };
        let q = params
            .q
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .unwrap_or_else(|| DEFAULT_QUERY.to_string());
        let countries = params
            .countries
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        Ok(NewsQuery {
            q,
            limit,
            countries,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub title: String,
    pub source: String,
    pub summary: String,
    pub category: String,
    pub url: Option<String>,
    pub image: Option<String>,
    pub published_at: Option<String>,
}

pub fn build_request_url(config: &NewsConfig, query: &NewsQuery) -> Result<Url, NewsError> {
    let api_key = config
        .api_key
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or(NewsError::MissingCredentials)?;
    let mut url =
        Url::parse(&config.api_url).map_err(|e| NewsError::InvalidEndpoint(e.to_string()))?;
    let host = url.host_str().unwrap_or_default().to_string();
    let limit = query.limit.to_string();

    let params: Vec<(&str, &str)> = if host.contains("newsapi.org") {
        let mut params = vec![
            ("apiKey", api_key),
            ("q", query.q.as_str()),
            ("category", "business"),
            ("language", "en"),
            ("pageSize", limit.as_str()),
        ];
        if let Some(country) = config.country.as_deref() {
            params.push(("country", country));
        }
        params
    } else if host.contains("marketaux.com") {
        let countries = query
            .countries
            .as_deref()
            .or(config.country.as_deref())
            .unwrap_or(DEFAULT_COUNTRIES);
        vec![
            ("api_token", api_key),
            ("q", query.q.as_str()),
            ("countries", countries),
            ("filter_entities", config.filter_entities.as_str()),
            ("language", config.language.as_str()),
            ("limit", limit.as_str()),
        ]
    } else {
        vec![("apiKey", api_key), ("q", query.q.as_str())]
    };

    set_query_params(&mut url, &params);
    Ok(url)
}

fn set_query_params(url: &mut Url, params: &[(&str, &str)]) {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !params.iter().any(|(p, _)| p == key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let mut pairs = url.query_pairs_mut();
    pairs.clear();
    pairs.extend_pairs(kept);
    pairs.extend_pairs(params);
}

fn first_str(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| item.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn source_name(item: &Value) -> String {
    match item.get("source") {
        Some(Value::String(name)) => name.clone(),
        Some(source) => first_str(source, &["name"]).unwrap_or_default(),
        None => String::new(),
    }
}

pub fn normalize_response(body: &Value, limit: usize) -> Vec<NewsItem> {
    if let Some(articles) = body.get("articles").and_then(Value::as_array) {
        return articles
            .iter()
            .take(limit)
            .map(|a| NewsItem {
                title: first_str(a, &["title"]).unwrap_or_default(),
                source: source_name(a),
                summary: first_str(a, &["description", "content"]).unwrap_or_default(),
                category: first_str(a, &["category"]).unwrap_or_else(|| "Finance".to_string()),
                url: first_str(a, &["url"]),
                image: first_str(a, &["urlToImage"]),
                published_at: first_str(a, &["publishedAt"]),
            })
            .collect();
    }

    if let Some(data) = body.get("data").and_then(Value::as_array) {
        return data
            .iter()
            .take(limit)
            .map(|a| NewsItem {
                title: first_str(a, &["title", "headline"]).unwrap_or_default(),
                source: source_name(a),
                summary: first_str(a, &["summary", "description"]).unwrap_or_default(),
                category: first_str(a, &["category"]).unwrap_or_else(|| "Finance".to_string()),
                url: first_str(a, &["url", "link"]),
                image: first_str(a, &["image", "image_url"]),
                published_at: first_str(a, &["publishedAt", "published_at", "pubDate"]),
            })
            .collect();
    }

    Vec::new()
}

#[derive(Clone, Debug)]
pub struct NewsClient {
    http: reqwest::Client,
    config: NewsConfig,
}

impl NewsClient {
    pub fn new(config: NewsConfig) -> Result<Self, NewsError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(NewsError::ClientBuild)?;
        Ok(Self { http, config })
    }

    pub async fn fetch(&self, query: &NewsQuery) -> Result<Vec<NewsItem>, NewsError> {
        let url = build_request_url(&self.config, query)?;
        tracing::debug!(host = url.host_str().unwrap_or_default(), q = %query.q, "fetching news");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NewsError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text)?;
        Ok(normalize_response(&body, query.limit))
    }
}

#[derive(Debug)]
struct CachedNews {
    key: NewsQuery,
    items: Vec<NewsItem>,
    fetched_at: Instant,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewsLookup {
    pub items: Vec<NewsItem>,
    pub from_cache: bool,
}

/// One cached result, replaced on key change or expiry.
///
/// The lock is held across the upstream call, so concurrent misses wait for
/// the in-flight fetch instead of issuing their own. Failures are not cached.
#[derive(Debug)]
pub struct NewsCache {
    ttl: Duration,
    slot: Mutex<Option<CachedNews>>,
}

impl NewsCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: &NewsQuery,
        fetch: F,
    ) -> Result<NewsLookup, NewsError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<NewsItem>, NewsError>>,
    {
        let mut slot = self.slot.lock().await;
        if let Some(cached) = slot.as_ref() {
            if cached.key == *key && cached.fetched_at.elapsed() < self.ttl {
                return Ok(NewsLookup {
                    items: cached.items.clone(),
                    from_cache: true,
                });
            }
        }

        let items = fetch().await?;
        tracing::info!(q = %key.q, count = items.len(), "news cache refreshed");
        *slot = Some(CachedNews {
            key: key.clone(),
            items: items.clone(),
            fetched_at: Instant::now(),
        });
        Ok(NewsLookup {
            items,
            from_cache: false,
        })
    }
}

#[derive(Debug)]
pub struct NewsService {
    client: NewsClient,
    cache: NewsCache,
}

impl NewsService {
    pub fn new(config: NewsConfig) -> Result<Self, NewsError> {
        let cache = NewsCache::new(config.cache_ttl);
        Ok(Self {
            client: NewsClient::new(config)?,
            cache,
        })
    }

    pub async fn lookup(&self, query: &NewsQuery) -> Result<NewsLookup, NewsError> {
        self.cache
            .get_or_fetch(query, || self.client.fetch(query))
            .await
    }
}
