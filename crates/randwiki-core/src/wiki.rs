//! Article source client
//!
//! Lists the articles linked from a category's topic page via the MediaWiki
//! `prop=links` query, following `plcontinue` until the listing is complete.
//! Complete, non-empty listings are cached for the lifetime of the
//! [`ArticleSource`]; there is no expiry.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::categories;
use crate::config::Config;

const USER_AGENT: &str = concat!(
    "randwiki/",
    env!("CARGO_PKG_VERSION"),
    " (random article picker)"
);

/// Links per page, the API maximum for anonymous clients
const PAGE_LIMIT: &str = "500";

/// Why a listing could not be fetched
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("API error: {0}")]
    Api(String),
    #[error("Page not found: {0}")]
    MissingPage(String),
    #[error("Malformed response: {0}")]
    Decode(#[source] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    error: Option<serde_json::Value>,
    #[serde(default)]
    query: Option<Query>,
    #[serde(default, rename = "continue")]
    continuation: Option<Continuation>,
}

#[derive(Debug, Deserialize)]
struct Query {
    #[serde(default)]
    pages: HashMap<String, Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    missing: Option<serde_json::Value>,
    #[serde(default)]
    links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct Link {
    ns: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct Continuation {
    #[serde(default)]
    plcontinue: Option<String>,
}

/// MediaWiki client with a per-category listing cache
#[derive(Debug)]
pub struct ArticleSource {
    http: reqwest::Client,
    api_url: String,
    base_url: String,
    cache: HashMap<String, Vec<String>>,
}

impl ArticleSource {
    pub fn new(api_url: &str, base_url: &str) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            http,
            api_url: api_url.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: HashMap::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.wiki_api_url, &config.wiki_base_url)
    }

    /// Absolute URL for an article path such as `/wiki/Rust`
    pub fn article_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Cached listing for a category, if one was fetched
    pub fn cached(&self, key: &str) -> Option<&[String]> {
        self.cache.get(key).map(Vec::as_slice)
    }

    /// Article paths (`/wiki/<Title>`) listed for a category
    ///
    /// Unknown keys and failed fetches both yield an empty list; an empty
    /// result means "unavailable", not "no articles".
    pub async fn fetch_category_members(&mut self, key: &str) -> Vec<String> {
        if let Some(paths) = self.cache.get(key) {
            debug!(category = key, count = paths.len(), "Listing cache hit");
            return paths.clone();
        }

        let Some(page_title) = categories::page_title(key) else {
            return Vec::new();
        };

        match self.fetch_links(page_title).await {
            Ok(paths) => {
                if !paths.is_empty() {
                    self.cache.insert(key.to_string(), paths.clone());
                }
                paths
            }
            Err(e) => {
                warn!(category = key, page = page_title, error = %e, "Failed to list articles");
                Vec::new()
            }
        }
    }

    /// Fetch every article link on a page, across all continuation pages
    pub async fn fetch_links(&self, page_title: &str) -> Result<Vec<String>, SourceError> {
        let mut paths = Vec::new();
        let mut plcontinue: Option<String> = None;

        loop {
            let mut params = vec![
                ("action", "query"),
                ("prop", "links"),
                ("titles", page_title),
                ("plnamespace", "0"),
                ("pllimit", PAGE_LIMIT),
                ("format", "json"),
                ("origin", "*"),
            ];
            if let Some(ref token) = plcontinue {
                params.push(("plcontinue", token.as_str()));
            }

            let response = self.http.get(&self.api_url).query(&params).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(SourceError::HttpStatus(status.as_u16()));
            }
            let data: QueryResponse = response.json().await.map_err(SourceError::Decode)?;

            if let Some(error) = data.error {
                return Err(SourceError::Api(error.to_string()));
            }

            let page = data
                .query
                .and_then(|q| q.pages.into_values().next());
            if let Some(ref page) = page {
                if page.missing.is_some() {
                    return Err(SourceError::MissingPage(page_title.to_string()));
                }
            }

            let before = paths.len();
            paths.extend(
                page.into_iter()
                    .flat_map(|p| p.links)
                    .filter(|link| link.ns == 0 && !link.title.contains(':'))
                    .map(|link| format!("/wiki/{}", link.title.replace(' ', "_"))),
            );
            debug!(page = page_title, added = paths.len() - before, "Fetched listing page");

            plcontinue = data
                .continuation
                .and_then(|c| c.plcontinue)
                .filter(|token| !token.is_empty());
            if plcontinue.is_none() {
                break;
            }
        }

        Ok(paths)
    }
}
