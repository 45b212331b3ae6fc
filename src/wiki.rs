use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::extract;
use crate::models::{ExtractedRecord, PageInfo, ParseResponse, SearchResponse};

// ── Constants ────────────────────────────────────────────────────────────────

pub const DEFAULT_API_URL: &str = "https://en.wikipedia.org/w/api.php";
const USER_AGENT: &str = concat!("wiki-extractor/", env!("CARGO_PKG_VERSION"));

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum WikiError {
    #[error("No results found for keyword: {keyword}")]
    NoResults { keyword: String },
    #[error("No page text returned for page_id: {page_id}")]
    MissingPageText { page_id: u64 },
    #[error("Upstream returned HTTP {0}")]
    Upstream(reqwest::StatusCode),
    #[error("Unexpected response body: {0}")]
    Decode(String),
    #[error(transparent)]
    Request(#[from] reqwest::Error),
}

// ── Client ───────────────────────────────────────────────────────────────────

/// Session against one MediaWiki `api.php` endpoint. All requests of a run
/// go through the same connection pool.
pub struct WikiClient {
    http: reqwest::Client,
    api_url: Url,
}

impl WikiClient {
    pub fn new(api_url: Url) -> Result<Self, WikiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::ClientBuilder::new()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self { http, api_url })
    }

    /// Run a `generator=search` query and return the matched pages in the
    /// order the API listed them.
    pub async fn search(&self, keyword: &str, limit: i64) -> Result<Vec<PageInfo>, WikiError> {
        let limit = limit.to_string();
        let params = [
            ("action", "query"),
            ("format", "json"),
            ("prop", "info"),
            ("generator", "search"),
            ("inprop", "url"),
            ("gsrsearch", keyword),
            ("gsrlimit", limit.as_str()),
        ];
        let body: SearchResponse = self.get_json(&params).await?;

        let no_results = || WikiError::NoResults {
            keyword: keyword.to_string(),
        };

        let pages = body
            .query
            .and_then(|q| q.pages)
            .filter(|pages| !pages.is_empty())
            .ok_or_else(no_results)?;

        pages
            .iter()
            .map(|(id, page)| {
                let page_id = id.parse::<u64>().map_err(|_| no_results())?;
                let full_url = page
                    .get("fullurl")
                    .and_then(Value::as_str)
                    .ok_or_else(no_results)?;
                Ok(PageInfo {
                    page_id,
                    full_url: full_url.to_string(),
                })
            })
            .collect()
    }

    /// Fetch the rendered HTML of a page and return its first non-empty
    /// paragraph.
    pub async fn extract_paragraph(&self, page_id: u64) -> Result<String, WikiError> {
        info!(page_id, "fetching paragraph for page");

        let page_id_param = page_id.to_string();
        let params = [
            ("action", "parse"),
            ("format", "json"),
            ("pageid", page_id_param.as_str()),
            ("prop", "text"),
            ("utf8", "1"),
        ];
        let body: ParseResponse = self.get_json(&params).await?;

        let html = body
            .parse
            .and_then(|p| p.text)
            .map(|t| t.html)
            .ok_or(WikiError::MissingPageText { page_id })?;

        Ok(extract::first_paragraph(&html))
    }

    async fn get_json<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T, WikiError> {
        let response = self
            .http
            .get(self.api_url.clone())
            .query(params)
            .send()
            .await?;

        let status = response.status();
        debug!(url = %response.url(), %status, "api response");

        if !status.is_success() {
            return Err(WikiError::Upstream(status));
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| WikiError::Decode(e.to_string()))
    }
}

// ── Orchestration ────────────────────────────────────────────────────────────

/// Search for `keyword` and extract one record per matched page, in search
/// order. Requests are issued one at a time.
pub async fn fetch_data(
    client: &WikiClient,
    keyword: &str,
    num_urls: i64,
) -> Result<Vec<ExtractedRecord>, WikiError> {
    info!(keyword, "fetching data for keyword");

    let pages = client.search(keyword, num_urls).await?;
    let mut records = Vec::with_capacity(pages.len());

    for page in pages {
        let paragraph = client.extract_paragraph(page.page_id).await?;
        records.push(ExtractedRecord {
            url: page.full_url,
            paragraph,
        });
    }

    Ok(records)
}
