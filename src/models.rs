use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One page matched by the search step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    pub page_id: u64,
    pub full_url: String,
}

/// One entry of the output document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    pub url: String,
    pub paragraph: String,
}

// ── Wire formats ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Keyed by page id, in the order the API returned them.
    pub pages: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
pub struct ParseResponse {
    pub parse: Option<ParsedPage>,
}

#[derive(Debug, Deserialize)]
pub struct ParsedPage {
    pub text: Option<ParsedText>,
}

#[derive(Debug, Deserialize)]
pub struct ParsedText {
    #[serde(rename = "*")]
    pub html: String,
}
