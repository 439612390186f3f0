use serde::{Deserialize, Serialize};

use super::{Location, TimeRange, Topic};

/// Article as returned by the news service. Missing fields fall back to
/// empty strings; display code supplies its own placeholders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub source: String,
    #[serde(default, alias = "publishedAt")]
    pub published_at: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    pub location: Option<Location>,
    pub topics: Vec<Topic>,
    #[serde(rename = "timeRange")]
    pub time_range: Option<TimeRange>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenerationResponse {
    pub articles: Vec<Article>,
    pub total_count: i64,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationStatus {
    #[default]
    Idle,
    InFlight,
    Ready,
    Failed,
}
