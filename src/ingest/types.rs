// src/ingest/types.rs
use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::content::{NewsItem, VideoItem};
use crate::notice::Notice;

pub const MIN_VIDEO_RESULTS: u32 = 5;
pub const MAX_VIDEO_RESULTS: u32 = 50;

/// NewsAPI `sortBy` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    #[default]
    PublishedAt,
    Relevancy,
    Popularity,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::PublishedAt => "publishedAt",
            SortOrder::Relevancy => "relevancy",
            SortOrder::Popularity => "popularity",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsQuery {
    pub query: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub language: String,
    #[serde(default)]
    pub sort_by: SortOrder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoQuery {
    pub query: String,
    pub max_results: u32,
}

impl VideoQuery {
    pub fn new(query: impl Into<String>, max_results: u32) -> Self {
        Self {
            query: query.into(),
            max_results: max_results.clamp(MIN_VIDEO_RESULTS, MAX_VIDEO_RESULTS),
        }
    }
}

/// Outcome of a fetch: items plus an optional notice (failure or empty result).
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub items: Vec<T>,
    pub notice: Option<Notice>,
}

/// Result of one transcript lookup. `available == false` means retrieval failed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transcript {
    pub text: String,
    pub available: bool,
}

#[async_trait::async_trait]
pub trait NewsSearch: Send + Sync {
    async fn search_news(&self, query: &NewsQuery) -> Result<Vec<NewsItem>>;
    fn name(&self) -> &'static str;
}

#[async_trait::async_trait]
pub trait VideoSearch: Send + Sync {
    async fn search_videos(&self, query: &VideoQuery) -> Result<Vec<VideoItem>>;
    fn name(&self) -> &'static str;
}

#[async_trait::async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Transcript segments in original order, for the first matching language.
    async fn fetch_segments(&self, video_id: &str, languages: &[String]) -> Result<Vec<String>>;
    fn name(&self) -> &'static str;
}
