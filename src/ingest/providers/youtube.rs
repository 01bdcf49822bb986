// src/ingest/providers/youtube.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::content::VideoItem;
use crate::ingest::normalize_text;
use crate::ingest::providers::error_for_status;
use crate::ingest::providers::newsapi::parse_timestamp;
use crate::ingest::types::{VideoQuery, VideoSearch};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    id: ResultId,
    #[serde(default)]
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultId {
    video_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: Option<String>,
    channel_title: Option<String>,
    published_at: Option<String>,
}

/// Map a `search.list` response body into video items (transcripts empty).
pub fn parse_search(body: &str) -> Result<Vec<VideoItem>> {
    let resp: SearchResponse =
        serde_json::from_str(body).context("parsing youtube search json")?;
    let mut out = Vec::with_capacity(resp.items.len());
    for it in resp.items {
        let Some(id) = it.id.video_id.filter(|v| !v.trim().is_empty()) else {
            continue;
        };
        let s = it.snippet;
        out.push(
            VideoItem::new(
                normalize_text(s.title.as_deref().unwrap_or_default()),
                normalize_text(s.channel_title.as_deref().unwrap_or_default()),
                id,
            )
            .with_published_at(s.published_at.as_deref().and_then(parse_timestamp)),
        );
    }
    Ok(out)
}

/// YouTube Data API v3 video search.
pub struct YouTubeSearchProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl YouTubeSearchProvider {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl VideoSearch for YouTubeSearchProvider {
    async fn search_videos(&self, query: &VideoQuery) -> Result<Vec<VideoItem>> {
        let max = query.max_results.to_string();
        let resp = self
            .http
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("part", "id,snippet"),
                ("q", query.query.as_str()),
                ("maxResults", max.as_str()),
                ("type", "video"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .context("youtube search request failed")?;
        let resp = error_for_status(resp, "youtube search").await?;
        let body = resp.text().await.context("reading youtube search body")?;
        parse_search(&body)
    }

    fn name(&self) -> &'static str {
        "YouTube"
    }
}
