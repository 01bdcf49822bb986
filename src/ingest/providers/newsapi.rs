// src/ingest/providers/newsapi.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::content::NewsItem;
use crate::ingest::providers::error_for_status;
use crate::ingest::types::{NewsQuery, NewsSearch};
use crate::ingest::{normalize_text, strip_truncation_marker};

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Article {
    #[serde(default)]
    source: ArticleSource,
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

pub(crate) fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn clean(s: Option<String>) -> Option<String> {
    s.map(|v| normalize_text(&v))
}

/// Map an `/everything` response body into news items.
pub fn parse_everything(body: &str) -> Result<Vec<NewsItem>> {
    let resp: EverythingResponse =
        serde_json::from_str(body).context("parsing newsapi response json")?;
    if resp.status != "ok" {
        return Err(anyhow!(
            "newsapi returned status '{}': {}",
            resp.status,
            resp.message.unwrap_or_default()
        ));
    }

    let mut out = Vec::with_capacity(resp.articles.len());
    for a in resp.articles {
        let Some(url) = a.url.filter(|u| !u.trim().is_empty()) else {
            continue;
        };
        let item = NewsItem::new(
            clean(a.title).unwrap_or_default(),
            clean(a.source.name).unwrap_or_default(),
            url,
        )
        .with_author(clean(a.author))
        .with_published_at(a.published_at.as_deref().and_then(parse_timestamp))
        .with_description(clean(a.description))
        .with_content(clean(a.content).map(|c| strip_truncation_marker(&c)));
        out.push(item);
    }
    Ok(out)
}

/// NewsAPI "everything" search. The key is sent as `X-Api-Key`.
pub struct NewsApiProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl NewsApiProvider {
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
impl NewsSearch for NewsApiProvider {
    async fn search_news(&self, query: &NewsQuery) -> Result<Vec<NewsItem>> {
        let from = query.from_date.format("%Y-%m-%d").to_string();
        let to = query.to_date.format("%Y-%m-%d").to_string();
        let resp = self
            .http
            .get(format!("{}/everything", self.base_url))
            .header("X-Api-Key", &self.api_key)
            .query(&[
                ("q", query.query.as_str()),
                ("from", from.as_str()),
                ("to", to.as_str()),
                ("language", query.language.as_str()),
                ("sortBy", query.sort_by.as_str()),
            ])
            .send()
            .await
            .context("newsapi request failed")?;
        let resp = error_for_status(resp, "newsapi").await?;
        let body = resp.text().await.context("reading newsapi body")?;
        parse_everything(&body)
    }

    fn name(&self) -> &'static str {
        "NewsAPI"
    }
}
