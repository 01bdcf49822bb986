//! Content items and scored tables.
//!
//! `ContentItem` is a tagged variant over news articles and videos. All
//! constructors normalize optional text: blank strings become `None`, so an
//! absent author never turns into placeholder text downstream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::sentiment::{SentimentCategory, SentimentResult};

/// Content type of a batch. One batch per kind per analysis request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Video,
}

impl ContentKind {
    /// Human batch label shown in tables and used in export file names.
    pub fn label(&self) -> &'static str {
        match self {
            ContentKind::Text => "Text News",
            ContentKind::Video => "YouTube Video",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "news" | "text news" => Some(ContentKind::Text),
            "video" | "youtube" | "youtube video" => Some(ContentKind::Video),
            _ => None,
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Trim and collapse blank strings to `None`.
pub(crate) fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub source: String,
    pub author: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub url: String,
    pub description: Option<String>,
    pub content: Option<String>,
}

impl NewsItem {
    pub fn new(
        title: impl Into<String>,
        source: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into().trim().to_string(),
            source: source.into().trim().to_string(),
            author: None,
            published_at: None,
            url: url.into().trim().to_string(),
            description: None,
            content: None,
        }
    }

    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.author = non_empty(author);
        self
    }

    pub fn with_published_at(mut self, ts: Option<DateTime<Utc>>) -> Self {
        self.published_at = ts;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = non_empty(description);
        self
    }

    pub fn with_content(mut self, content: Option<String>) -> Self {
        self.content = non_empty(content);
        self
    }

    /// Text the scorer sees: title, description and body, absent parts skipped.
    pub fn analysis_text(&self) -> String {
        [
            Some(self.title.as_str()),
            self.description.as_deref(),
            self.content.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoItem {
    pub title: String,
    pub channel: String,
    pub published_at: Option<DateTime<Utc>>,
    pub video_id: String,
    pub url: String,
    #[serde(default)]
    pub transcript: String,
    /// False when retrieval failed; drives the no-transcript sentinel.
    #[serde(default)]
    pub transcript_available: bool,
}

impl VideoItem {
    pub fn new(
        title: impl Into<String>,
        channel: impl Into<String>,
        video_id: impl Into<String>,
    ) -> Self {
        let video_id = video_id.into().trim().to_string();
        Self {
            title: title.into().trim().to_string(),
            channel: channel.into().trim().to_string(),
            published_at: None,
            url: watch_url(&video_id),
            video_id,
            transcript: String::new(),
            transcript_available: false,
        }
    }

    pub fn with_published_at(mut self, ts: Option<DateTime<Utc>>) -> Self {
        self.published_at = ts;
        self
    }

    pub fn with_transcript(mut self, text: String, available: bool) -> Self {
        self.transcript = text;
        self.transcript_available = available;
        self
    }
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentItem {
    News(NewsItem),
    Video(VideoItem),
}

impl ContentItem {
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentItem::News(_) => ContentKind::Text,
            ContentItem::Video(_) => ContentKind::Video,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ContentItem::News(n) => &n.title,
            ContentItem::Video(v) => &v.title,
        }
    }

    /// Source name for news, channel name for videos.
    pub fn source(&self) -> &str {
        match self {
            ContentItem::News(n) => &n.source,
            ContentItem::Video(v) => &v.channel,
        }
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        match self {
            ContentItem::News(n) => n.published_at,
            ContentItem::Video(v) => v.published_at,
        }
    }

    /// Unique identifier within a batch (url for news, video id for videos).
    pub fn id(&self) -> &str {
        match self {
            ContentItem::News(n) => &n.url,
            ContentItem::Video(v) => &v.video_id,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            ContentItem::News(n) => &n.url,
            ContentItem::Video(v) => &v.url,
        }
    }
}

impl From<NewsItem> for ContentItem {
    fn from(n: NewsItem) -> Self {
        ContentItem::News(n)
    }
}

impl From<VideoItem> for ContentItem {
    fn from(v: VideoItem) -> Self {
        ContentItem::Video(v)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    #[serde(flatten)]
    pub item: ContentItem,
    #[serde(flatten)]
    pub sentiment: SentimentResult,
}

impl ScoredItem {
    pub fn new(item: impl Into<ContentItem>, sentiment: SentimentResult) -> Self {
        Self {
            item: item.into(),
            sentiment,
        }
    }

    pub fn polarity(&self) -> f64 {
        self.sentiment.polarity
    }

    pub fn category(&self) -> SentimentCategory {
        self.sentiment.category
    }
}

/// One content type's scored table for a single request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredBatch {
    pub kind: ContentKind,
    pub items: Vec<ScoredItem>,
}

impl ScoredBatch {
    pub fn new(kind: ContentKind, items: Vec<ScoredItem>) -> Self {
        Self { kind, items }
    }

    pub fn label(&self) -> &'static str {
        self.kind.label()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_optionals_collapse_to_none() {
        let n = NewsItem::new(" Title ", "Kompas", "https://x/1")
            .with_author(Some("   ".into()))
            .with_description(Some(String::new()))
            .with_content(None);
        assert_eq!(n.title, "Title");
        assert!(n.author.is_none());
        assert!(n.description.is_none());
        assert!(n.content.is_none());
    }

    #[test]
    fn analysis_text_skips_absent_parts() {
        let n = NewsItem::new("Title", "S", "u").with_content(Some("Body".into()));
        assert_eq!(n.analysis_text(), "Title Body");
    }

    #[test]
    fn video_url_is_derived_from_id() {
        let v = VideoItem::new("t", "c", "abc123");
        assert_eq!(v.url, "https://www.youtube.com/watch?v=abc123");
        assert!(!v.transcript_available);
    }

    #[test]
    fn scored_item_serializes_flat_with_kind_tag() {
        let s = ScoredItem::new(
            VideoItem::new("t", "c", "id1"),
            SentimentResult::no_transcript(),
        );
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["kind"], "video");
        assert_eq!(v["video_id"], "id1");
        assert_eq!(v["sentiment"], "no-transcript");
        let back: ScoredItem = serde_json::from_value(v).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn content_kind_parse_accepts_labels() {
        assert_eq!(ContentKind::parse("Text News"), Some(ContentKind::Text));
        assert_eq!(ContentKind::parse("video"), Some(ContentKind::Video));
        assert_eq!(ContentKind::parse("audio"), None);
    }
}
