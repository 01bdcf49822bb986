// tests/engine_pipeline.rs
//
// End-to-end analysis runs with in-memory providers.
//
// Covered:
// - text + video batches in selection order, duplicates dropped
// - search failure → empty batch + fetch_failure notice, other kind unaffected
// - transcript failure → no-transcript sentinel + per-item notice
// - missing credentials (partial and all)
// - progress observer sees every item

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDate;

use news_sentiment_dashboard::config::RequestDefaults;
use news_sentiment_dashboard::content::{ContentItem, ContentKind, NewsItem, VideoItem};
use news_sentiment_dashboard::engine::{
    run_analysis, AnalysisRequest, NoProgress, ProgressObserver, Providers, ResolvedRequest,
};
use news_sentiment_dashboard::error::AnalysisError;
use news_sentiment_dashboard::ingest::providers::newsapi::parse_everything;
use news_sentiment_dashboard::ingest::providers::youtube::parse_search;
use news_sentiment_dashboard::ingest::types::{
    NewsQuery, NewsSearch, TranscriptSource, VideoQuery, VideoSearch,
};
use news_sentiment_dashboard::notice::{NoticeKind, Severity};
use news_sentiment_dashboard::report::Conclusion;
use news_sentiment_dashboard::sentiment::{SentimentAnalyzer, SentimentCategory};

const NEWS_JSON: &str = include_str!("fixtures/newsapi_everything.json");
const SEARCH_JSON: &str = include_str!("fixtures/youtube_search.json");

struct FixtureNews;

#[async_trait]
impl NewsSearch for FixtureNews {
    async fn search_news(&self, _q: &NewsQuery) -> Result<Vec<NewsItem>> {
        parse_everything(NEWS_JSON)
    }
    fn name(&self) -> &'static str {
        "fixture news"
    }
}

struct FixtureVideos;

#[async_trait]
impl VideoSearch for FixtureVideos {
    async fn search_videos(&self, _q: &VideoQuery) -> Result<Vec<VideoItem>> {
        parse_search(SEARCH_JSON)
    }
    fn name(&self) -> &'static str {
        "fixture videos"
    }
}

struct BrokenNews;

#[async_trait]
impl NewsSearch for BrokenNews {
    async fn search_news(&self, _q: &NewsQuery) -> Result<Vec<NewsItem>> {
        Err(anyhow!("newsapi HTTP 426: upgrade required"))
    }
    fn name(&self) -> &'static str {
        "broken news"
    }
}

/// Known transcripts by video id; anything else fails. Records requested languages.
#[derive(Default)]
struct MapTranscripts {
    texts: HashMap<String, Vec<String>>,
    seen_languages: Mutex<Vec<Vec<String>>>,
}

impl MapTranscripts {
    fn with(mut self, id: &str, segments: &[&str]) -> Self {
        self.texts
            .insert(id.to_string(), segments.iter().map(|s| s.to_string()).collect());
        self
    }
}

#[async_trait]
impl TranscriptSource for MapTranscripts {
    async fn fetch_segments(&self, video_id: &str, languages: &[String]) -> Result<Vec<String>> {
        self.seen_languages.lock().unwrap().push(languages.to_vec());
        self.texts
            .get(video_id)
            .cloned()
            .ok_or_else(|| anyhow!("transcripts are disabled for {video_id}"))
    }
    fn name(&self) -> &'static str {
        "map transcripts"
    }
}

#[derive(Default)]
struct CountingProgress {
    text: AtomicUsize,
    video: AtomicUsize,
    last_total: AtomicUsize,
}

impl ProgressObserver for CountingProgress {
    fn on_item(&self, kind: ContentKind, done: usize, total: usize) {
        assert!(done >= 1 && done <= total);
        match kind {
            ContentKind::Text => self.text.fetch_add(1, Ordering::SeqCst),
            ContentKind::Video => self.video.fetch_add(1, Ordering::SeqCst),
        };
        self.last_total.store(total, Ordering::SeqCst);
    }
}

fn resolved(content: &[ContentKind]) -> ResolvedRequest {
    let mut req = AnalysisRequest::new("panen");
    req.content = content.to_vec();
    req.resolve(
        &RequestDefaults::default(),
        NaiveDate::from_ymd_opt(2025, 5, 20).unwrap(),
    )
    .expect("valid request")
}

fn providers(
    news: Option<Arc<dyn NewsSearch>>,
    videos: Option<Arc<dyn VideoSearch>>,
    transcripts: Arc<dyn TranscriptSource>,
) -> Providers {
    Providers {
        news,
        videos,
        transcripts,
    }
}

#[tokio::test]
async fn text_and_video_batches_follow_selection_order() {
    let transcripts = Arc::new(
        MapTranscripts::default()
            .with("vid001", &["The harvest is very good", "farmers are happy"])
            .with("vid002", &["The flood was a terrible disaster"]),
    );
    let p = providers(
        Some(Arc::new(FixtureNews)),
        Some(Arc::new(FixtureVideos)),
        transcripts.clone(),
    );
    let req = resolved(&[ContentKind::Video, ContentKind::Text]);

    let report = run_analysis(&SentimentAnalyzer::new(), &req, &p, &NoProgress)
        .await
        .expect("analysis ok");

    let kinds: Vec<ContentKind> = report.batches.iter().map(|b| b.kind).collect();
    assert_eq!(kinds, vec![ContentKind::Video, ContentKind::Text]);

    let news = report.batch(ContentKind::Text).unwrap();
    assert_eq!(news.len(), 2, "duplicate url must be dropped");
    assert_eq!(news.items[0].category(), SentimentCategory::Positive);
    assert_eq!(news.items[1].category(), SentimentCategory::Negative);

    let videos = report.batch(ContentKind::Video).unwrap();
    assert_eq!(videos.len(), 2);
    match &videos.items[0].item {
        ContentItem::Video(v) => {
            assert!(v.transcript_available);
            assert_eq!(v.transcript, "The harvest is very good farmers are happy");
        }
        other => panic!("expected a video, got {other:?}"),
    }
    assert_eq!(videos.items[1].category(), SentimentCategory::Negative);

    // Defaults: language "id" then fallback "en".
    let seen = transcripts.seen_languages.lock().unwrap();
    assert!(seen.iter().all(|l| l == &vec!["id".to_string(), "en".to_string()]));

    assert_eq!(report.summary.rows.len(), 2);
    assert_eq!(report.summary.rows[0].label, "YouTube Video");
    assert_eq!(report.summary.totals.items, 4);
    assert_eq!(report.summary.totals.positive.count, 2);
    assert_eq!(report.summary.totals.negative.count, 2);
    assert_eq!(report.summary.conclusion, Conclusion::NeutralMixed);
    assert!(report.notices.is_empty(), "unexpected notices: {:?}", report.notices);
}

#[tokio::test]
async fn search_failure_degrades_to_empty_batch() {
    let p = providers(
        Some(Arc::new(BrokenNews)),
        Some(Arc::new(FixtureVideos)),
        Arc::new(
            MapTranscripts::default()
                .with("vid001", &["good"])
                .with("vid002", &["good"]),
        ),
    );
    let req = resolved(&[ContentKind::Text, ContentKind::Video]);

    let report = run_analysis(&SentimentAnalyzer::new(), &req, &p, &NoProgress)
        .await
        .expect("partial failure is not fatal");

    assert!(report.batch(ContentKind::Text).unwrap().is_empty());
    assert_eq!(report.batch(ContentKind::Video).unwrap().len(), 2);

    let failure = report
        .notices
        .iter()
        .find(|n| n.kind == NoticeKind::FetchFailure)
        .expect("fetch_failure notice");
    assert_eq!(failure.content, Some(ContentKind::Text));
    assert_eq!(failure.severity, Severity::Warning);
    assert!(failure.message.contains("upgrade required"));

    // Empty batch is left out of the summary.
    assert_eq!(report.summary.rows.len(), 1);
    assert_eq!(report.summary.conclusion, Conclusion::Positive);
}

#[tokio::test]
async fn transcript_failure_marks_item_without_dropping_it() {
    let p = providers(
        None,
        Some(Arc::new(FixtureVideos)),
        Arc::new(MapTranscripts::default().with("vid001", &["really great news"])),
    );
    let req = resolved(&[ContentKind::Video]);

    let report = run_analysis(&SentimentAnalyzer::new(), &req, &p, &NoProgress)
        .await
        .unwrap();
    let videos = report.batch(ContentKind::Video).unwrap();
    assert_eq!(videos.len(), 2);

    let failed = &videos.items[1];
    assert_eq!(failed.category(), SentimentCategory::NoTranscript);
    assert_eq!(failed.sentiment.polarity, 0.0);
    assert_eq!(failed.sentiment.subjectivity, 0.0);

    let n = report
        .notices
        .iter()
        .find(|n| n.kind == NoticeKind::TranscriptFailure)
        .expect("transcript notice");
    assert_eq!(n.item_id.as_deref(), Some("vid002"));

    let row = &report.summary.rows[0];
    assert_eq!(row.no_transcript, 1);
    assert_eq!(row.positive + row.neutral + row.negative + row.no_transcript, row.count);
}

#[tokio::test]
async fn blank_transcript_counts_as_missing() {
    let p = providers(
        None,
        Some(Arc::new(FixtureVideos)),
        Arc::new(
            MapTranscripts::default()
                .with("vid001", &["  ", ""])
                .with("vid002", &["fine"]),
        ),
    );
    let report = run_analysis(
        &SentimentAnalyzer::new(),
        &resolved(&[ContentKind::Video]),
        &p,
        &NoProgress,
    )
    .await
    .unwrap();
    let videos = report.batch(ContentKind::Video).unwrap();
    assert_eq!(videos.items[0].category(), SentimentCategory::NoTranscript);
    assert_ne!(videos.items[1].category(), SentimentCategory::NoTranscript);
}

#[tokio::test]
async fn missing_key_for_one_kind_is_a_notice() {
    let p = providers(
        Some(Arc::new(FixtureNews)),
        None,
        Arc::new(MapTranscripts::default()),
    );
    let req = resolved(&[ContentKind::Text, ContentKind::Video]);

    let report = run_analysis(&SentimentAnalyzer::new(), &req, &p, &NoProgress)
        .await
        .expect("text still runs");

    assert_eq!(report.batches.len(), 1);
    assert_eq!(report.batches[0].kind, ContentKind::Text);
    let n = &report.notices[0];
    assert_eq!(n.kind, NoticeKind::MissingCredential);
    assert_eq!(n.severity, Severity::Error);
    assert_eq!(n.content, Some(ContentKind::Video));
    assert!(n.message.contains("YouTube API key"));
}

#[tokio::test]
async fn missing_keys_for_all_kinds_is_fatal() {
    let p = providers(None, None, Arc::new(MapTranscripts::default()));
    let req = resolved(&[ContentKind::Text, ContentKind::Video]);

    let err = run_analysis(&SentimentAnalyzer::new(), &req, &p, &NoProgress)
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::MissingCredentials(_)));
    assert_eq!(err.notices().len(), 2);
    assert!(err
        .notices()
        .iter()
        .all(|n| n.kind == NoticeKind::MissingCredential));
}

#[tokio::test]
async fn unselected_kind_without_key_is_not_reported() {
    let p = providers(
        Some(Arc::new(FixtureNews)),
        None,
        Arc::new(MapTranscripts::default()),
    );
    let report = run_analysis(
        &SentimentAnalyzer::new(),
        &resolved(&[ContentKind::Text]),
        &p,
        &NoProgress,
    )
    .await
    .unwrap();
    assert!(report.notices.is_empty());
}

#[tokio::test]
async fn progress_observer_sees_every_item() {
    let p = providers(
        Some(Arc::new(FixtureNews)),
        Some(Arc::new(FixtureVideos)),
        Arc::new(MapTranscripts::default().with("vid001", &["good"])),
    );
    let progress = CountingProgress::default();
    let report = run_analysis(
        &SentimentAnalyzer::new(),
        &resolved(&[ContentKind::Text, ContentKind::Video]),
        &p,
        &progress,
    )
    .await
    .unwrap();

    assert_eq!(progress.text.load(Ordering::SeqCst), 2);
    assert_eq!(progress.video.load(Ordering::SeqCst), 2);
    assert_eq!(report.summary.totals.items, 4);
}
