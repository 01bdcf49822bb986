//! # Analysis Pipeline
//! Explicit request in, report out. Resolves the request against configured
//! defaults, applies the missing-credential policy, runs the text and video
//! pipelines concurrently and joins their batches before summarizing.
//!
//! Within the video pipeline transcripts are fetched and scored item by item;
//! a `ProgressObserver` is told after each one.

use chrono::{Duration, NaiveDate};
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{DashboardConfig, RequestDefaults};
use crate::content::{ContentKind, ScoredBatch, ScoredItem};
use crate::error::{AnalysisError, Result};
use crate::ingest::providers::{
    build_http_client, newsapi::NewsApiProvider, transcript::YouTubeTranscriptProvider,
    youtube::YouTubeSearchProvider,
};
use crate::ingest::types::{
    NewsQuery, NewsSearch, SortOrder, TranscriptSource, VideoQuery, VideoSearch,
};
use crate::ingest::{self, language_preference};
use crate::notice::Notice;
use crate::report::{summarize, Summary};
use crate::sentiment::{SentimentAnalyzer, SentimentResult};

pub const MAX_DAYS_AGO: u32 = 30;

/// Caller-supplied API keys. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub news_api_key: Option<String>,
    #[serde(default)]
    pub youtube_api_key: Option<String>,
}

impl Credentials {
    /// Request keys win over configured ones.
    pub fn or_config(&self, cfg: &DashboardConfig) -> Credentials {
        fn pick(a: &Option<String>, b: &Option<String>) -> Option<String> {
            let usable = |k: &Option<String>| {
                k.as_deref()
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(str::to_string)
            };
            usable(a).or_else(|| usable(b))
        }
        Credentials {
            news_api_key: pick(&self.news_api_key, &cfg.news_api_key),
            youtube_api_key: pick(&self.youtube_api_key, &cfg.youtube_api_key),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub query: String,
    #[serde(default)]
    pub from_date: Option<NaiveDate>,
    #[serde(default)]
    pub to_date: Option<NaiveDate>,
    /// Used when no explicit date range is given.
    #[serde(default)]
    pub days_ago: Option<u32>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub max_results: Option<u32>,
    #[serde(default)]
    pub content: Vec<ContentKind>,
    #[serde(default)]
    pub sort_by: Option<SortOrder>,
    #[serde(default)]
    pub credentials: Credentials,
}

impl AnalysisRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Validate and fill in defaults. `today` anchors `days_ago`.
    pub fn resolve(&self, defaults: &RequestDefaults, today: NaiveDate) -> Result<ResolvedRequest> {
        let query = self.query.trim().to_string();
        if query.is_empty() {
            return Err(AnalysisError::EmptyQuery);
        }

        let language = self
            .language
            .as_deref()
            .unwrap_or(&defaults.language)
            .trim()
            .to_ascii_lowercase();
        if language.len() != 2 || !language.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(AnalysisError::InvalidLanguage(language));
        }

        let days = self
            .days_ago
            .unwrap_or(defaults.days_ago)
            .clamp(1, MAX_DAYS_AGO);
        let to_date = self.to_date.unwrap_or(today);
        let from_date = match self.from_date {
            Some(d) => d,
            None => to_date
                .checked_sub_signed(Duration::days(i64::from(days)))
                .ok_or(AnalysisError::InvalidDateRange {
                    from: to_date,
                    to: to_date,
                })?,
        };
        if from_date > to_date {
            return Err(AnalysisError::InvalidDateRange {
                from: from_date,
                to: to_date,
            });
        }

        let mut content: Vec<ContentKind> = Vec::new();
        let requested = if self.content.is_empty() {
            &defaults.content
        } else {
            &self.content
        };
        for k in requested {
            if !content.contains(k) {
                content.push(*k);
            }
        }
        if content.is_empty() {
            return Err(AnalysisError::NoContentSelected);
        }

        let transcript_languages = language_preference(&language, &defaults.transcript_fallbacks);

        Ok(ResolvedRequest {
            query: query.clone(),
            news: NewsQuery {
                query: query.clone(),
                from_date,
                to_date,
                language,
                sort_by: self.sort_by.unwrap_or_default(),
            },
            videos: VideoQuery::new(query, self.max_results.unwrap_or(defaults.max_results)),
            content,
            transcript_languages,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    pub query: String,
    pub news: NewsQuery,
    pub videos: VideoQuery,
    /// Selected kinds, deduplicated, in selection order.
    pub content: Vec<ContentKind>,
    pub transcript_languages: Vec<String>,
}

/// Providers for one request. `None` means the credential for that kind is missing.
#[derive(Clone)]
pub struct Providers {
    pub news: Option<Arc<dyn NewsSearch>>,
    pub videos: Option<Arc<dyn VideoSearch>>,
    pub transcripts: Arc<dyn TranscriptSource>,
}

pub trait ProviderFactory: Send + Sync {
    fn build(&self, credentials: &Credentials) -> anyhow::Result<Providers>;
}

/// Real HTTP providers configured from `DashboardConfig`.
pub struct HttpProviderFactory {
    config: Arc<DashboardConfig>,
    http: reqwest::Client,
}

impl HttpProviderFactory {
    pub fn new(config: Arc<DashboardConfig>) -> anyhow::Result<Self> {
        let http = build_http_client(&config.http)?;
        Ok(Self { config, http })
    }
}

impl ProviderFactory for HttpProviderFactory {
    fn build(&self, credentials: &Credentials) -> anyhow::Result<Providers> {
        let creds = credentials.or_config(&self.config);
        let ep = &self.config.endpoints;
        Ok(Providers {
            news: creds.news_api_key.map(|k| {
                Arc::new(NewsApiProvider::new(self.http.clone(), &ep.news_base_url, k))
                    as Arc<dyn NewsSearch>
            }),
            videos: creds.youtube_api_key.map(|k| {
                Arc::new(YouTubeSearchProvider::new(
                    self.http.clone(),
                    &ep.youtube_base_url,
                    k,
                )) as Arc<dyn VideoSearch>
            }),
            transcripts: Arc::new(YouTubeTranscriptProvider::new(
                self.http.clone(),
                &ep.youtube_watch_base_url,
            )),
        })
    }
}

/// Told after each item of a per-item loop.
pub trait ProgressObserver: Send + Sync {
    fn on_item(&self, kind: ContentKind, done: usize, total: usize);
}

pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_item(&self, _kind: ContentKind, _done: usize, _total: usize) {}
}

/// Logs progress at debug level.
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_item(&self, kind: ContentKind, done: usize, total: usize) {
        tracing::debug!(
            target: "engine",
            kind = kind.label(),
            done,
            total,
            "analyzing item {done} of {total}"
        );
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub query: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub language: String,
    /// One batch per attempted kind, in selection order (possibly empty).
    pub batches: Vec<ScoredBatch>,
    pub summary: Summary,
    pub notices: Vec<Notice>,
}

impl AnalysisReport {
    pub fn batch(&self, kind: ContentKind) -> Option<&ScoredBatch> {
        self.batches.iter().find(|b| b.kind == kind)
    }
}

async fn run_text(
    analyzer: &SentimentAnalyzer,
    provider: &dyn NewsSearch,
    query: &NewsQuery,
    progress: &dyn ProgressObserver,
) -> (ScoredBatch, Vec<Notice>) {
    let fetched = ingest::fetch_news(provider, query).await;
    let total = fetched.items.len();
    let mut items = Vec::with_capacity(total);
    for (i, n) in fetched.items.into_iter().enumerate() {
        let sentiment = analyzer.score(&n.analysis_text());
        items.push(ScoredItem::new(n, sentiment));
        progress.on_item(ContentKind::Text, i + 1, total);
    }
    counter!("items_scored_total", "kind" => "text").increment(items.len() as u64);
    (
        ScoredBatch::new(ContentKind::Text, items),
        fetched.notice.into_iter().collect(),
    )
}

async fn run_video(
    analyzer: &SentimentAnalyzer,
    search: &dyn VideoSearch,
    transcripts: &dyn TranscriptSource,
    query: &VideoQuery,
    languages: &[String],
    progress: &dyn ProgressObserver,
) -> (ScoredBatch, Vec<Notice>) {
    let fetched = ingest::fetch_videos(search, query).await;
    let mut notices: Vec<Notice> = fetched.notice.into_iter().collect();
    let total = fetched.items.len();
    let mut items = Vec::with_capacity(total);

    for (i, v) in fetched.items.into_iter().enumerate() {
        let (transcript, notice) =
            ingest::get_transcript(transcripts, &v.video_id, languages).await;
        notices.extend(notice);
        let sentiment = if transcript.available {
            analyzer.score(&transcript.text)
        } else {
            SentimentResult::no_transcript()
        };
        let v = v.with_transcript(transcript.text, transcript.available);
        items.push(ScoredItem::new(v, sentiment));
        progress.on_item(ContentKind::Video, i + 1, total);
    }
    counter!("items_scored_total", "kind" => "video").increment(items.len() as u64);
    (ScoredBatch::new(ContentKind::Video, items), notices)
}

/// Run one analysis. Only an all-credentials-missing request fails as a whole.
pub async fn run_analysis(
    analyzer: &SentimentAnalyzer,
    request: &ResolvedRequest,
    providers: &Providers,
    progress: &dyn ProgressObserver,
) -> Result<AnalysisReport> {
    counter!("analysis_runs_total").increment(1);

    let wants = |k: ContentKind| request.content.contains(&k);
    let mut notices: Vec<Notice> = Vec::new();

    let news = if wants(ContentKind::Text) {
        if providers.news.is_none() {
            notices.push(Notice::missing_credential(ContentKind::Text));
        }
        providers.news.as_deref()
    } else {
        None
    };
    let videos = if wants(ContentKind::Video) {
        if providers.videos.is_none() {
            notices.push(Notice::missing_credential(ContentKind::Video));
        }
        providers.videos.as_deref()
    } else {
        None
    };

    if news.is_none() && videos.is_none() {
        notices.iter().for_each(Notice::emit);
        return Err(AnalysisError::MissingCredentials(notices));
    }

    tracing::info!(
        target: "engine",
        query = %request.query,
        text = news.is_some(),
        video = videos.is_some(),
        "analysis started"
    );

    // Independent branches, disjoint batches.
    let text_fut = async {
        match news {
            Some(p) => Some(run_text(analyzer, p, &request.news, progress).await),
            None => None,
        }
    };
    let video_fut = async {
        match videos {
            Some(p) => Some(
                run_video(
                    analyzer,
                    p,
                    providers.transcripts.as_ref(),
                    &request.videos,
                    &request.transcript_languages,
                    progress,
                )
                .await,
            ),
            None => None,
        }
    };
    let (text_out, video_out) = tokio::join!(text_fut, video_fut);

    let mut by_kind = [
        (ContentKind::Text, text_out),
        (ContentKind::Video, video_out),
    ];
    let mut batches = Vec::with_capacity(request.content.len());
    for kind in &request.content {
        if let Some((_, slot)) = by_kind.iter_mut().find(|(k, _)| k == kind) {
            if let Some((batch, mut n)) = slot.take() {
                batches.push(batch);
                notices.append(&mut n);
            }
        }
    }

    notices.iter().for_each(Notice::emit);
    let summary = summarize(&batches);

    tracing::info!(
        target: "engine",
        batches = batches.len(),
        items = summary.totals.items,
        conclusion = summary.conclusion.label(),
        "analysis finished"
    );

    Ok(AnalysisReport {
        query: request.query.clone(),
        from_date: request.news.from_date,
        to_date: request.news.to_date,
        language: request.news.language.clone(),
        batches,
        summary,
        notices,
    })
}
