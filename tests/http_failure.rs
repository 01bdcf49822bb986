// tests/http_failure.rs
//
// Real HTTP providers against an unreachable endpoint: failures must surface
// as notices, never as a failed analysis.

use std::sync::Arc;

use chrono::NaiveDate;
use news_sentiment_dashboard::config::{DashboardConfig, Endpoints, HttpSettings, RequestDefaults};
use news_sentiment_dashboard::content::ContentKind;
use news_sentiment_dashboard::engine::{
    run_analysis, AnalysisRequest, Credentials, HttpProviderFactory, NoProgress, ProviderFactory,
};
use news_sentiment_dashboard::ingest::providers::build_http_client;
use news_sentiment_dashboard::ingest::providers::transcript::YouTubeTranscriptProvider;
use news_sentiment_dashboard::ingest::get_transcript;
use news_sentiment_dashboard::notice::NoticeKind;
use news_sentiment_dashboard::sentiment::SentimentAnalyzer;

// Port 9 (discard) is closed on CI hosts; connections are refused quickly.
const DEAD: &str = "http://127.0.0.1:9";

fn dead_config() -> DashboardConfig {
    DashboardConfig {
        http: HttpSettings {
            timeout_secs: 2,
            connect_timeout_secs: 1,
            ..HttpSettings::default()
        },
        endpoints: Endpoints {
            news_base_url: DEAD.into(),
            youtube_base_url: DEAD.into(),
            youtube_watch_base_url: DEAD.into(),
        },
        ..DashboardConfig::default()
    }
}

#[tokio::test]
async fn unreachable_apis_yield_empty_batches_and_notices() {
    let factory = HttpProviderFactory::new(Arc::new(dead_config())).unwrap();
    let providers = factory
        .build(&Credentials {
            news_api_key: Some("k".into()),
            youtube_api_key: Some("y".into()),
        })
        .unwrap();

    let mut req = AnalysisRequest::new("ekonomi");
    req.content = vec![ContentKind::Text, ContentKind::Video];
    let resolved = req
        .resolve(
            &RequestDefaults::default(),
            NaiveDate::from_ymd_opt(2025, 5, 20).unwrap(),
        )
        .unwrap();

    let report = run_analysis(&SentimentAnalyzer::new(), &resolved, &providers, &NoProgress)
        .await
        .expect("network errors are not fatal");

    assert_eq!(report.batches.len(), 2);
    assert!(report.batches.iter().all(|b| b.is_empty()));
    let failures: Vec<_> = report
        .notices
        .iter()
        .filter(|n| n.kind == NoticeKind::FetchFailure)
        .collect();
    assert_eq!(failures.len(), 2);
    assert!(failures.iter().any(|n| n.message.starts_with("Error while fetching news")));
    assert!(report.summary.rows.is_empty());
}

#[tokio::test]
async fn unreachable_watch_page_is_a_transcript_notice() {
    let http = build_http_client(&dead_config().http).unwrap();
    let source = YouTubeTranscriptProvider::new(http, DEAD);

    let (t, notice) = get_transcript(&source, "vid001", &["id".to_string()]).await;
    assert!(!t.available);
    assert!(t.text.is_empty());
    let n = notice.expect("notice");
    assert_eq!(n.kind, NoticeKind::TranscriptFailure);
    assert_eq!(n.item_id.as_deref(), Some("vid001"));
}
