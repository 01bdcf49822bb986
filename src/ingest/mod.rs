// src/ingest/mod.rs
pub mod providers;
pub mod types;

use crate::content::{ContentKind, NewsItem, VideoItem};
use crate::ingest::types::{
    Fetched, NewsQuery, NewsSearch, Transcript, TranscriptSource, VideoQuery, VideoSearch,
};
use crate::notice::{Notice, NoticeKind};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use std::collections::HashSet;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("fetch_requests_total", "Search calls issued, by content kind.");
        describe_counter!("fetch_errors_total", "Search calls that failed, by content kind.");
        describe_counter!("fetch_items_total", "Items returned by search, by content kind.");
        describe_counter!(
            "transcript_failures_total",
            "Videos whose transcript could not be retrieved."
        );
        describe_counter!("items_scored_total", "Items scored, by content kind.");
        describe_counter!("analysis_runs_total", "Analysis requests accepted.");
        describe_histogram!("fetch_ms", "Search call duration in milliseconds.");
    });
}

/// Normalize text: decode entities, strip tags, fold quotes and whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[a-z][^>]*>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out.trim().to_string()
}

/// Drop NewsAPI's "… [+1234 chars]" truncation tail from article content.
pub fn strip_truncation_marker(s: &str) -> String {
    static RE_TAIL: OnceCell<regex::Regex> = OnceCell::new();
    let re = RE_TAIL.get_or_init(|| {
        regex::Regex::new(r"\s*(?:…|\.\.\.)?\s*\[\+\d+ chars\]\s*$").unwrap()
    });
    re.replace(s, "").trim().to_string()
}

/// Keep the first item per identifier, preserving fetch order.
pub fn dedup_by_id<T, F>(items: Vec<T>, id: F) -> (Vec<T>, usize)
where
    F: Fn(&T) -> &str,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut keep = Vec::with_capacity(items.len());
    let mut dropped = 0usize;
    for it in items {
        if !seen.insert(id(&it).to_string()) {
            dropped += 1;
            continue;
        }
        keep.push(it);
    }
    (keep, dropped)
}

fn finish_fetch<T>(
    kind: ContentKind,
    provider: &'static str,
    res: anyhow::Result<Vec<T>>,
    t0: std::time::Instant,
    id: impl Fn(&T) -> &str,
) -> Fetched<T> {
    let label = match kind {
        ContentKind::Text => "text",
        ContentKind::Video => "video",
    };
    histogram!("fetch_ms", "kind" => label).record(t0.elapsed().as_secs_f64() * 1_000.0);

    match res {
        Ok(items) => {
            let (items, dropped) = dedup_by_id(items, id);
            counter!("fetch_items_total", "kind" => label).increment(items.len() as u64);
            tracing::info!(
                target: "ingest",
                provider,
                kept = items.len(),
                duplicates = dropped,
                "search finished"
            );
            let notice = items.is_empty().then(|| Notice::empty_result(kind));
            Fetched { items, notice }
        }
        Err(e) => {
            tracing::warn!(target: "ingest", error = ?e, provider, "provider error");
            counter!("fetch_errors_total", "kind" => label).increment(1);
            let what = match kind {
                ContentKind::Text => "fetching news",
                ContentKind::Video => "searching YouTube videos",
            };
            Fetched {
                items: Vec::new(),
                notice: Some(Notice::new(
                    NoticeKind::FetchFailure,
                    Some(kind),
                    format!("Error while {what}: {e:#}"),
                )),
            }
        }
    }
}

/// Search news. Failures are caught and returned as an empty result plus a notice.
pub async fn fetch_news(provider: &dyn NewsSearch, query: &NewsQuery) -> Fetched<NewsItem> {
    ensure_metrics_described();
    counter!("fetch_requests_total", "kind" => "text").increment(1);
    let t0 = std::time::Instant::now();
    let res = provider.search_news(query).await;
    finish_fetch(ContentKind::Text, provider.name(), res, t0, |n: &NewsItem| {
        n.url.as_str()
    })
}

/// Search videos. Transcripts are not fetched here.
pub async fn fetch_videos(provider: &dyn VideoSearch, query: &VideoQuery) -> Fetched<VideoItem> {
    ensure_metrics_described();
    counter!("fetch_requests_total", "kind" => "video").increment(1);
    let t0 = std::time::Instant::now();
    let res = provider.search_videos(query).await;
    finish_fetch(ContentKind::Video, provider.name(), res, t0, |v: &VideoItem| {
        v.video_id.as_str()
    })
}

/// Join transcript segments with single spaces, in order, skipping blank ones.
pub fn join_segments<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|s| normalize_text(s.as_ref()))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Preference list: requested languages in order, then fallbacks, without duplicates.
pub fn language_preference(primary: &str, fallbacks: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(fallbacks.len() + 1);
    for l in std::iter::once(primary).chain(fallbacks.iter().map(String::as_str)) {
        let l = l.trim().to_ascii_lowercase();
        if !l.is_empty() && !out.contains(&l) {
            out.push(l);
        }
    }
    out
}

/// Fetch one transcript. Never errors: failure yields empty text and a warning notice.
pub async fn get_transcript(
    source: &dyn TranscriptSource,
    video_id: &str,
    languages: &[String],
) -> (Transcript, Option<Notice>) {
    ensure_metrics_described();
    let failure = |reason: String| {
        counter!("transcript_failures_total").increment(1);
        let notice = Notice::new(
            NoticeKind::TranscriptFailure,
            Some(ContentKind::Video),
            format!("Could not retrieve the transcript for this video: {reason}"),
        )
        .for_item(video_id);
        (Transcript::default(), Some(notice))
    };

    match source.fetch_segments(video_id, languages).await {
        Ok(segments) => {
            let text = join_segments(&segments);
            if text.is_empty() {
                return failure("transcript has no text".to_string());
            }
            (
                Transcript {
                    text,
                    available: true,
                },
                None,
            )
        }
        Err(e) => {
            tracing::warn!(
                target: "ingest",
                error = ?e,
                provider = source.name(),
                video_id,
                "transcript error"
            );
            failure(format!("{e:#}"))
        }
    }
}
