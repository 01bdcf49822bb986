// src/ingest/providers/transcript.rs
//! YouTube caption retrieval without the Data API: the watch page embeds the
//! list of caption tracks, each track points at a timed-text XML document.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::ingest::providers::error_for_status;
use crate::ingest::types::TranscriptSource;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    /// `"asr"` for auto-generated tracks, absent for manually created ones.
    #[serde(default)]
    pub kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

#[derive(Debug, Deserialize)]
struct TimedText {
    #[serde(rename = "text", default)]
    segments: Vec<Segment>,
}

#[derive(Debug, Deserialize)]
struct Segment {
    #[serde(rename = "$text", default)]
    body: String,
}

/// Returns the JSON array that follows `"<key>":` in `haystack`, brackets balanced.
pub fn extract_json_array<'a>(haystack: &'a str, key: &str) -> Option<&'a str> {
    let needle = format!("\"{key}\":");
    let start = haystack.find(&needle)? + needle.len();
    let rest = haystack[start..].trim_start();
    if !rest.starts_with('[') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, ch) in rest.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&rest[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Caption tracks listed on a watch page.
pub fn parse_caption_tracks(watch_html: &str) -> Result<Vec<CaptionTrack>> {
    let raw = extract_json_array(watch_html, "captionTracks")
        .ok_or_else(|| anyhow!("transcripts are disabled or unavailable for this video"))?;
    serde_json::from_str(raw).context("parsing caption track list")
}

/// For each language in order: manual track first, then auto-generated.
pub fn select_track<'a>(
    tracks: &'a [CaptionTrack],
    languages: &[String],
) -> Option<&'a CaptionTrack> {
    languages.iter().find_map(|lang| {
        let matches = |t: &&CaptionTrack| t.language_code.eq_ignore_ascii_case(lang);
        tracks
            .iter()
            .filter(matches)
            .find(|t| !t.is_generated())
            .or_else(|| tracks.iter().filter(matches).next())
    })
}

/// Segment texts of a timed-text XML document, in document order.
pub fn parse_timed_text(xml: &str) -> Result<Vec<String>> {
    let doc: TimedText = from_str(xml).context("parsing timed text xml")?;
    Ok(doc.segments.into_iter().map(|s| s.body).collect())
}

pub struct YouTubeTranscriptProvider {
    http: reqwest::Client,
    watch_base_url: String,
}

impl YouTubeTranscriptProvider {
    pub fn new(http: reqwest::Client, watch_base_url: impl Into<String>) -> Self {
        Self {
            http,
            watch_base_url: watch_base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl TranscriptSource for YouTubeTranscriptProvider {
    async fn fetch_segments(&self, video_id: &str, languages: &[String]) -> Result<Vec<String>> {
        let resp = self
            .http
            .get(format!("{}/watch", self.watch_base_url))
            .query(&[("v", video_id)])
            .header("Accept-Language", languages.join(","))
            .header("Cookie", "CONSENT=YES+1")
            .send()
            .await
            .context("watch page request failed")?;
        let html = error_for_status(resp, "watch page")
            .await?
            .text()
            .await
            .context("reading watch page")?;

        let tracks = parse_caption_tracks(&html)?;
        let track = select_track(&tracks, languages).ok_or_else(|| {
            let available: Vec<&str> = tracks.iter().map(|t| t.language_code.as_str()).collect();
            anyhow!(
                "no transcript in {:?} (available: {:?})",
                languages,
                available
            )
        })?;

        tracing::debug!(
            target: "ingest",
            video_id,
            lang = %track.language_code,
            generated = track.is_generated(),
            "caption track selected"
        );

        let resp = self
            .http
            .get(&track.base_url)
            .send()
            .await
            .context("timed text request failed")?;
        let xml = error_for_status(resp, "timed text")
            .await?
            .text()
            .await
            .context("reading timed text")?;
        parse_timed_text(&xml)
    }

    fn name(&self) -> &'static str {
        "YouTube captions"
    }
}
