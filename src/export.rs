//! CSV export of one scored batch. Reloading a written file yields the same rows.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::content::{ContentItem, ContentKind, NewsItem, ScoredBatch, ScoredItem, VideoItem};
use crate::sentiment::{SentimentCategory, SentimentResult};

#[derive(Debug, Serialize, Deserialize)]
struct NewsRow {
    title: String,
    source: String,
    author: Option<String>,
    published_at: Option<DateTime<Utc>>,
    url: String,
    description: Option<String>,
    content: Option<String>,
    polarity: f64,
    subjectivity: f64,
    sentiment: SentimentCategory,
}

#[derive(Debug, Serialize, Deserialize)]
struct VideoRow {
    title: String,
    channel: String,
    published_at: Option<DateTime<Utc>>,
    video_id: String,
    url: String,
    transcript: String,
    polarity: f64,
    subjectivity: f64,
    sentiment: SentimentCategory,
}

fn news_row(n: &NewsItem, s: &SentimentResult) -> NewsRow {
    NewsRow {
        title: n.title.clone(),
        source: n.source.clone(),
        author: n.author.clone(),
        published_at: n.published_at,
        url: n.url.clone(),
        description: n.description.clone(),
        content: n.content.clone(),
        polarity: s.polarity,
        subjectivity: s.subjectivity,
        sentiment: s.category,
    }
}

fn video_row(v: &VideoItem, s: &SentimentResult) -> VideoRow {
    VideoRow {
        title: v.title.clone(),
        channel: v.channel.clone(),
        published_at: v.published_at,
        video_id: v.video_id.clone(),
        url: v.url.clone(),
        transcript: v.transcript.clone(),
        polarity: s.polarity,
        subjectivity: s.subjectivity,
        sentiment: s.category,
    }
}

/// `sentiment_analysis_text_news_20250520.csv`
pub fn export_file_name(kind: ContentKind, date: NaiveDate) -> String {
    let label = kind.label().to_ascii_lowercase().replace(' ', "_");
    format!("sentiment_analysis_{label}_{}.csv", date.format("%Y%m%d"))
}

/// Write a batch as CSV with a header row. Items of a different kind are an error.
pub fn write_batch<W: Write>(batch: &ScoredBatch, writer: W) -> Result<()> {
    let mut w = csv::Writer::from_writer(writer);
    if batch.is_empty() {
        // Header only, so an empty export still names its columns.
        match batch.kind {
            ContentKind::Text => w.write_record([
                "title", "source", "author", "published_at", "url", "description", "content",
                "polarity", "subjectivity", "sentiment",
            ])?,
            ContentKind::Video => w.write_record([
                "title", "channel", "published_at", "video_id", "url", "transcript", "polarity",
                "subjectivity", "sentiment",
            ])?,
        }
    }
    for (i, it) in batch.items.iter().enumerate() {
        let res = match (&it.item, batch.kind) {
            (ContentItem::News(n), ContentKind::Text) => w.serialize(news_row(n, &it.sentiment)),
            (ContentItem::Video(v), ContentKind::Video) => w.serialize(video_row(v, &it.sentiment)),
            (other, kind) => anyhow::bail!(
                "row {i}: {} item in a {} batch",
                other.kind().label(),
                kind.label()
            ),
        };
        res.with_context(|| format!("writing csv row {i}"))?;
    }
    w.flush().context("flushing csv")?;
    Ok(())
}

pub fn read_batch<R: Read>(kind: ContentKind, reader: R) -> Result<ScoredBatch> {
    let mut r = csv::Reader::from_reader(reader);
    let mut items = Vec::new();
    match kind {
        ContentKind::Text => {
            for (i, row) in r.deserialize::<NewsRow>().enumerate() {
                let row = row.with_context(|| format!("reading csv row {i}"))?;
                let news = NewsItem {
                    title: row.title,
                    source: row.source,
                    author: row.author,
                    published_at: row.published_at,
                    url: row.url,
                    description: row.description,
                    content: row.content,
                };
                let scored = sentiment(row.polarity, row.subjectivity, row.sentiment);
                items.push(ScoredItem::new(news, scored));
            }
        }
        ContentKind::Video => {
            for (i, row) in r.deserialize::<VideoRow>().enumerate() {
                let row = row.with_context(|| format!("reading csv row {i}"))?;
                let available = row.sentiment != SentimentCategory::NoTranscript;
                let video = VideoItem {
                    title: row.title,
                    channel: row.channel,
                    published_at: row.published_at,
                    video_id: row.video_id,
                    url: row.url,
                    transcript: row.transcript,
                    transcript_available: available,
                };
                let scored = sentiment(row.polarity, row.subjectivity, row.sentiment);
                items.push(ScoredItem::new(video, scored));
            }
        }
    }
    Ok(ScoredBatch::new(kind, items))
}

fn sentiment(polarity: f64, subjectivity: f64, category: SentimentCategory) -> SentimentResult {
    SentimentResult {
        polarity,
        subjectivity,
        category,
    }
}

pub fn to_csv_string(batch: &ScoredBatch) -> Result<String> {
    let mut buf = Vec::new();
    write_batch(batch, &mut buf)?;
    String::from_utf8(buf).context("csv output is not utf-8")
}

/// Writes into `dir` (created if missing) and returns the file path.
pub fn write_to_dir(batch: &ScoredBatch, dir: &Path, date: NaiveDate) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(export_file_name(batch.kind, date));
    let file =
        std::fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    write_batch(batch, file)?;
    tracing::info!(target: "export", path = %path.display(), rows = batch.len(), "csv written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_uses_snake_label_and_date() {
        let d = NaiveDate::from_ymd_opt(2025, 5, 20).unwrap();
        assert_eq!(
            export_file_name(ContentKind::Text, d),
            "sentiment_analysis_text_news_20250520.csv"
        );
        assert_eq!(
            export_file_name(ContentKind::Video, d),
            "sentiment_analysis_youtube_video_20250520.csv"
        );
    }

    #[test]
    fn absent_fields_are_empty_cells() {
        let batch = ScoredBatch::new(
            ContentKind::Text,
            vec![ScoredItem::new(
                NewsItem::new("Good, news", "Kompas", "https://k/1"),
                SentimentResult::from_scores(0.5, 0.25),
            )],
        );
        let out = to_csv_string(&batch).unwrap();
        let mut lines = out.lines();
        assert_eq!(
            lines.next(),
            Some("title,source,author,published_at,url,description,content,polarity,subjectivity,sentiment")
        );
        assert_eq!(lines.next(), Some("\"Good, news\",Kompas,,,https://k/1,,,0.5,0.25,positive"));
    }

    #[test]
    fn empty_batch_still_has_header() {
        let out = to_csv_string(&ScoredBatch::new(ContentKind::Video, vec![])).unwrap();
        assert_eq!(
            out.trim_end(),
            "title,channel,published_at,video_id,url,transcript,polarity,subjectivity,sentiment"
        );
    }

    #[test]
    fn mixed_kinds_are_rejected() {
        let batch = ScoredBatch::new(
            ContentKind::Text,
            vec![ScoredItem::new(VideoItem::new("v", "c", "id"), SentimentResult::neutral())],
        );
        assert!(to_csv_string(&batch).is_err());
    }
}
