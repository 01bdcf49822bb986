//! # Aggregator / Reporter
//! Pure summaries over scored batches: per-batch rows, extremes, totals and
//! the overall conclusion. Recomputed from scratch on every call.
//!
//! Conclusion policy is a strict majority over the combined rest:
//! POSITIVE iff positive > neutral + negative, NEGATIVE iff
//! negative > positive + neutral, NEUTRAL/MIXED otherwise.

use serde::{Deserialize, Serialize};

use crate::content::{ContentKind, ScoredBatch, ScoredItem};
use crate::sentiment::SentimentCategory;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub label: String,
    pub kind: ContentKind,
    pub count: usize,
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    pub no_transcript: usize,
    pub mean_polarity: f64,
    pub mean_subjectivity: f64,
}

impl SummaryRow {
    pub fn count_of(&self, c: SentimentCategory) -> usize {
        match c {
            SentimentCategory::Positive => self.positive,
            SentimentCategory::Neutral => self.neutral,
            SentimentCategory::Negative => self.negative,
            SentimentCategory::NoTranscript => self.no_transcript,
        }
    }
}

/// Item reference used for "most positive" / "most negative".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtremeItem {
    /// Position in fetch order.
    pub index: usize,
    pub title: String,
    pub url: String,
    pub polarity: f64,
}

impl ExtremeItem {
    fn of(index: usize, it: &ScoredItem) -> Self {
        Self {
            index,
            title: it.item.title().to_string(),
            url: it.item.url().to_string(),
            polarity: it.polarity(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extremes {
    pub label: String,
    pub most_positive: ExtremeItem,
    pub most_negative: ExtremeItem,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub count: usize,
    /// count / total × 100, one decimal.
    pub percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub items: usize,
    pub positive: CategoryShare,
    pub neutral: CategoryShare,
    pub negative: CategoryShare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Conclusion {
    #[serde(rename = "POSITIVE")]
    Positive,
    #[serde(rename = "NEGATIVE")]
    Negative,
    #[serde(rename = "NEUTRAL/MIXED")]
    NeutralMixed,
}

impl Conclusion {
    pub fn from_counts(positive: usize, neutral: usize, negative: usize) -> Self {
        if positive > neutral + negative {
            Conclusion::Positive
        } else if negative > neutral + positive {
            Conclusion::Negative
        } else {
            Conclusion::NeutralMixed
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Conclusion::Positive => "POSITIVE",
            Conclusion::Negative => "NEGATIVE",
            Conclusion::NeutralMixed => "NEUTRAL/MIXED",
        }
    }

    pub fn describe(&self, query: &str) -> String {
        format!(
            "Topic '{query}' leans {} in news and media coverage.",
            self.label()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Non-empty batches only.
    pub rows: Vec<SummaryRow>,
    pub extremes: Vec<Extremes>,
    pub totals: Totals,
    pub conclusion: Conclusion,
}

/// count / total × 100 rounded to one decimal; 0.0 when total is 0.
pub fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}

/// Per-category counts for one batch, fixed category order.
pub fn distribution(batch: &ScoredBatch) -> Vec<(SentimentCategory, usize)> {
    SentimentCategory::ALL
        .iter()
        .map(|c| (*c, batch.items.iter().filter(|i| i.category() == *c).count()))
        .collect()
}

/// `None` for an empty batch.
pub fn summarize_batch(batch: &ScoredBatch) -> Option<SummaryRow> {
    if batch.is_empty() {
        return None;
    }
    let n = batch.len() as f64;
    let count = |c: SentimentCategory| batch.items.iter().filter(|i| i.category() == c).count();
    Some(SummaryRow {
        label: batch.label().to_string(),
        kind: batch.kind,
        count: batch.len(),
        positive: count(SentimentCategory::Positive),
        neutral: count(SentimentCategory::Neutral),
        negative: count(SentimentCategory::Negative),
        no_transcript: count(SentimentCategory::NoTranscript),
        mean_polarity: batch.items.iter().map(|i| i.sentiment.polarity).sum::<f64>() / n,
        mean_subjectivity: batch.items.iter().map(|i| i.sentiment.subjectivity).sum::<f64>() / n,
    })
}

/// Max / min polarity; ties keep the first item in fetch order.
pub fn extremes(batch: &ScoredBatch) -> Option<Extremes> {
    let first = batch.items.first()?;
    let (mut hi, mut lo) = ((0usize, first), (0usize, first));
    for (i, it) in batch.items.iter().enumerate().skip(1) {
        if it.polarity() > hi.1.polarity() {
            hi = (i, it);
        }
        if it.polarity() < lo.1.polarity() {
            lo = (i, it);
        }
    }
    Some(Extremes {
        label: batch.label().to_string(),
        most_positive: ExtremeItem::of(hi.0, hi.1),
        most_negative: ExtremeItem::of(lo.0, lo.1),
    })
}

pub fn summarize(batches: &[ScoredBatch]) -> Summary {
    let rows: Vec<SummaryRow> = batches.iter().filter_map(summarize_batch).collect();
    let extremes: Vec<Extremes> = batches.iter().filter_map(extremes).collect();

    let items: usize = rows.iter().map(|r| r.count).sum();
    let positive: usize = rows.iter().map(|r| r.positive).sum();
    let neutral: usize = rows.iter().map(|r| r.neutral).sum();
    let negative: usize = rows.iter().map(|r| r.negative).sum();
    let share = |count| CategoryShare {
        count,
        percent: percent(count, items),
    };

    Summary {
        rows,
        extremes,
        totals: Totals {
            items,
            positive: share(positive),
            neutral: share(neutral),
            negative: share(negative),
        },
        conclusion: Conclusion::from_counts(positive, neutral, negative),
    }
}
