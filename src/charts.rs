//! Chart datasets for the dashboard renderer: distribution pie, per-source
//! bars, daily trend lines and the cross-batch comparison. Data only.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::content::ScoredBatch;
use crate::report::{distribution, Summary};
use crate::sentiment::SentimentCategory;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slice {
    pub category: SentimentCategory,
    pub count: usize,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceBar {
    pub source: String,
    pub category: SentimentCategory,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub category: SentimentCategory,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchCharts {
    pub label: String,
    pub distribution: Vec<Slice>,
    pub by_source: Vec<SourceBar>,
    pub trend: Vec<TrendPoint>,
    /// Items left out of `trend` for lack of a timestamp.
    pub undated: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonGroup {
    pub label: String,
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSet {
    pub batches: Vec<BatchCharts>,
    pub comparison: Vec<ComparisonGroup>,
    pub colors: BTreeMap<SentimentCategory, String>,
}

pub fn batch_charts(batch: &ScoredBatch) -> BatchCharts {
    let distribution = distribution(batch)
        .into_iter()
        .filter(|(_, n)| *n > 0)
        .map(|(category, count)| Slice {
            category,
            count,
            color: category.color().to_string(),
        })
        .collect();

    // Sources in first appearance order.
    let mut sources: Vec<&str> = Vec::new();
    let mut per_source: BTreeMap<(usize, SentimentCategory), usize> = BTreeMap::new();
    for it in &batch.items {
        let src = it.item.source();
        let pos = match sources.iter().position(|s| *s == src) {
            Some(p) => p,
            None => {
                sources.push(src);
                sources.len() - 1
            }
        };
        *per_source.entry((pos, it.category())).or_default() += 1;
    }
    let by_source = per_source
        .into_iter()
        .map(|((pos, category), count)| SourceBar {
            source: sources[pos].to_string(),
            category,
            count,
        })
        .collect();

    let mut per_day: BTreeMap<(NaiveDate, SentimentCategory), usize> = BTreeMap::new();
    let mut undated = 0usize;
    for it in &batch.items {
        match it.item.published_at() {
            Some(ts) => *per_day.entry((ts.date_naive(), it.category())).or_default() += 1,
            None => undated += 1,
        }
    }
    let trend = per_day
        .into_iter()
        .map(|((date, category), count)| TrendPoint {
            date,
            category,
            count,
        })
        .collect();

    BatchCharts {
        label: batch.label().to_string(),
        distribution,
        by_source,
        trend,
        undated,
    }
}

pub fn build(batches: &[ScoredBatch], summary: &Summary) -> ChartSet {
    ChartSet {
        batches: batches
            .iter()
            .filter(|b| !b.is_empty())
            .map(batch_charts)
            .collect(),
        comparison: summary
            .rows
            .iter()
            .map(|r| ComparisonGroup {
                label: r.label.clone(),
                positive: r.positive,
                neutral: r.neutral,
                negative: r.negative,
            })
            .collect(),
        colors: SentimentCategory::ALL
            .iter()
            .map(|c| (*c, c.color().to_string()))
            .collect(),
    }
}
