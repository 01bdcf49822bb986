//! One-shot sentiment report
//!
//! Runs a single analysis from the command line, prints the summary table,
//! extremes, totals and conclusion, and writes one CSV per non-empty batch.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use news_sentiment_dashboard::config::DashboardConfig;
use news_sentiment_dashboard::content::ContentKind;
use news_sentiment_dashboard::engine::{
    run_analysis, AnalysisReport, AnalysisRequest, HttpProviderFactory, ProgressObserver,
    ProviderFactory,
};
use news_sentiment_dashboard::export;
use news_sentiment_dashboard::notice::Severity;
use news_sentiment_dashboard::sentiment::{SentimentAnalyzer, SentimentCategory};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sentiment_report")]
#[command(about = "Keyword sentiment report over news articles and YouTube transcripts")]
struct Cli {
    /// Search keyword or topic
    query: String,
    /// Look back this many days (1-30) when no explicit range is given
    #[arg(long, conflicts_with_all = ["from", "to"])]
    days: Option<u32>,
    /// Range start (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Range end (YYYY-MM-DD), defaults to today
    #[arg(long)]
    to: Option<NaiveDate>,
    /// Two-letter language code
    #[arg(short, long)]
    language: Option<String>,
    /// Maximum number of videos (5-50)
    #[arg(long)]
    max_results: Option<u32>,
    /// Content types, comma separated: text,video
    #[arg(long, value_delimiter = ',', value_parser = parse_kind)]
    content: Vec<ContentKind>,
    /// Where CSV files go; overrides the configured export dir
    #[arg(long)]
    export_dir: Option<PathBuf>,
    /// Config file (TOML or JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Skip writing CSV files
    #[arg(long)]
    no_export: bool,
}

fn parse_kind(s: &str) -> Result<ContentKind, String> {
    ContentKind::parse(s)
        .ok_or_else(|| format!("unknown content type '{s}' (expected text or video)"))
}

struct StderrProgress;

impl ProgressObserver for StderrProgress {
    fn on_item(&self, kind: ContentKind, done: usize, total: usize) {
        if kind == ContentKind::Video {
            eprintln!("Analyzing video {done} of {total}...");
        }
    }
}

fn print_report(report: &AnalysisReport) {
    println!(
        "Sentiment analysis for '{}' ({} to {}, language {})",
        report.query, report.from_date, report.to_date, report.language
    );
    println!();
    println!(
        "{:<15} {:>6} {:>9} {:>8} {:>9} {:>14} {:>10} {:>12}",
        "Content",
        "Items",
        "Positive",
        "Neutral",
        "Negative",
        "No transcript",
        "Polarity",
        "Subjectivity"
    );
    for r in &report.summary.rows {
        let [pos, neu, neg, none] = SentimentCategory::ALL.map(|c| r.count_of(c));
        println!(
            "{:<15} {:>6} {:>9} {:>8} {:>9} {:>14} {:>10.3} {:>12.3}",
            r.label, r.count, pos, neu, neg, none, r.mean_polarity, r.mean_subjectivity
        );
    }
    println!();

    for e in &report.summary.extremes {
        println!("{}:", e.label);
        println!(
            "  most positive ({:+.3}): {}",
            e.most_positive.polarity, e.most_positive.title
        );
        println!(
            "  most negative ({:+.3}): {}",
            e.most_negative.polarity, e.most_negative.title
        );
    }

    let t = &report.summary.totals;
    println!();
    println!("Total items: {}", t.items);
    println!("  positive: {} ({:.1}%)", t.positive.count, t.positive.percent);
    println!("  neutral:  {} ({:.1}%)", t.neutral.count, t.neutral.percent);
    println!("  negative: {} ({:.1}%)", t.negative.count, t.negative.percent);
    println!();
    println!("{}", report.summary.conclusion.describe(&report.query));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(p) => DashboardConfig::load_from_file(p)?,
        None => DashboardConfig::load_default()?,
    };
    let config = Arc::new(config);

    let mut req = AnalysisRequest::new(cli.query);
    req.days_ago = cli.days;
    req.from_date = cli.from;
    req.to_date = cli.to;
    req.language = cli.language;
    req.max_results = cli.max_results;
    req.content = cli.content;

    let today = chrono::Local::now().date_naive();
    let resolved = req.resolve(&config.defaults, today)?;
    let providers = HttpProviderFactory::new(config.clone())?.build(&req.credentials)?;

    let analyzer = SentimentAnalyzer::new();
    let report = match run_analysis(&analyzer, &resolved, &providers, &StderrProgress).await {
        Ok(r) => r,
        Err(e) => {
            for n in e.notices() {
                eprintln!("error: {}", n.message);
            }
            return Err(e.into());
        }
    };

    print_report(&report);

    if !report.notices.is_empty() {
        println!();
        for n in &report.notices {
            let tag = match n.severity {
                Severity::Info => "info",
                Severity::Warning => "warning",
                Severity::Error => "error",
            };
            println!("[{tag}] {}", n.message);
        }
    }

    if !cli.no_export {
        let dir = cli.export_dir.unwrap_or_else(|| config.export_dir.clone());
        for batch in report.batches.iter().filter(|b| !b.is_empty()) {
            let path = export::write_to_dir(batch, &dir, today)
                .with_context(|| format!("exporting {}", batch.label()))?;
            println!("Saved {}", path.display());
        }
    }

    Ok(())
}
