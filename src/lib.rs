// src/lib.rs
// Public library surface for the server binary, the CLI and integration tests.

pub mod api;
pub mod charts;
pub mod config;
pub mod content;
pub mod engine;
pub mod error;
pub mod export;
pub mod ingest;
pub mod metrics;
pub mod notice;
pub mod report;
pub mod sentiment;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::config::DashboardConfig;
pub use crate::content::{ContentItem, ContentKind, NewsItem, ScoredBatch, ScoredItem, VideoItem};
pub use crate::engine::{run_analysis, AnalysisReport, AnalysisRequest, Credentials};
pub use crate::error::AnalysisError;
pub use crate::notice::{Notice, NoticeKind};
pub use crate::sentiment::{SentimentAnalyzer, SentimentCategory, SentimentResult};
