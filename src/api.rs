use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shuttle_axum::axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::charts::{self, ChartSet};
use crate::config::DashboardConfig;
use crate::content::ScoredBatch;
use crate::engine::{self, AnalysisReport, AnalysisRequest, LogProgress, ProviderFactory};
use crate::error::AnalysisError;
use crate::export;
use crate::notice::Notice;
use crate::sentiment::{SentimentAnalyzer, SentimentResult};

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<SentimentAnalyzer>,
    pub config: Arc<DashboardConfig>,
    pub providers: Arc<dyn ProviderFactory>,
}

impl AppState {
    pub fn new(config: Arc<DashboardConfig>, providers: Arc<dyn ProviderFactory>) -> Self {
        Self {
            analyzer: Arc::new(SentimentAnalyzer::new()),
            config,
            providers,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/score", post(score))
        .route("/analyze", post(analyze))
        .route("/export", post(export_csv))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug)]
pub enum ApiError {
    /// Rejected request: 400 with the error text and any notices.
    Analysis(AnalysisError),
    /// Malformed payload: 400 with the error text and no notices.
    BadRequest(String),
    Internal(anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    notices: &'a [Notice],
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Analysis(e) => {
                let body = ErrorBody {
                    error: e.to_string(),
                    notices: e.notices(),
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            ApiError::BadRequest(error) => {
                let body = ErrorBody {
                    error,
                    notices: &[],
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            ApiError::Internal(e) => {
                tracing::error!(target: "api", error = %format!("{e:#}"), "request failed");
                let body = ErrorBody {
                    error: "internal error".to_string(),
                    notices: &[],
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

impl From<AnalysisError> for ApiError {
    fn from(e: AnalysisError) -> Self {
        ApiError::Analysis(e)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e)
    }
}

#[derive(Deserialize)]
struct ScoreReq {
    text: String,
}

async fn score(State(state): State<AppState>, Json(body): Json<ScoreReq>) -> Json<SentimentResult> {
    Json(state.analyzer.score(&body.text))
}

#[derive(Serialize)]
struct AnalyzeResp {
    report: AnalysisReport,
    charts: ChartSet,
}

async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalysisRequest>,
) -> Result<Json<AnalyzeResp>, ApiError> {
    let today = chrono::Local::now().date_naive();
    let resolved = req.resolve(&state.config.defaults, today)?;
    let providers = state.providers.build(&req.credentials)?;

    let report = engine::run_analysis(&state.analyzer, &resolved, &providers, &LogProgress).await?;
    let charts = charts::build(&report.batches, &report.summary);
    Ok(Json(AnalyzeResp { report, charts }))
}

async fn export_csv(Json(batch): Json<ScoredBatch>) -> Result<Response, ApiError> {
    if let Some((i, it)) = batch
        .items
        .iter()
        .enumerate()
        .find(|(_, it)| it.item.kind() != batch.kind)
    {
        return Err(ApiError::BadRequest(format!(
            "item {i} is {}, batch is {}",
            it.item.kind().label(),
            batch.kind.label()
        )));
    }

    let name = export::export_file_name(batch.kind, chrono::Local::now().date_naive());
    let body = export::to_csv_string(&batch)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{name}\""))
        .map_err(|e| ApiError::Internal(e.into()))?;
    headers.insert(header::CONTENT_DISPOSITION, disposition);

    Ok((StatusCode::OK, headers, body).into_response())
}
