pub mod newsapi;
pub mod transcript;
pub mod youtube;

use anyhow::{anyhow, Context, Result};
use std::time::Duration;

use crate::config::HttpSettings;

/// Shared HTTP client for all providers.
pub fn build_http_client(settings: &HttpSettings) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(settings.user_agent.as_str())
        .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .timeout(Duration::from_secs(settings.timeout_secs))
        .build()
        .context("building reqwest client")
}

/// Turn a non-2xx response into an error carrying the API's own message if present.
pub(crate) async fn error_for_status(
    resp: reqwest::Response,
    what: &str,
) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let detail = api_error_message(&body).unwrap_or_else(|| body.chars().take(200).collect());
    Err(anyhow!("{what} HTTP {status}: {detail}"))
}

/// Extracts `message` (NewsAPI) or `error.message` (Google APIs) from an error body.
fn api_error_message(body: &str) -> Option<String> {
    let v: serde_json::Value = serde_json::from_str(body).ok()?;
    v.get("message")
        .or_else(|| v.get("error").and_then(|e| e.get("message")))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}
