// src/config/dashboard.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, path::PathBuf};

use crate::content::ContentKind;

pub const ENV_CONFIG_PATH: &str = "DASHBOARD_CONFIG_PATH";
pub const ENV_NEWSAPI_KEY: &str = "NEWSAPI_KEY";
pub const ENV_YOUTUBE_KEY: &str = "YOUTUBE_API_KEY";

fn default_language() -> String {
    "id".to_string()
}
fn default_days_ago() -> u32 {
    7
}
fn default_max_results() -> u32 {
    10
}
fn default_content() -> Vec<ContentKind> {
    vec![ContentKind::Text]
}
fn default_transcript_fallbacks() -> Vec<String> {
    vec!["en".to_string()]
}
fn default_export_dir() -> PathBuf {
    PathBuf::from("exports")
}

/// Values used when a request leaves a field out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDefaults {
    #[serde(default = "default_language")]
    pub language: String,
    /// Converted to `[today - days_ago, today]`; clamped into 1..=30.
    #[serde(default = "default_days_ago")]
    pub days_ago: u32,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    #[serde(default = "default_content")]
    pub content: Vec<ContentKind>,
    /// Tried after the request language when looking up transcripts.
    #[serde(default = "default_transcript_fallbacks")]
    pub transcript_fallbacks: Vec<String>,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            language: default_language(),
            days_ago: default_days_ago(),
            max_results: default_max_results(),
            content: default_content(),
            transcript_fallbacks: default_transcript_fallbacks(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}
fn default_connect_timeout_secs() -> u64 {
    4
}
fn default_user_agent() -> String {
    "news-sentiment-dashboard/0.1".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_news_base() -> String {
    "https://newsapi.org/v2".to_string()
}
fn default_youtube_base() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}
fn default_watch_base() -> String {
    "https://www.youtube.com".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoints {
    #[serde(default = "default_news_base")]
    pub news_base_url: String,
    #[serde(default = "default_youtube_base")]
    pub youtube_base_url: String,
    #[serde(default = "default_watch_base")]
    pub youtube_watch_base_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            news_base_url: default_news_base(),
            youtube_base_url: default_youtube_base(),
            youtube_watch_base_url: default_watch_base(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// "ENV" means: read from NEWSAPI_KEY.
    #[serde(default)]
    pub news_api_key: Option<String>,
    /// "ENV" means: read from YOUTUBE_API_KEY.
    #[serde(default)]
    pub youtube_api_key: Option<String>,
    #[serde(default)]
    pub defaults: RequestDefaults,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub endpoints: Endpoints,
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            news_api_key: None,
            youtube_api_key: None,
            defaults: RequestDefaults::default(),
            http: HttpSettings::default(),
            endpoints: Endpoints::default(),
            export_dir: default_export_dir(),
        }
    }
}

impl DashboardConfig {
    /// Load from an explicit path. TOML or JSON, picked by extension.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading dashboard config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg: DashboardConfig = match ext.as_str() {
            "json" => serde_json::from_str(&data).context("parsing dashboard config json")?,
            _ => toml::from_str(&data).context("parsing dashboard config toml")?,
        };
        cfg.resolved()
    }

    /// Load using env var + fallbacks:
    /// 1) $DASHBOARD_CONFIG_PATH
    /// 2) config/dashboard.toml
    /// 3) config/dashboard.json
    /// 4) built-in defaults (keys from env if set)
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from_file(&pb);
            } else {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
        }
        let toml_p = PathBuf::from("config/dashboard.toml");
        if toml_p.exists() {
            return Self::load_from_file(&toml_p);
        }
        let json_p = PathBuf::from("config/dashboard.json");
        if json_p.exists() {
            return Self::load_from_file(&json_p);
        }
        Self::default().resolved()
    }

    /// Resolve "ENV" keys, fall back to env for absent keys, sanitize defaults.
    fn resolved(mut self) -> Result<Self> {
        self.news_api_key = resolve_key(self.news_api_key.take(), ENV_NEWSAPI_KEY);
        self.youtube_api_key = resolve_key(self.youtube_api_key.take(), ENV_YOUTUBE_KEY);

        let d = &mut self.defaults;
        d.language = d.language.trim().to_ascii_lowercase();
        d.days_ago = d.days_ago.clamp(1, 30);
        if d.content.is_empty() {
            d.content = default_content();
        }
        Ok(self)
    }
}

fn resolve_key(value: Option<String>, var: &str) -> Option<String> {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(v) if v.eq_ignore_ascii_case("env") => {
            let key = env::var(var)
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty());
            if key.is_none() {
                // Left unset so the affected content kind reports a missing credential.
                tracing::warn!(target: "config", var, "key set to ENV but env var is unset");
            }
            key
        }
        Some(v) => Some(v),
        None => env::var(var)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_with_partial_sections_uses_defaults() {
        let cfg: DashboardConfig = toml::from_str(
            r#"
news_api_key = "abc"

[defaults]
language = "en"
max_results = 25
"#,
        )
        .unwrap();
        assert_eq!(cfg.news_api_key.as_deref(), Some("abc"));
        assert_eq!(cfg.defaults.language, "en");
        assert_eq!(cfg.defaults.max_results, 25);
        assert_eq!(cfg.defaults.days_ago, 7);
        assert_eq!(cfg.http.timeout_secs, 10);
        assert_eq!(cfg.endpoints.news_base_url, "https://newsapi.org/v2");
    }

    #[test]
    fn explicit_key_is_kept() {
        let k = resolve_key(Some("  k1 ".into()), "DASHBOARD_TEST_UNSET_VAR");
        assert_eq!(k.as_deref(), Some("k1"));
    }

    #[test]
    fn env_sentinel_without_var_leaves_key_unset() {
        assert!(resolve_key(Some("ENV".into()), "DASHBOARD_TEST_UNSET_VAR").is_none());
    }
}
