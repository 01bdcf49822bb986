//! User-visible, non-fatal messages collected during one analysis request.

use serde::{Deserialize, Serialize};

use crate::content::ContentKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// API key absent for a selected content type; nothing was fetched for it.
    MissingCredential,
    /// Search call failed; the kind is treated as zero results.
    FetchFailure,
    /// Per-video transcript retrieval failed.
    TranscriptFailure,
    /// Search succeeded but returned nothing.
    EmptyResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl NoticeKind {
    pub fn severity(&self) -> Severity {
        match self {
            NoticeKind::MissingCredential => Severity::Error,
            NoticeKind::FetchFailure | NoticeKind::TranscriptFailure => Severity::Warning,
            NoticeKind::EmptyResult => Severity::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, content: Option<ContentKind>, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            content,
            item_id: None,
            message: message.into(),
        }
    }

    pub fn for_item(mut self, id: impl Into<String>) -> Self {
        self.item_id = Some(id.into());
        self
    }

    pub fn missing_credential(kind: ContentKind) -> Self {
        let key = match kind {
            ContentKind::Text => "NewsAPI key",
            ContentKind::Video => "YouTube API key",
        };
        Self::new(
            NoticeKind::MissingCredential,
            Some(kind),
            format!("Please provide a {key} to search {}", kind.label()),
        )
    }

    pub fn empty_result(kind: ContentKind) -> Self {
        let hint = match kind {
            ContentKind::Text => "Try another keyword or a longer date range.",
            ContentKind::Video => "Try another keyword.",
        };
        Self::new(
            NoticeKind::EmptyResult,
            Some(kind),
            format!("No {} found. {hint}", kind.label()),
        )
    }

    /// Mirrors the notice into the log at a level matching its severity.
    pub fn emit(&self) {
        let content = self.content.map(|c| c.label()).unwrap_or("-");
        let item = self.item_id.as_deref().unwrap_or("-");
        match self.severity {
            Severity::Info => {
                tracing::info!(
                    target: "notice",
                    kind = ?self.kind,
                    content,
                    item,
                    "{}",
                    self.message
                )
            }
            Severity::Warning => {
                tracing::warn!(
                    target: "notice",
                    kind = ?self.kind,
                    content,
                    item,
                    "{}",
                    self.message
                )
            }
            Severity::Error => {
                tracing::error!(
                    target: "notice",
                    kind = ?self.kind,
                    content,
                    item,
                    "{}",
                    self.message
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_follows_kind() {
        let n = Notice::missing_credential(ContentKind::Video);
        assert_eq!(n.severity, Severity::Error);
        assert!(n.message.contains("YouTube API key"));
        assert_eq!(
            Notice::empty_result(ContentKind::Text).severity,
            Severity::Info
        );
        assert_eq!(NoticeKind::TranscriptFailure.severity(), Severity::Warning);
    }
}
