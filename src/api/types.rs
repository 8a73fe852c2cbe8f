//! Wire types for the commit gateway.
//!
//! Request bodies follow the GitLab-style commits API shape: a branch, a
//! commit message, and a list of per-file actions, plus an optional
//! `start_branch` when the commit creates a new branch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Commit action kinds understood by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitActionKind {
    Create,
    Update,
    Delete,
}

/// One file action within a commit request.
#[derive(Debug, Clone, Serialize)]
pub struct CommitAction {
    pub action: CommitActionKind,
    pub file_path: String,
    /// Absent for deletions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Commit request body.
#[derive(Debug, Clone, Serialize)]
pub struct CommitRequest {
    pub branch: String,
    pub commit_message: String,
    pub actions: Vec<CommitAction>,
    /// Branch to fork from when `branch` does not exist yet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_branch: Option<String>,
}

/// Diff stats reported for a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CommitStats {
    pub additions: u64,
    pub deletions: u64,
}

/// Server response to a commit submission.
///
/// A missing `short_id` means the server rejected the commit without a
/// transport error; `message` then carries the reason.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitResponse {
    #[serde(default)]
    pub short_id: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub committed_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub committer_name: Option<String>,
    #[serde(default)]
    pub stats: Option<CommitStats>,
}

/// Branch lookup response; only the fields the staleness check needs.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct BranchDataResponse {
    pub commit: BranchHeadCommit,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct BranchHeadCommit {
    pub id: String,
}

/// Transport-level failure talking to the server.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never produced a server response (connect error,
    /// timeout, TLS failure).
    #[error("request failed: {source}")]
    Request {
        #[from]
        source: reqwest::Error,
    },

    /// The server answered with a non-success HTTP status.
    #[error("server returned HTTP {status}")]
    Http { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("failed to decode server response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL cannot address the requested endpoint.
    #[error("invalid URL: {0}")]
    Url(String),
}

impl GatewayError {
    /// Server-supplied human-readable message, when the failure body
    /// carried one as `{"message": ...}`.
    pub fn server_message(&self) -> Option<String> {
        match self {
            GatewayError::Http { body, .. } => serde_json::from_str::<serde_json::Value>(body)
                .ok()
                .and_then(|value| {
                    value
                        .get("message")
                        .and_then(|message| message.as_str())
                        .map(str::to_string)
                }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_request_serializes_expected_fields() {
        let request = CommitRequest {
            branch: "feature-x".to_string(),
            commit_message: "update docs".to_string(),
            actions: vec![
                CommitAction {
                    action: CommitActionKind::Update,
                    file_path: "a.txt".to_string(),
                    content: Some("hello".to_string()),
                },
                CommitAction {
                    action: CommitActionKind::Delete,
                    file_path: "old.txt".to_string(),
                    content: None,
                },
            ],
            start_branch: Some("main".to_string()),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["branch"], "feature-x");
        assert_eq!(json["actions"][0]["action"], "update");
        assert_eq!(json["actions"][1]["action"], "delete");
        assert!(json["actions"][1].get("content").is_none());
        assert_eq!(json["start_branch"], "main");
    }

    #[test]
    fn commit_response_tolerates_rejection_shape() {
        let response: CommitResponse =
            serde_json::from_str(r#"{"message":"Branch has changed"}"#).unwrap();
        assert!(response.short_id.is_none());
        assert_eq!(response.message.as_deref(), Some("Branch has changed"));
    }

    #[test]
    fn server_message_extracted_from_http_body() {
        let err = GatewayError::Http {
            status: 400,
            body: r#"{"message":"branch is protected"}"#.to_string(),
        };
        assert_eq!(err.server_message().as_deref(), Some("branch is protected"));

        let err = GatewayError::Http {
            status: 502,
            body: "Bad Gateway".to_string(),
        };
        assert!(err.server_message().is_none());
    }
}
