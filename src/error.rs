//! Error taxonomy for commit attempts.
//!
//! Every variant is terminal for the current attempt: failures are surfaced
//! as user-visible alerts, never silently swallowed, and never retried.

use thiserror::Error;

use crate::api::GatewayError;
use crate::text::strip_html;

/// Terminal failure of a single commit attempt.
#[derive(Debug, Error)]
pub enum CommitError {
    /// The staged-edit set was empty; no network call was made.
    #[error("cannot commit: there are no changed files")]
    EmptyCommit,

    /// The staleness pre-check could not reach the server. Treated as
    /// "cannot proceed safely", never as "not stale".
    #[error("error checking branch data: {source}")]
    StalenessCheck {
        #[source]
        source: GatewayError,
    },

    /// The server answered without a success identifier; its message is
    /// surfaced verbatim.
    #[error("{message}")]
    ServerRejection { message: String },

    /// The submit request failed at the transport level.
    #[error("error committing changes: {source}")]
    Transport {
        #[source]
        source: GatewayError,
    },
}

impl CommitError {
    /// The alert text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            CommitError::EmptyCommit => {
                "There are no changes to commit.".to_string()
            }
            CommitError::StalenessCheck { .. } => {
                "Error checking branch data. Please try again.".to_string()
            }
            CommitError::ServerRejection { message } => message.clone(),
            CommitError::Transport { source } => {
                let mut message = "Error committing changes. Please try again.".to_string();
                if let Some(detail) = source.server_message() {
                    let detail = strip_html(&detail);
                    if !detail.is_empty() {
                        message.push_str(&format!(" ({})", detail));
                    }
                }
                message
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_commit_message() {
        assert_eq!(
            CommitError::EmptyCommit.user_message(),
            "There are no changes to commit."
        );
    }

    #[test]
    fn server_rejection_is_verbatim() {
        let err = CommitError::ServerRejection {
            message: "Branch has changed".to_string(),
        };
        assert_eq!(err.user_message(), "Branch has changed");
    }

    #[test]
    fn transport_message_appends_sanitized_detail() {
        let err = CommitError::Transport {
            source: GatewayError::Http {
                status: 400,
                body: r#"{"message":"<strong>Access denied</strong>"}"#.to_string(),
            },
        };
        assert_eq!(
            err.user_message(),
            "Error committing changes. Please try again. (Access denied)"
        );
    }

    #[test]
    fn transport_message_without_detail_stays_generic() {
        let err = CommitError::Transport {
            source: GatewayError::Http {
                status: 502,
                body: String::new(),
            },
        };
        assert_eq!(
            err.user_message(),
            "Error committing changes. Please try again."
        );
    }
}
