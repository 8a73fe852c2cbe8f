//! Server transport seam for the commit workflow.
//!
//! The workflow only ever sees the [`CommitGateway`] trait; the
//! reqwest-backed [`ApiClient`] is the production implementation, and tests
//! substitute their own.

mod client;
mod types;

pub use client::ApiClient;
pub use types::{
    CommitAction, CommitActionKind, CommitRequest, CommitResponse, CommitStats, GatewayError,
};

use async_trait::async_trait;

/// The two server calls a commit attempt makes.
#[async_trait]
pub trait CommitGateway: Send + Sync {
    /// Fetch the commit id the branch currently points at on the server.
    async fn fetch_branch_reference(
        &self,
        project_id: &str,
        branch_id: &str,
    ) -> Result<String, GatewayError>;

    /// Submit a commit. A `Ok` return means the server answered; whether it
    /// accepted the commit is decided by the presence of `short_id`.
    async fn submit_commit(
        &self,
        project_id: &str,
        request: &CommitRequest,
    ) -> Result<CommitResponse, GatewayError>;
}
