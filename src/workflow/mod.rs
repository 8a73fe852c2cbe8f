//! The commit orchestration workflow.
//!
//! One attempt moves through `Idle → Building → CheckingStaleness →
//! (AwaitingUserDecision) → Submitting → Reconciling → Idle`, with
//! user-abort and failure branches returning to `Idle` after the alert is
//! shown. Suspension happens only at the staleness fetch, the confirmation
//! wait, and the submit call; a caller must not start a second attempt for
//! the same branch while one is in flight (observe `loading`).

mod payload;
mod reconcile;
mod staleness;

pub use payload::build_commit_payload;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::api::{CommitGateway, CommitResponse, CommitStats};
use crate::domain::{
    BranchContext, CommitIntent, CommitOutcome, CommitPhase, FollowUpAction, SharedCommitState,
};
use crate::error::CommitError;
use crate::ports::{ConfirmationPort, Decision, ListenerRegistry, Navigator, Severity, UiShell};
use crate::text::commit_summary;
use crate::urls::new_merge_request_url;

/// A commit the server accepted; `short_id` and `id` are guaranteed present.
#[derive(Debug, Clone)]
pub(crate) struct AcceptedCommit {
    pub short_id: String,
    pub id: String,
    pub message: String,
    pub committed_date: Option<DateTime<Utc>>,
    pub committer_name: Option<String>,
    pub stats: Option<CommitStats>,
}

impl AcceptedCommit {
    /// Interpret the server's answer. A response without a success
    /// identifier is a server rejection carrying the server's message.
    fn from_response(response: CommitResponse) -> Result<Self, CommitError> {
        let rejection = |message: Option<String>| CommitError::ServerRejection {
            message: message.unwrap_or_else(|| "Commit rejected by the server.".to_string()),
        };

        let Some(short_id) = response.short_id else {
            return Err(rejection(response.message));
        };
        let Some(id) = response.id else {
            return Err(rejection(response.message));
        };

        Ok(Self {
            short_id,
            id,
            message: response.message.unwrap_or_default(),
            committed_date: response.committed_date,
            committer_name: response.committer_name,
            stats: response.stats,
        })
    }
}

/// Orchestrates a single commit attempt against a single target branch.
///
/// All collaborators are injected; the workflow holds no ambient state of
/// its own beyond the listener registry shared with editor surfaces.
pub struct CommitWorkflow {
    gateway: Arc<dyn CommitGateway>,
    confirmation: Arc<dyn ConfirmationPort>,
    navigator: Arc<dyn Navigator>,
    ui: Arc<dyn UiShell>,
    listeners: Arc<ListenerRegistry>,
}

impl CommitWorkflow {
    pub fn new(
        gateway: Arc<dyn CommitGateway>,
        confirmation: Arc<dyn ConfirmationPort>,
        navigator: Arc<dyn Navigator>,
        ui: Arc<dyn UiShell>,
        listeners: Arc<ListenerRegistry>,
    ) -> Self {
        Self {
            gateway,
            confirmation,
            navigator,
            ui,
            listeners,
        }
    }

    /// Registry editor surfaces subscribe to for content-change events.
    pub fn listeners(&self) -> &Arc<ListenerRegistry> {
        &self.listeners
    }

    /// Run one commit attempt to a terminal state.
    ///
    /// Every failure is reported through the UI shell before being
    /// returned; nothing is swallowed and nothing retries.
    pub async fn commit_changes(
        &self,
        ctx: &BranchContext,
        state: &SharedCommitState,
        intent: CommitIntent,
    ) -> Result<CommitOutcome, CommitError> {
        let result = self.run_attempt(ctx, state, &intent).await;
        state.write().await.phase = CommitPhase::Idle;

        if let Err(err) = &result {
            self.ui.report_error(&err.user_message(), Severity::Alert);
            if matches!(err, CommitError::Transport { .. }) {
                // A modal may have altered the layout during the failure.
                self.ui.refresh_layout();
            }
        }

        result
    }

    async fn run_attempt(
        &self,
        ctx: &BranchContext,
        state: &SharedCommitState,
        intent: &CommitIntent,
    ) -> Result<CommitOutcome, CommitError> {
        let payload = {
            let mut guard = state.write().await;
            guard.phase = CommitPhase::Building;
            build_commit_payload(intent, &ctx.branch_id, &guard.staged)?
        };

        // Staleness is inapplicable when the target branch does not exist yet.
        if !intent.create_new_branch {
            let working_reference = {
                let mut guard = state.write().await;
                guard.phase = CommitPhase::CheckingStaleness;
                guard.branch.working_reference.clone()
            };

            let moved =
                staleness::branch_has_moved(self.gateway.as_ref(), ctx, &working_reference).await?;

            if moved {
                state.write().await.phase = CommitPhase::AwaitingUserDecision;
                if self.confirmation.confirm_stale_branch_commit().await == Decision::Abort {
                    info!("Commit to {} aborted by user after staleness warning", ctx.branch_id);
                    return Ok(CommitOutcome::AbortedByUser);
                }
            }
        }

        // The loading flag spans exactly the submission await and is reset
        // exactly once, before the response is interpreted.
        {
            let mut guard = state.write().await;
            guard.phase = CommitPhase::Submitting;
            guard.loading = true;
        }
        let response = self.gateway.submit_commit(&ctx.project_id, &payload).await;
        state.write().await.loading = false;

        let response = response.map_err(|source| CommitError::Transport { source })?;
        let accepted = AcceptedCommit::from_response(response)?;
        let summary = commit_summary(&accepted.short_id, accepted.stats.as_ref());
        info!("{}", summary);

        if intent.follow_up == FollowUpAction::OpenMergeRequest {
            // Hand off to the merge-request form; local state stays as-is
            // and no reconciliation runs.
            state.write().await.last_commit_summary = Some(summary);
            let url =
                new_merge_request_url(&ctx.web_url, &intent.target_branch_name, &ctx.branch_id);
            self.navigator.navigate_to(&url);
            return Ok(CommitOutcome::MergeRequestRedirect { url });
        }

        let reference = accepted.id.clone();
        {
            let mut guard = state.write().await;
            guard.last_commit_summary = Some(summary.clone());
            guard.phase = CommitPhase::Reconciling;
            reconcile::reconcile_after_commit(
                &mut guard,
                ctx,
                intent,
                &accepted,
                &self.listeners,
                self.navigator.as_ref(),
            );
        }

        Ok(CommitOutcome::Committed { reference, summary })
    }
}
